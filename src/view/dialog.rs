use optin_modal::host::Page;
use optin_modal::modal::ModalController;
use ratatui::Frame;
use ratatui::layout::{Constraint, Margin, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Clear};

use super::HitMap;
use super::flow::{self, Item};
use crate::Theme;

const DIALOG_WIDTH: u16 = 56;

/// Draws the backdrop over `area` and the dialog centered on it.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    page: &Page,
    modal: &ModalController,
    theme: &Theme,
    hits: &mut HitMap,
) {
    // Dim the page underneath; clicks that miss the dialog land on the backdrop.
    frame
        .buffer_mut()
        .set_style(area, Style::default().fg(theme.overlay0).bg(theme.crust));
    hits.push(area, modal.backdrop());

    let width = area.width.min(DIALOG_WIDTH);
    // Borders plus one column of padding on each side.
    let items = flow::layout(page, modal.dialog(), width.saturating_sub(4));
    let height = items
        .iter()
        .map(Item::height)
        .fold(2u16, u16::saturating_add)
        .min(area.height);

    let dialog_area = area.centered(Constraint::Length(width), Constraint::Length(height));
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_focused()))
        .style(Style::default().bg(theme.base));
    let inner = block.inner(dialog_area).inner(Margin::new(1, 0));
    frame.render_widget(block, dialog_area);
    hits.push(dialog_area, modal.dialog());

    flow::draw(frame, inner, page, &items, theme, hits);
}
