//! Rendering of the page and its dialog.
//!
//! The document is laid out as a simple vertical flow; every control that
//! reaches the screen leaves a hit region behind so mouse clicks can be
//! routed back to the node they landed on.

mod dialog;
mod flow;
mod status_bar;

use optin_modal::config::KeyResolver;
use optin_modal::dom::NodeId;
use optin_modal::host::Page;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Position, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::Theme;

/// Screen regions of the rendered nodes from the last frame.
#[derive(Debug, Default)]
pub struct HitMap {
    area: Rect,
    regions: Vec<(Rect, NodeId)>,
}

impl HitMap {
    fn reset(&mut self, area: Rect) {
        self.area = area;
        self.regions.clear();
    }

    fn push(&mut self, area: Rect, node: NodeId) {
        self.regions.push((area, node));
    }

    /// Whether `position` falls on the page at all.
    pub fn contains(&self, position: Position) -> bool {
        self.area.contains(position)
    }

    /// Topmost node under `position`. Later regions are painted over
    /// earlier ones.
    pub fn hit(&self, position: Position) -> Option<NodeId> {
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| area.contains(position))
            .map(|(_, node)| *node)
    }
}

pub fn render(
    frame: &mut Frame,
    page: &Page,
    resolver: &KeyResolver,
    theme: &Theme,
    status: Option<&str>,
    hits: &mut HitMap,
) {
    let [page_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(frame.area());
    hits.reset(page_area);

    frame.render_widget(Block::default().style(Style::default().bg(theme.mantle)), page_area);
    let content = page_area.inner(Margin::new(2, 1));
    let items = flow::layout(page, page.document().body(), content.width);
    flow::draw(frame, content, page, &items, theme, hits);

    if let Some(modal) = page.modal()
        && page.is_open()
    {
        dialog::render(frame, page_area, page, modal, theme, hits);
    }

    status_bar::render(frame, status_area, page, resolver, theme, status);
}
