use optin_modal::config::{GlobalAction, KeyResolver, ModalAction};
use optin_modal::host::Page;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    page: &Page,
    resolver: &KeyResolver,
    theme: &Theme,
    status: Option<&str>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border()));

    let hints = if page.is_open() {
        vec![
            (resolver.display_modal(ModalAction::Close), "close"),
            (resolver.display_modal(ModalAction::FocusNext), "next"),
            (resolver.display_modal(ModalAction::FocusPrev), "previous"),
            (resolver.display_global(GlobalAction::Activate), "activate"),
        ]
    } else {
        vec![
            (resolver.display_modal(ModalAction::FocusNext), "focus"),
            (resolver.display_global(GlobalAction::Activate), "activate"),
            (resolver.display_global(GlobalAction::Suspend), "suspend"),
            (resolver.display_global(GlobalAction::Quit), "quit"),
        ]
    };

    let mut spans = Vec::new();
    if let Some(status) = status {
        spans.push(Span::styled(
            status.to_string(),
            Style::default()
                .fg(theme.success())
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("   "));
    }
    for (key, label) in hints {
        spans.push(Span::styled(
            format!("<{key}>"),
            Style::default().fg(theme.key_hint()),
        ));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(theme.subtext0),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
