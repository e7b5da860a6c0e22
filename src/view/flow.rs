use optin_modal::dom::{NodeId, Tag};
use optin_modal::host::Page;
use optin_modal::markup::{BACKDROP_CLASS, ERROR_CLASS, SUCCESS_CLASS};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use super::HitMap;
use crate::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Header,
    Success,
    Body,
    Label,
    Error,
}

/// One row (or box) of the vertical flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Text { text: String, tone: Tone },
    Input(NodeId),
    /// Buttons and links that sit next to each other.
    Controls(Vec<NodeId>),
    Gap,
}

impl Item {
    pub const fn height(&self) -> u16 {
        match self {
            Self::Input(_) => 3,
            _ => 1,
        }
    }
}

/// Flattens the rendered part of `root` into flow items. The backdrop is
/// left out; it is drawn as an overlay.
pub fn layout(page: &Page, root: NodeId, width: u16) -> Vec<Item> {
    let mut items = Vec::new();
    collect(page, root, usize::from(width), false, &mut items);
    while items.last() == Some(&Item::Gap) {
        items.pop();
    }
    items
}

fn collect(page: &Page, node: NodeId, width: usize, success: bool, items: &mut Vec<Item>) {
    let doc = page.document();
    for &child in doc.get(node).children() {
        if !page.is_rendered(child) {
            continue;
        }
        let element = doc.get(child);
        match element.tag() {
            Tag::Heading => {
                push_gap(items);
                let tone = if success { Tone::Success } else { Tone::Header };
                push_text(items, element.text(), width, tone);
            }
            Tag::Paragraph => {
                push_text(items, element.text(), width, Tone::Body);
                push_gap(items);
            }
            Tag::Label => push_text(items, element.text(), width, Tone::Label),
            Tag::Span if element.has_class(ERROR_CLASS) => {
                push_text(items, element.text(), width, Tone::Error);
            }
            Tag::Span => push_text(items, element.text(), width, Tone::Body),
            Tag::Input | Tag::Select | Tag::Textarea => items.push(Item::Input(child)),
            Tag::Button | Tag::Anchor => match items.last_mut() {
                Some(Item::Controls(row)) => row.push(child),
                _ => items.push(Item::Controls(vec![child])),
            },
            _ if element.has_class(BACKDROP_CLASS) => {}
            _ => collect(
                page,
                child,
                width,
                success || element.has_class(SUCCESS_CLASS),
                items,
            ),
        }
    }
}

fn push_gap(items: &mut Vec<Item>) {
    if items.last().is_some_and(|item| *item != Item::Gap) {
        items.push(Item::Gap);
    }
}

fn push_text(items: &mut Vec<Item>, text: &str, width: usize, tone: Tone) {
    items.extend(
        wrap(text, width)
            .into_iter()
            .map(|text| Item::Text { text, tone }),
    );
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = line.chars().count();
            let needed = if line.is_empty() { word.len() } else { used + 1 + word.len() };
            if needed <= width {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.extend(word.iter());
                break;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                continue;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub fn draw(
    frame: &mut Frame,
    area: Rect,
    page: &Page,
    items: &[Item],
    theme: &Theme,
    hits: &mut HitMap,
) {
    let mut y = area.y;
    for item in items {
        let height = item.height();
        if y.saturating_add(height) > area.bottom() {
            break;
        }
        let row = Rect::new(area.x, y, area.width, height);
        match item {
            Item::Text { text, tone } => {
                let line = Line::from(Span::styled(text.as_str(), text_style(*tone, theme)));
                frame.render_widget(Paragraph::new(line), row);
            }
            Item::Input(node) => {
                draw_input(frame, row, page, *node, theme);
                hits.push(row, *node);
            }
            Item::Controls(nodes) => draw_controls(frame, row, page, nodes, theme, hits),
            Item::Gap => {}
        }
        y += height;
    }
}

fn text_style(tone: Tone, theme: &Theme) -> Style {
    match tone {
        Tone::Header => Style::default()
            .fg(theme.header())
            .add_modifier(Modifier::BOLD),
        Tone::Success => Style::default()
            .fg(theme.success())
            .add_modifier(Modifier::BOLD),
        Tone::Body => Style::default().fg(theme.text),
        Tone::Label => Style::default().fg(theme.subtext0),
        Tone::Error => Style::default().fg(theme.error()),
    }
}

fn draw_input(frame: &mut Frame, area: Rect, page: &Page, node: NodeId, theme: &Theme) {
    let doc = page.document();
    let element = doc.get(node);
    let focused = doc.active_element() == Some(node);
    let invalid = element.attribute("aria-invalid") == Some("true");

    let border = if invalid {
        theme.error()
    } else if focused {
        theme.border_focused()
    } else {
        theme.border()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);

    let value = element.value();
    let line = if value.is_empty() && !focused {
        Line::from(Span::styled(
            element.attribute("placeholder").unwrap_or_default(),
            Style::default().fg(theme.placeholder()),
        ))
    } else {
        // Keep the end of the value and the cursor in view.
        let visible = usize::from(inner.width).saturating_sub(1);
        let skip = value.chars().count().saturating_sub(visible);
        let shown: String = value.chars().skip(skip).collect();
        let mut spans = vec![Span::styled(shown, Style::default().fg(theme.text))];
        if focused {
            spans.push(Span::styled(
                " ",
                Style::default().fg(theme.base).bg(theme.text),
            ));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_controls(
    frame: &mut Frame,
    area: Rect,
    page: &Page,
    nodes: &[NodeId],
    theme: &Theme,
    hits: &mut HitMap,
) {
    let doc = page.document();
    let mut spans = Vec::new();
    let mut x = area.x;
    for (index, &node) in nodes.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
            x = x.saturating_add(2);
        }
        let element = doc.get(node);
        let focused = doc.active_element() == Some(node);
        let (label, style) = match element.tag() {
            Tag::Anchor => {
                let style = Style::default()
                    .fg(theme.link())
                    .add_modifier(Modifier::UNDERLINED);
                let style = if focused {
                    style.add_modifier(Modifier::REVERSED)
                } else {
                    style
                };
                (element.text().to_string(), style)
            }
            _ => {
                let style = if focused {
                    Style::default()
                        .fg(theme.base)
                        .bg(theme.border_focused())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text).bg(theme.border())
                };
                (format!(" {} ", element.text()), style)
            }
        };
        let width = u16::try_from(label.chars().count()).unwrap_or(u16::MAX);
        let region = Rect::new(x, area.y, width, 1).intersection(area);
        if !region.is_empty() {
            hits.push(region, node);
        }
        x = x.saturating_add(width);
        spans.push(Span::styled(label, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use optin_modal::config::{KeyResolver, ModalConfig};
    use optin_modal::markup::consent_page;

    use super::*;

    fn page() -> Page {
        let config = ModalConfig::default();
        Page::new(
            consent_page(&config.elements),
            &config,
            Arc::new(KeyResolver::default()),
        )
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("never miss a delivery update", 12),
            vec!["never miss a", "delivery", "update"]
        );
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_closed_dialog_is_left_out_of_page_flow() {
        let page = page();
        let items = layout(&page, page.document().body(), 80);
        let inputs = items
            .iter()
            .filter(|item| matches!(item, Item::Input(_)))
            .count();
        assert_eq!(inputs, 0);
        let controls: Vec<_> = items
            .iter()
            .filter_map(|item| match item {
                Item::Controls(row) => Some(row.len()),
                _ => None,
            })
            .collect();
        assert_eq!(controls, vec![3]);
    }

    #[test]
    fn test_open_dialog_flow_shows_form_only() {
        let mut page = page();
        page.open(None);
        let dialog = page.modal().unwrap().dialog();
        let items = layout(&page, dialog, 50);

        let inputs = items
            .iter()
            .filter(|item| matches!(item, Item::Input(_)))
            .count();
        assert_eq!(inputs, 2);
        assert!(!items.iter().any(|item| matches!(
            item,
            Item::Text { tone: Tone::Success, .. }
        )));
        assert_ne!(items.last(), Some(&Item::Gap));
    }
}
