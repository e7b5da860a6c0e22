//! The page hosting the opt-in dialog.
//!
//! [`Page`] owns the [`Document`] and plays the part of the browser around
//! the controller: every input first goes through the controller's
//! document-scope dispatcher, and whatever it does not consume gets the
//! native default action (sequential focus navigation, text entry, button
//! activation, implicit form submission).

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::config::{ElementIds, GlobalAction, KeyResolver, ModalAction, ModalConfig};
use crate::dom::{Document, NodeId, Tag};
use crate::event::{DomEvent, Handled, ModalEvent};
use crate::markup::{BACKDROP_CLASS, FIELDS_CLASS, SUCCESS_CLASS};
use crate::modal::{ModalController, TabDirection, is_focusable};

pub struct Page {
    document: Document,
    modal: Option<ModalController>,
    ids: ElementIds,
    keys: Arc<KeyResolver>,
    events: Vec<ModalEvent>,
    /// Where sequential navigation starts when nothing has focus: the last
    /// node clicked or focused.
    origin: Option<NodeId>,
}

impl Page {
    /// Binds the dialog to `document`. When required elements are missing
    /// the failure is logged and the page runs without a dialog.
    pub fn new(mut document: Document, config: &ModalConfig, keys: Arc<KeyResolver>) -> Self {
        let modal = match ModalController::bind(&mut document, config, Arc::clone(&keys)) {
            Ok(modal) => Some(modal),
            Err(error) => {
                warn!(%error, "Opt-in dialog disabled");
                None
            }
        };
        Self {
            document,
            modal,
            ids: config.elements.clone(),
            keys,
            events: Vec::new(),
            origin: None,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn modal(&self) -> Option<&ModalController> {
        self.modal.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.modal
            .as_ref()
            .is_some_and(|modal| modal.is_open(&self.document))
    }

    pub fn open(&mut self, opener: Option<NodeId>) {
        if let Some(modal) = self.modal.as_mut()
            && let Some(event) = modal.open(&mut self.document, opener)
        {
            self.events.push(event);
        }
    }

    pub fn close(&mut self) {
        if let Some(modal) = self.modal.as_mut()
            && let Some(event) = modal.close(&mut self.document)
        {
            self.events.push(event);
        }
    }

    pub fn reset(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.reset(&mut self.document);
        }
    }

    /// Advances the dialog's deferred callbacks by `elapsed` wall time.
    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(modal) = self.modal.as_mut() {
            modal.advance(&mut self.document, elapsed);
        }
    }

    /// Signals that the backdrop finished its current transition.
    pub fn transition_end(&mut self) {
        if let Some(backdrop) = self.modal.as_ref().map(ModalController::backdrop) {
            self.dispatch(&DomEvent::TransitionEnd { target: backdrop });
        }
    }

    /// Notifications produced since the last call.
    pub fn drain_events(&mut self) -> Vec<ModalEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether the stylesheet currently shows `node`.
    pub fn is_rendered(&self, node: NodeId) -> bool {
        let doc = &self.document;
        let success = doc
            .get_element_by_id(&self.ids.panel)
            .is_some_and(|panel| doc.has_class(panel, &self.ids.success_class));

        doc.is_connected(node)
            && doc.ancestors(node).all(|current| {
                let element = doc.get(current);
                let hidden = element.has_attribute("hidden")
                    || (element.has_class(BACKDROP_CLASS)
                        && !element.has_class(&self.ids.open_class))
                    || (element.has_class(FIELDS_CLASS) && success)
                    || (element.has_class(SUCCESS_CLASS) && !success);
                !hidden
            })
    }

    /// Handles a key press. Returns whether anything acted on it.
    pub fn key(&mut self, key: KeyEvent) -> bool {
        if self.dispatch(&DomEvent::Keydown(key)).is_consumed() {
            return true;
        }

        if self.keys.matches_modal(&key, ModalAction::FocusPrev) {
            self.step_focus(TabDirection::Backward);
            return true;
        }
        if self.keys.matches_modal(&key, ModalAction::FocusNext) {
            self.step_focus(TabDirection::Forward);
            return true;
        }

        let Some(active) = self.document.active_element() else {
            return false;
        };
        if self.is_text_input(active) {
            return self.edit_input(active, key);
        }
        if self.keys.matches_global(&key, GlobalAction::Activate) && self.is_activatable(active) {
            self.activate(active);
            return true;
        }
        false
    }

    /// Handles a pointer click on `target`, or on empty page space.
    pub fn click(&mut self, target: Option<NodeId>) {
        let target = target.unwrap_or_else(|| self.document.body());
        self.origin = Some(target);
        if is_focusable(&self.document, target) {
            self.focus(target);
        } else if let Some(blurred) = self.document.blur() {
            self.dispatch(&DomEvent::Blur { target: blurred });
        }
        self.activate(target);
    }

    /// Inserts pasted text into the focused input.
    pub fn paste(&mut self, text: &str) {
        if let Some(active) = self.document.active_element()
            && self.is_text_input(active)
        {
            self.document
                .value_mut(active)
                .extend(text.chars().filter(|c| !c.is_control()));
            self.dispatch(&DomEvent::Input { target: active });
        }
    }

    /// Whether an input currently has keyboard focus.
    pub fn is_editing(&self) -> bool {
        self.document
            .active_element()
            .is_some_and(|active| self.is_text_input(active))
    }

    fn dispatch(&mut self, event: &DomEvent) -> Handled {
        let Some(modal) = self.modal.as_mut() else {
            return Handled::Ignored;
        };
        let handled = modal.dispatch(&mut self.document, event);
        if let Handled::Event(event) = &handled {
            self.events.push(event.clone());
        }
        handled
    }

    fn focus(&mut self, target: NodeId) {
        self.origin = Some(target);
        if let Some(blurred) = self.document.focus(target) {
            self.dispatch(&DomEvent::Blur { target: blurred });
        }
    }

    fn step_focus(&mut self, direction: TabDirection) {
        let doc = &self.document;
        // An open dialog is modal: navigation never leaves it.
        let scope = self
            .modal
            .as_ref()
            .filter(|modal| modal.is_open(doc))
            .map_or(doc.body(), ModalController::dialog);
        let order: Vec<NodeId> = doc
            .descendants(scope)
            .into_iter()
            .filter(|node| is_focusable(doc, *node) && self.is_rendered(*node))
            .collect();
        let start = doc
            .active_element()
            .or(self.origin)
            .filter(|node| doc.is_connected(*node));

        if let Some(target) = sequential_target(doc, &order, start, direction) {
            self.focus(target);
        }
    }

    /// Click semantics: dispatch, then the native action if not prevented.
    fn activate(&mut self, target: NodeId) {
        if self.dispatch(&DomEvent::Click { target }).is_consumed() {
            return;
        }
        let element = self.document.get(target);
        match element.tag() {
            Tag::Button => {
                let submits = element.attribute("type").is_none_or(|kind| kind == "submit");
                if submits && let Some(form) = self.document.closest_tag(target, Tag::Form) {
                    self.submit(form);
                }
            }
            Tag::Anchor => {
                debug!(href = element.attribute("href"), "Link activated");
            }
            _ => {}
        }
    }

    fn submit(&mut self, form: NodeId) {
        if !self.dispatch(&DomEvent::Submit { form }).is_consumed() {
            debug!(%form, "Form submitted natively, nothing to deliver to");
        }
    }

    fn is_text_input(&self, node: NodeId) -> bool {
        matches!(self.document.get(node).tag(), Tag::Input | Tag::Textarea)
    }

    fn is_activatable(&self, node: NodeId) -> bool {
        matches!(self.document.get(node).tag(), Tag::Button | Tag::Anchor)
    }

    fn edit_input(&mut self, input: NodeId, key: KeyEvent) -> bool {
        if key.code == KeyCode::Enter {
            // Implicit submission
            if let Some(form) = self.document.closest_tag(input, Tag::Form) {
                self.submit(form);
            }
            return true;
        }

        let value = self.document.value_mut(input);
        let changed = match (key.code, key.modifiers) {
            (KeyCode::Backspace, KeyModifiers::ALT) => delete_word(value),
            (KeyCode::Backspace, _) => value.pop().is_some(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                let had_text = !value.is_empty();
                value.clear();
                had_text
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                value.push(c);
                true
            }
            _ => return false,
        };
        if changed {
            self.dispatch(&DomEvent::Input { target: input });
        }
        true
    }
}

/// The element of `order` that follows (or precedes) `start` in document
/// order, wrapping at both ends. `start` does not have to be in `order`.
fn sequential_target(
    doc: &Document,
    order: &[NodeId],
    start: Option<NodeId>,
    direction: TabDirection,
) -> Option<NodeId> {
    let edge = match direction {
        TabDirection::Forward => *order.first()?,
        TabDirection::Backward => *order.last()?,
    };
    let Some(start) = start else {
        return Some(edge);
    };

    let body = doc.body();
    let document_order: Vec<NodeId> = std::iter::once(body).chain(doc.descendants(body)).collect();
    let rank = |node: NodeId| document_order.iter().position(|n| *n == node);
    let start_rank = rank(start);
    let next = match direction {
        TabDirection::Forward => order.iter().copied().find(|n| rank(*n) > start_rank),
        TabDirection::Backward => order.iter().rev().copied().find(|n| rank(*n) < start_rank),
    };
    Some(next.unwrap_or(edge))
}

/// Removes the last word and any spaces trailing it.
fn delete_word(value: &mut String) -> bool {
    let before = value.len();
    let trimmed = value.trim_end_matches(' ').len();
    let start = value[..trimmed].rfind(' ').map_or(0, |i| i + 1);
    value.truncate(start);
    value.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::event::OptIn;
    use crate::markup::consent_page;

    fn page() -> Page {
        let config = ModalConfig::default();
        Page::new(
            consent_page(&config.elements),
            &config,
            Arc::new(KeyResolver::default()),
        )
    }

    fn press(page: &mut Page, code: KeyCode) -> bool {
        page.key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(page: &mut Page, text: &str) {
        for c in text.chars() {
            press(page, KeyCode::Char(c));
        }
    }

    fn element(page: &Page, id: &str) -> NodeId {
        page.document().get_element_by_id(id).unwrap()
    }

    fn open_with_keyboard(page: &mut Page) -> NodeId {
        press(page, KeyCode::Tab);
        let trigger = page.document().active_element().unwrap();
        assert!(page.document().get(trigger).has_attribute("data-optin-trigger"));
        press(page, KeyCode::Enter);
        page.tick(Duration::from_millis(50));
        trigger
    }

    #[test]
    fn test_native_tab_skips_closed_dialog() {
        let mut page = page();
        let mut visited = Vec::new();
        for _ in 0..4 {
            press(&mut page, KeyCode::Tab);
            visited.push(page.document().active_element().unwrap());
        }
        assert_eq!(visited[0], visited[3]);
        assert!(visited.iter().all(|node| page.is_rendered(*node)));
        assert!(!page.is_rendered(element(&page, "optin-phone")));
    }

    #[test]
    fn test_full_keyboard_opt_in() {
        let mut page = page();
        let trigger = open_with_keyboard(&mut page);
        assert!(page.is_open());
        assert_eq!(
            page.document().active_element(),
            Some(element(&page, "optin-close"))
        );

        press(&mut page, KeyCode::Tab);
        assert_eq!(
            page.document().active_element(),
            Some(element(&page, "optin-phone"))
        );
        type_text(&mut page, "555-123-4567");
        press(&mut page, KeyCode::Tab);
        type_text(&mut page, "a@b.com");
        press(&mut page, KeyCode::Enter);

        assert!(page.modal().unwrap().is_success(page.document()));
        let events = page.drain_events();
        assert_eq!(events.first(), Some(&ModalEvent::Opened));
        assert_eq!(
            events.last(),
            Some(&ModalEvent::Submitted(OptIn {
                phone: "555-123-4567".to_string(),
                email: "a@b.com".to_string(),
            }))
        );

        press(&mut page, KeyCode::Esc);
        assert!(!page.is_open());
        assert_eq!(page.document().active_element(), Some(trigger));
    }

    #[test]
    fn test_blur_by_tab_validates_field() {
        let mut page = page();
        open_with_keyboard(&mut page);
        press(&mut page, KeyCode::Tab);
        type_text(&mut page, "123");
        press(&mut page, KeyCode::Tab);

        let phone = element(&page, "optin-phone");
        assert!(page.document().has_class(phone, "is-invalid"));

        page.key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(page.document().active_element(), Some(phone));
        press(&mut page, KeyCode::Backspace);
        assert!(!page.document().has_class(phone, "is-invalid"));
        assert_eq!(page.document().value(phone), "12");
    }

    #[test]
    fn test_shift_tab_from_first_wraps_to_submit() {
        let mut page = page();
        open_with_keyboard(&mut page);
        page.key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        let active = page.document().active_element().unwrap();
        assert_eq!(page.document().get(active).attribute("type"), Some("submit"));
        press(&mut page, KeyCode::Tab);
        assert_eq!(
            page.document().active_element(),
            Some(element(&page, "optin-close"))
        );
    }

    #[test]
    fn test_click_outside_dialog_dismisses() {
        let mut page = page();
        open_with_keyboard(&mut page);
        let backdrop = element(&page, "optin-backdrop");

        page.click(Some(element(&page, "optin-title")));
        assert!(page.is_open());
        page.click(Some(backdrop));
        assert!(!page.is_open());
    }

    #[test]
    fn test_submit_button_click_shows_errors() {
        let mut page = page();
        open_with_keyboard(&mut page);
        let email = element(&page, "optin-email");
        page.click(Some(email));
        page.paste("x@y.com");

        let submit = page
            .modal()
            .unwrap()
            .focus_set()
            .last()
            .unwrap();
        page.click(Some(submit));

        let phone = element(&page, "optin-phone");
        assert_eq!(page.document().active_element(), Some(phone));
        assert!(page.document().has_class(phone, "is-invalid"));
        assert!(!page.document().has_class(email, "is-invalid"));
        assert!(!page.modal().unwrap().is_success(page.document()));
    }

    #[test]
    fn test_reopen_after_close_is_pristine() {
        let mut page = page();
        let trigger = open_with_keyboard(&mut page);
        press(&mut page, KeyCode::Tab);
        type_text(&mut page, "1");
        press(&mut page, KeyCode::Esc);
        page.tick(Duration::from_millis(300));

        page.click(Some(trigger));
        page.tick(Duration::from_millis(50));
        let phone = element(&page, "optin-phone");
        assert_eq!(page.document().value(phone), "");
        assert!(!page.document().has_class(phone, "is-invalid"));
    }

    #[test]
    fn test_transition_end_runs_deferred_work_early() {
        let mut page = page();
        page.open(None);
        page.transition_end();
        let close = element(&page, "optin-close");
        assert_eq!(page.document().active_element(), Some(close));

        press(&mut page, KeyCode::Tab);
        type_text(&mut page, "42");
        page.close();
        page.transition_end();
        assert_eq!(page.document().value(element(&page, "optin-phone")), "");
        assert_eq!(page.modal().unwrap().pending_timers(), 0);
    }

    #[test]
    fn test_tab_in_success_state_stays_on_shown_controls() {
        let mut page = page();
        open_with_keyboard(&mut page);
        press(&mut page, KeyCode::Tab);
        type_text(&mut page, "555-123-4567");
        press(&mut page, KeyCode::Tab);
        type_text(&mut page, "a@b.com");
        press(&mut page, KeyCode::Enter);

        let close = element(&page, "optin-close");
        assert_eq!(page.document().active_element(), Some(close));
        for code in [KeyCode::Tab, KeyCode::BackTab] {
            press(&mut page, code);
            let active = page.document().active_element().unwrap();
            assert_eq!(active, close);
            assert!(page.is_rendered(active));
        }
        assert!(page.is_open());
    }

    #[test]
    fn test_tab_after_clicking_dialog_text_continues_from_it() {
        let mut page = page();
        open_with_keyboard(&mut page);
        let title = element(&page, "optin-title");

        page.click(Some(title));
        assert_eq!(page.document().active_element(), None);
        press(&mut page, KeyCode::Tab);
        assert_eq!(
            page.document().active_element(),
            Some(element(&page, "optin-phone"))
        );

        page.click(Some(title));
        page.key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(
            page.document().active_element(),
            Some(element(&page, "optin-close"))
        );
    }

    #[test]
    fn test_tab_never_leaves_open_dialog() {
        let mut page = page();
        open_with_keyboard(&mut page);
        let dialog = page.modal().unwrap().dialog();
        page.click(None);
        for _ in 0..8 {
            press(&mut page, KeyCode::Tab);
            let active = page.document().active_element().unwrap();
            assert!(page.document().contains(dialog, active));
        }
    }

    #[test]
    fn test_page_without_dialog_is_inert() {
        let mut doc = Document::new();
        let body = doc.body();
        let trigger = doc.append(
            body,
            Element::new(Tag::Button).with_attr("data-optin-trigger", ""),
        );
        let mut page = Page::new(
            doc,
            &ModalConfig::default(),
            Arc::new(KeyResolver::default()),
        );

        assert!(page.modal().is_none());
        page.click(Some(trigger));
        page.open(None);
        page.close();
        page.tick(Duration::from_secs(1));
        assert!(!page.is_open());
        assert!(page.drain_events().is_empty());
        assert_eq!(page.document().active_element(), Some(trigger));
    }

    #[test]
    fn test_delete_word() {
        let mut value = "call me maybe  ".to_string();
        assert!(delete_word(&mut value));
        assert_eq!(value, "call me ");
        assert!(delete_word(&mut value));
        assert_eq!(value, "call ");
        let mut empty = String::new();
        assert!(!delete_word(&mut empty));
    }
}
