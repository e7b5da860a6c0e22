//! The opt-in consent dialog controller.
//!
//! [`ModalController`] binds once to the elements of a hosting
//! [`Document`] and then drives:
//! - the open/close lifecycle (scroll lock, `aria-hidden` on the rest of
//!   the page, focus restoration, deferred reset)
//! - the focus trap (Tab / Shift+Tab wrap, Escape to close)
//! - field validation with inline error messages
//! - submission gatekeeping and the success state
//!
//! All handlers run to completion on the caller's thread. The only deferred
//! work goes through the controller's timer queue, which the host advances.

mod focus_trap;
mod lifecycle;
mod submit;
mod validate;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

pub use focus_trap::{FocusSet, TabDirection, is_focusable};
pub use validate::{
    Field, FieldError, FieldKind, MIN_PHONE_DIGITS, validate_email, validate_phone,
};

use crate::config::{ElementIds, KeyResolver, ModalAction, ModalConfig, TimingConfig};
use crate::dom::{Document, NodeId};
use crate::event::{DomEvent, Handled};
use crate::timer::TimerQueue;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("missing {role} element #{id}")]
    MissingElement { role: &'static str, id: String },
    #[error("{field:?} input has no following error element")]
    MissingErrorElement { field: FieldKind },
}

/// Work deferred until a transition has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// Runs after the open transition.
    FocusFirst,
    /// Runs after the close transition.
    Reset,
}

#[derive(Debug, Clone)]
struct Elements {
    backdrop: NodeId,
    dialog: NodeId,
    close: NodeId,
    form: NodeId,
    panel: NodeId,
    phone: Field,
    email: Field,
}

pub struct ModalController {
    elements: Elements,
    ids: ElementIds,
    timing: TimingConfig,
    keys: Arc<KeyResolver>,
    focus: FocusSet,
    opener: Option<NodeId>,
    timers: TimerQueue<Deferred>,
}

impl ModalController {
    /// Resolves every element the dialog needs. Nothing in the document is
    /// touched unless all of them are present.
    pub fn bind(
        doc: &mut Document,
        config: &ModalConfig,
        keys: Arc<KeyResolver>,
    ) -> Result<Self, SetupError> {
        let ids = &config.elements;
        let find = |role: &'static str, id: &str| {
            doc.get_element_by_id(id)
                .ok_or_else(|| SetupError::MissingElement {
                    role,
                    id: id.to_string(),
                })
        };

        let backdrop = find("backdrop", &ids.backdrop)?;
        let dialog = find("dialog", &ids.dialog)?;
        let close = find("close", &ids.close)?;
        let form = find("form", &ids.form)?;
        let panel = find("form panel", &ids.panel)?;
        let phone_input = find("phone input", &ids.phone)?;
        let email_input = find("email input", &ids.email)?;

        let field = |kind: FieldKind, input: NodeId| {
            doc.next_element_sibling(input)
                .map(|status| Field {
                    kind,
                    input,
                    status,
                })
                .ok_or(SetupError::MissingErrorElement { field: kind })
        };
        let phone = field(FieldKind::Phone, phone_input)?;
        let email = field(FieldKind::Email, email_input)?;

        phone.associate(doc);
        email.associate(doc);

        let triggers = doc.query_attribute(&ids.trigger_attribute).len();
        debug!(triggers, "Bound opt-in dialog");

        Ok(Self {
            elements: Elements {
                backdrop,
                dialog,
                close,
                form,
                panel,
                phone,
                email,
            },
            ids: ids.clone(),
            timing: config.timing,
            keys,
            focus: FocusSet::default(),
            opener: None,
            timers: TimerQueue::new(),
        })
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.has_class(self.elements.backdrop, &self.ids.open_class)
    }

    pub const fn focus_set(&self) -> &FocusSet {
        &self.focus
    }

    pub const fn opener(&self) -> Option<NodeId> {
        self.opener
    }

    pub const fn backdrop(&self) -> NodeId {
        self.elements.backdrop
    }

    pub const fn dialog(&self) -> NodeId {
        self.elements.dialog
    }

    pub const fn form(&self) -> NodeId {
        self.elements.form
    }

    pub const fn fields(&self) -> [Field; 2] {
        [self.elements.phone, self.elements.email]
    }

    pub fn is_success(&self, doc: &Document) -> bool {
        doc.has_class(self.elements.panel, &self.ids.success_class)
    }

    /// Number of deferred callbacks still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// The document-scope dispatcher. Every event in the page goes through
    /// here; handlers decide for themselves whether they apply.
    pub fn dispatch(&mut self, doc: &mut Document, event: &DomEvent) -> Handled {
        match event {
            DomEvent::Click { target } => self.on_click(doc, *target),
            DomEvent::Keydown(key) => {
                if !self.is_open(doc) {
                    return Handled::Ignored;
                }
                if self.keys.matches_modal(key, ModalAction::Close) {
                    return self.close(doc).into();
                }
                if self.keys.matches_modal(key, ModalAction::FocusPrev) {
                    return self.trap_tab(doc, TabDirection::Backward);
                }
                if self.keys.matches_modal(key, ModalAction::FocusNext) {
                    return self.trap_tab(doc, TabDirection::Forward);
                }
                Handled::Ignored
            }
            DomEvent::Blur { target } => {
                if let Some(field) = self.field_for(*target) {
                    field.validate(doc, &self.ids.error_class);
                }
                Handled::Ignored
            }
            DomEvent::Input { target } => {
                if let Some(field) = self.field_for(*target)
                    && field.has_error(doc, &self.ids.error_class)
                {
                    field.clear_error(doc, &self.ids.error_class);
                }
                Handled::Ignored
            }
            DomEvent::Submit { form } if *form == self.elements.form => self.submit(doc),
            DomEvent::Submit { .. } => Handled::Ignored,
            DomEvent::TransitionEnd { target } if *target == self.elements.backdrop => {
                let settled = if self.is_open(doc) {
                    Deferred::FocusFirst
                } else {
                    Deferred::Reset
                };
                for task in self.timers.take_matching(|task| *task == settled) {
                    self.run_deferred(doc, task);
                }
                Handled::Ignored
            }
            DomEvent::TransitionEnd { .. } => Handled::Ignored,
        }
    }

    /// Feeds elapsed host time to the timer queue and runs what came due.
    pub fn advance(&mut self, doc: &mut Document, elapsed: Duration) {
        for task in self.timers.advance(elapsed) {
            self.run_deferred(doc, task);
        }
    }

    fn on_click(&mut self, doc: &mut Document, target: NodeId) -> Handled {
        if let Some(trigger) = doc.closest_with_attribute(target, &self.ids.trigger_attribute) {
            return self.open(doc, Some(trigger)).into();
        }
        if doc.contains(self.elements.close, target) {
            return self.close(doc).into();
        }
        let outside_dialog = doc.contains(self.elements.backdrop, target)
            && !doc.contains(self.elements.dialog, target);
        if outside_dialog && self.is_open(doc) {
            return self.close(doc).into();
        }
        Handled::Ignored
    }

    fn trap_tab(&mut self, doc: &mut Document, direction: TabDirection) -> Handled {
        match self.focus.wrap_target(doc.active_element(), direction) {
            Some(target) => {
                debug!(?direction, %target, "Wrapping focus inside dialog");
                self.move_focus(doc, target);
                Handled::Consumed
            }
            None => Handled::Ignored,
        }
    }

    fn field_for(&self, node: NodeId) -> Option<Field> {
        self.fields().into_iter().find(|field| field.input == node)
    }

    /// Focuses `target`, validating the field that loses focus.
    fn move_focus(&mut self, doc: &mut Document, target: NodeId) {
        if let Some(blurred) = doc.focus(target) {
            self.dispatch(doc, &DomEvent::Blur { target: blurred });
        }
    }
}
