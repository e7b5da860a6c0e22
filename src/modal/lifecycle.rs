//! Open/close transitions and the pristine reset.

use tracing::{debug, warn};

use super::{Deferred, FocusSet, ModalController};
use crate::dom::{Document, NodeId};
use crate::event::{DomEvent, ModalEvent};

impl ModalController {
    /// Opens the dialog.
    ///
    /// `opener` is the element focus returns to on close. Without one, the
    /// element active at the time of the call is remembered instead.
    pub fn open(&mut self, doc: &mut Document, opener: Option<NodeId>) -> Option<ModalEvent> {
        let (backdrop, dialog) = (self.elements.backdrop, self.elements.dialog);
        if !doc.is_connected(backdrop) || !doc.is_connected(dialog) {
            warn!("Opt-in dialog elements are no longer in the document, not opening");
            return None;
        }

        if self.is_open(doc) {
            // The opener from the first open stays; focus is already inside.
            self.refresh_focus(doc);
            debug!("Opt-in dialog already open");
            return None;
        }

        self.opener = opener.or_else(|| doc.active_element());

        doc.add_class(backdrop, &self.ids.open_class);
        doc.set_attribute(backdrop, "aria-hidden", "false");
        doc.set_style(doc.body(), "overflow", "hidden");
        for sibling in self.page_siblings(doc) {
            doc.set_attribute(sibling, "aria-hidden", "true");
        }

        self.refresh_focus(doc);
        self.timers
            .schedule(self.timing.open_focus_delay(), Deferred::FocusFirst);
        debug!(opener = ?self.opener, "Opened opt-in dialog");
        Some(ModalEvent::Opened)
    }

    /// Closes the dialog. Does nothing when it is already closed.
    pub fn close(&mut self, doc: &mut Document) -> Option<ModalEvent> {
        if !self.is_open(doc) {
            return None;
        }
        let backdrop = self.elements.backdrop;

        doc.remove_class(backdrop, &self.ids.open_class);
        doc.set_attribute(backdrop, "aria-hidden", "true");
        doc.remove_style(doc.body(), "overflow");
        for sibling in self.page_siblings(doc) {
            doc.remove_attribute(sibling, "aria-hidden");
        }

        match self.opener.filter(|opener| doc.is_connected(*opener)) {
            Some(opener) => self.move_focus(doc, opener),
            None => {
                // Focus must not stay on an element that is no longer shown.
                if doc.active_element().is_some_and(|active| doc.contains(backdrop, active))
                    && let Some(blurred) = doc.blur()
                {
                    self.dispatch(doc, &DomEvent::Blur { target: blurred });
                }
            }
        }

        self.timers
            .schedule(self.timing.close_reset_delay(), Deferred::Reset);
        debug!("Closed opt-in dialog");
        Some(ModalEvent::Closed)
    }

    /// Clears every form value, every field error and the success state.
    pub fn reset(&mut self, doc: &mut Document) {
        let form = self.elements.form;
        for node in doc.descendants(form) {
            if doc.get(node).tag().is_form_control() {
                doc.set_value(node, "");
            }
        }
        for field in self.fields() {
            field.clear_error(doc, &self.ids.error_class);
        }
        doc.remove_class(self.elements.panel, &self.ids.success_class);
        self.refresh_focus(doc);
        debug!("Reset opt-in form");
    }

    /// Recomputes the trap boundaries from what the dialog currently shows.
    /// In the success state the confirmation replaces the form's controls.
    pub(super) fn refresh_focus(&mut self, doc: &Document) {
        let mut focus = FocusSet::collect(doc, self.elements.dialog);
        if self.is_success(doc) {
            let form = self.elements.form;
            focus.retain(|node| !doc.contains(form, *node));
        }
        self.focus = focus;
    }

    pub(super) fn run_deferred(&mut self, doc: &mut Document, task: Deferred) {
        match task {
            Deferred::FocusFirst => {
                if let Some(first) = self.focus.first() {
                    self.move_focus(doc, first);
                }
            }
            Deferred::Reset => self.reset(doc),
        }
    }

    /// Top-level page elements other than the backdrop.
    fn page_siblings(&self, doc: &Document) -> Vec<NodeId> {
        let body = doc.body();
        doc.get(body)
            .children()
            .iter()
            .copied()
            .filter(|child| *child != self.elements.backdrop)
            .collect()
    }
}
