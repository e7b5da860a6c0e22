use tracing::{debug, info};

use super::ModalController;
use crate::dom::Document;
use crate::event::{Handled, ModalEvent, OptIn};

impl ModalController {
    /// Handles a submit of the opt-in form. The native submission is always
    /// prevented.
    pub(super) fn submit(&mut self, doc: &mut Document) -> Handled {
        // Both fields are checked so every problem shows at once.
        let results = self
            .fields()
            .map(|field| field.validate(doc, &self.ids.error_class));

        if results.contains(&false) {
            let first_invalid = doc
                .descendants(self.elements.form)
                .into_iter()
                .find(|node| doc.has_class(*node, &self.ids.error_class));
            if let Some(target) = first_invalid {
                self.move_focus(doc, target);
            }
            debug!("Opt-in submission rejected");
            return Handled::Consumed;
        }

        let opt_in = OptIn {
            phone: doc.value(self.elements.phone.input).trim().to_string(),
            email: doc.value(self.elements.email.input).trim().to_string(),
        };
        doc.add_class(self.elements.panel, &self.ids.success_class);
        // The focused control is hidden along with the fields.
        self.refresh_focus(doc);
        if let Some(target) = self.focus.first() {
            self.move_focus(doc, target);
        }
        info!("Opt-in submission accepted");
        Handled::Event(ModalEvent::Submitted(opt_in))
    }
}
