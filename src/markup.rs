//! The consent page served to the dialog.

use crate::config::ElementIds;
use crate::dom::{Document, Element, Tag};

pub const MAIN_ID: &str = "main";
pub const ACTIONS_CLASS: &str = "actions";
pub const FIELDS_CLASS: &str = "form-fields";
pub const SUCCESS_CLASS: &str = "form-success";
pub const ERROR_CLASS: &str = "field-error";
/// Class on the backdrop the stylesheet keys its visibility on.
pub const BACKDROP_CLASS: &str = "modal-backdrop";

/// Builds the landing page with its trigger buttons and the (closed)
/// opt-in dialog.
pub fn consent_page(ids: &ElementIds) -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    let main = doc.append(body, Element::new(Tag::Main).with_id(MAIN_ID));
    doc.append(
        main,
        Element::new(Tag::Heading).with_text("Never miss a delivery update"),
    );
    doc.append(
        main,
        Element::new(Tag::Paragraph).with_text(
            "Get order status, shipping notices and the occasional offer by text \
             message or email. You can opt out at any time.",
        ),
    );
    let actions = doc.append(main, Element::new(Tag::Div).with_class(ACTIONS_CLASS));
    doc.append(
        actions,
        Element::new(Tag::Button)
            .with_attr(&ids.trigger_attribute, "")
            .with_text("Get text updates"),
    );
    doc.append(
        actions,
        Element::new(Tag::Button)
            .with_attr(&ids.trigger_attribute, "")
            .with_text("Sign up by email"),
    );
    doc.append(
        actions,
        Element::new(Tag::Anchor)
            .with_attr("href", "/privacy")
            .with_text("Privacy policy"),
    );

    let backdrop = doc.append(
        body,
        Element::new(Tag::Div)
            .with_id(&ids.backdrop)
            .with_class(BACKDROP_CLASS)
            .with_attr("aria-hidden", "true"),
    );
    let dialog = doc.append(
        backdrop,
        Element::new(Tag::Section)
            .with_id(&ids.dialog)
            .with_attr("role", "dialog")
            .with_attr("aria-modal", "true")
            .with_attr("aria-labelledby", "optin-title"),
    );
    doc.append(
        dialog,
        Element::new(Tag::Button)
            .with_id(&ids.close)
            .with_attr("aria-label", "Close")
            .with_text("×"),
    );
    doc.append(
        dialog,
        Element::new(Tag::Heading)
            .with_id("optin-title")
            .with_text("Stay in the loop"),
    );

    let panel = doc.append(dialog, Element::new(Tag::Div).with_id(&ids.panel));
    let form = doc.append(
        panel,
        Element::new(Tag::Form)
            .with_id(&ids.form)
            .with_attr("novalidate", ""),
    );
    let fields = doc.append(form, Element::new(Tag::Div).with_class(FIELDS_CLASS));
    doc.append(
        fields,
        Element::new(Tag::Paragraph)
            .with_text("Tell us where to reach you. Message and data rates may apply."),
    );
    append_field(&mut doc, fields, &ids.phone, "tel", "Mobile phone", "(555) 123-4567");
    append_field(&mut doc, fields, &ids.email, "email", "Email address", "you@example.com");
    doc.append(
        fields,
        Element::new(Tag::Button)
            .with_attr("type", "submit")
            .with_text("Subscribe"),
    );

    let success = doc.append(panel, Element::new(Tag::Div).with_class(SUCCESS_CLASS));
    doc.append(success, Element::new(Tag::Heading).with_text("You're subscribed!"));
    doc.append(
        success,
        Element::new(Tag::Paragraph)
            .with_text("Watch for a confirmation text and email in the next few minutes."),
    );

    doc
}

fn append_field(
    doc: &mut Document,
    parent: crate::dom::NodeId,
    id: &str,
    kind: &str,
    label: &str,
    placeholder: &str,
) {
    doc.append(
        parent,
        Element::new(Tag::Label).with_attr("for", id).with_text(label),
    );
    doc.append(
        parent,
        Element::new(Tag::Input)
            .with_id(id)
            .with_attr("type", kind)
            .with_attr("name", kind)
            .with_attr("placeholder", placeholder)
            .with_attr("autocomplete", if kind == "tel" { "tel" } else { "email" }),
    );
    doc.append(
        parent,
        Element::new(Tag::Span)
            .with_class(ERROR_CLASS)
            .with_attr("role", "alert")
            .with_attr("aria-live", "polite"),
    );
}
