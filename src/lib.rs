//! Accessible phone/email opt-in consent dialog.
//!
//! The [`modal::ModalController`] drives an opt-in dialog living in a
//! [`dom::Document`]: open/close lifecycle, focus trap, escape and
//! click-outside dismissal, inline field validation and the success state.
//! [`host::Page`] wraps a document and its controller with the default
//! actions a browser would perform, so any front end only has to forward
//! keys, clicks and elapsed time.

pub mod config;
pub mod dom;
pub mod event;
pub mod host;
pub mod markup;
pub mod modal;
pub mod timer;
