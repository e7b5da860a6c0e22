//! Document events and dispatch outcomes.

use crossterm::event::KeyEvent;

use crate::dom::NodeId;

/// An event delivered to the document-scope dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    Click { target: NodeId },
    Keydown(KeyEvent),
    Blur { target: NodeId },
    Input { target: NodeId },
    Submit { form: NodeId },
    TransitionEnd { target: NodeId },
}

/// Values collected by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptIn {
    pub phone: String,
    pub email: String,
}

/// Notifications the controller hands back to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    Opened,
    Closed,
    /// The form passed validation; delivery is up to the host.
    Submitted(OptIn),
}

/// Result of dispatching an event.
///
/// - `Ignored` - the dispatcher did not act; the host runs its default action
/// - `Consumed` - the event was handled and its default action prevented
/// - `Event(E)` - handled, default prevented, and produced a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled<E = ModalEvent> {
    Ignored,
    Consumed,
    Event(E),
}

impl<E> Handled<E> {
    /// Returns true if the event's default action was prevented.
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// An operation that produced no notification did nothing, so the host
/// keeps its default action.
impl<E> From<Option<E>> for Handled<E> {
    fn from(event: Option<E>) -> Self {
        event.map_or(Self::Ignored, Self::Event)
    }
}
