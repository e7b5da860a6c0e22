use crate::config::actions::{GlobalAction, ModalAction};
use crate::config::keybindings::KeybindingsConfig;
use crossterm::event::KeyEvent;
use std::sync::Arc;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
            GlobalAction::Activate => kb.activate.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Suspend => kb.suspend.display(),
            GlobalAction::Activate => kb.activate.display(),
        }
    }

    // Modal actions
    pub fn matches_modal(&self, event: &KeyEvent, action: ModalAction) -> bool {
        let kb = &self.keybindings.modal;
        match action {
            ModalAction::Close => kb.close.matches(event),
            ModalAction::FocusNext => kb.focus_next.matches(event),
            ModalAction::FocusPrev => kb.focus_prev.matches(event),
        }
    }

    pub fn display_modal(&self, action: ModalAction) -> String {
        let kb = &self.keybindings.modal;
        match action {
            ModalAction::Close => kb.close.display(),
            ModalAction::FocusNext => kb.focus_next.display(),
            ModalAction::FocusPrev => kb.focus_prev.display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_default_modal_bindings() {
        let resolver = KeyResolver::default();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);

        assert!(resolver.matches_modal(&esc, ModalAction::Close));
        assert!(resolver.matches_modal(&tab, ModalAction::FocusNext));
        assert!(!resolver.matches_modal(&tab, ModalAction::FocusPrev));
        assert!(resolver.matches_modal(&back_tab, ModalAction::FocusPrev));
        assert!(!resolver.matches_modal(&back_tab, ModalAction::FocusNext));
    }

    #[test]
    fn test_display_uses_first_key() {
        let resolver = KeyResolver::default();
        assert_eq!(resolver.display_modal(ModalAction::Close), "Esc");
        assert_eq!(resolver.display_global(GlobalAction::Activate), "Enter");
        assert_eq!(resolver.display_global(GlobalAction::Suspend), "ctrl+z");
    }
}
