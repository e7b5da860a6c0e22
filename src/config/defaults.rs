use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::{GlobalKeybindings, ModalKeybindings};
use crossterm::event::KeyCode;

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            suspend: Key::with_ctrl(KeyCode::Char('z')).into(),
            activate: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Char(' ')),
            ]),
        }
    }
}

impl Default for ModalKeybindings {
    fn default() -> Self {
        Self {
            close: Key::new(KeyCode::Esc).into(),
            focus_next: Key::new(KeyCode::Tab).into(),
            focus_prev: KeyBinding::multiple(vec![
                Key::with_shift(KeyCode::BackTab),
                Key::with_shift(KeyCode::Tab),
                Key::new(KeyCode::BackTab),
            ]),
        }
    }
}
