use serde::{Deserialize, Serialize};

use crate::config::key::KeyBinding;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub suspend: KeyBinding,
    /// Activates the focused button or link.
    pub activate: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalKeybindings {
    pub close: KeyBinding,
    pub focus_next: KeyBinding,
    pub focus_prev: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeybindingsConfig {
    #[serde(default)]
    pub global: GlobalKeybindings,
    #[serde(default)]
    pub modal: ModalKeybindings,
}
