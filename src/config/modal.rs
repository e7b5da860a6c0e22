use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the controller finds its elements in the hosting document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub backdrop: String,
    pub dialog: String,
    pub close: String,
    pub form: String,
    pub panel: String,
    pub phone: String,
    pub email: String,
    /// Attribute marking trigger buttons anywhere in the document.
    pub trigger_attribute: String,
    /// Class on the backdrop while the dialog is open.
    pub open_class: String,
    /// Class on the form panel once the opt-in succeeded.
    pub success_class: String,
    /// Class on an input whose value failed validation.
    pub error_class: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            backdrop: "optin-backdrop".to_string(),
            dialog: "optin-dialog".to_string(),
            close: "optin-close".to_string(),
            form: "optin-form".to_string(),
            panel: "optin-panel".to_string(),
            phone: "optin-phone".to_string(),
            email: "optin-email".to_string(),
            trigger_attribute: "data-optin-trigger".to_string(),
            open_class: "is-open".to_string(),
            success_class: "is-success".to_string(),
            error_class: "is-invalid".to_string(),
        }
    }
}

/// Fixed delays standing in for the paired stylesheet's transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub open_focus_delay_ms: u64,
    pub close_reset_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            open_focus_delay_ms: 50,
            close_reset_delay_ms: 300,
        }
    }
}

impl TimingConfig {
    pub const fn open_focus_delay(&self) -> Duration {
        Duration::from_millis(self.open_focus_delay_ms)
    }

    pub const fn close_reset_delay(&self) -> Duration {
        Duration::from_millis(self.close_reset_delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalConfig {
    #[serde(default)]
    pub elements: ElementIds,
    #[serde(default)]
    pub timing: TimingConfig,
}
