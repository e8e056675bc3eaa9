use serde::{Deserialize, Serialize};

/// Password strength thresholds of one tenant. Every threshold at its
/// zero/disabled value accepts any password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum length in UTF-8 bytes; disabled when <= 0.
    pub min_length: i32,
    pub uppercase_required: bool,
    pub lowercase_required: bool,
    pub digit_required: bool,
    pub symbol_required: bool,
    /// Minimum guessability level on a 1..=5 scale; disabled when <= 0.
    pub min_guessable_level: i32,
    pub excluded_keywords: Vec<String>,
    /// Profile field names whose string values must not appear in the password.
    pub excluded_fields: Vec<String>,
    pub history_size: i32,
    pub history_days: i32,
    pub expiry_days: i32,
}

impl PasswordPolicy {
    /// Whether prior password hashes should be recorded on change.
    pub fn should_save_password_history(&self) -> bool {
        self.history_size > 0 || self.history_days > 0
    }
}
