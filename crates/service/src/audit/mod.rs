//! Password auditing against a tenant's password policy.
//!
//! Rules run in a fixed order and the first failing rule is reported:
//! length, uppercase, lowercase, digit, symbol, excluded keywords,
//! excluded profile fields, guessable level.

mod estimator;
mod policy;

pub use estimator::{GuessabilityEstimator, ZxcvbnEstimator};
pub use policy::PasswordPolicy;

use regex::RegexBuilder;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::fields::FieldMap;

/// The first rule a password failed, with the thresholds involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PasswordViolation {
    #[error("password too short")]
    TooShort { min_length: usize, pw_length: usize },
    #[error("password uppercase required")]
    UppercaseRequired,
    #[error("password lowercase required")]
    LowercaseRequired,
    #[error("password digit required")]
    DigitRequired,
    #[error("password symbol required")]
    SymbolRequired,
    #[error("password containing excluded keywords")]
    ExcludedKeywords,
    #[error("password containing excluded fields")]
    ExcludedFields { fields: Vec<String> },
    #[error("password below guessable level")]
    BelowGuessableLevel { min_level: i32, pw_level: i32 },
}

impl PasswordViolation {
    pub fn kind(&self) -> &'static str {
        match self {
            PasswordViolation::TooShort { .. } => "too_short",
            PasswordViolation::UppercaseRequired => "uppercase_required",
            PasswordViolation::LowercaseRequired => "lowercase_required",
            PasswordViolation::DigitRequired => "digit_required",
            PasswordViolation::SymbolRequired => "symbol_required",
            PasswordViolation::ExcludedKeywords => "excluded_keywords",
            PasswordViolation::ExcludedFields { .. } => "excluded_fields",
            PasswordViolation::BelowGuessableLevel { .. } => "below_guessable_level",
        }
    }
}

// ASCII only: case folding must not depend on locale.
fn is_upper(c: char) -> bool { c.is_ascii_uppercase() }
fn is_lower(c: char) -> bool { c.is_ascii_lowercase() }
fn is_digit(c: char) -> bool { c.is_ascii_digit() }
fn is_symbol(c: char) -> bool { !is_upper(c) && !is_lower(c) && !is_digit(c) }

pub fn check_password_length(password: &str, min_length: i32) -> bool {
    if min_length <= 0 {
        return true;
    }
    password.len() >= min_length as usize
}

pub fn check_password_uppercase(password: &str) -> bool { password.chars().any(is_upper) }

pub fn check_password_lowercase(password: &str) -> bool { password.chars().any(is_lower) }

pub fn check_password_digit(password: &str) -> bool { password.chars().any(is_digit) }

pub fn check_password_symbol(password: &str) -> bool { password.chars().any(is_symbol) }

/// Case-insensitive literal substring check. An empty list always passes;
/// an empty keyword is a substring of every password and so always fails.
pub fn check_password_excluded_keywords<S: AsRef<str>>(password: &str, keywords: &[S]) -> bool {
    let words: Vec<String> = keywords
        .iter()
        .map(|w| regex::escape(w.as_ref()))
        .collect();
    if words.is_empty() {
        return true;
    }
    match RegexBuilder::new(&words.join("|")).case_insensitive(true).build() {
        Ok(re) => !re.is_match(password),
        // fail closed
        Err(_) => false,
    }
}

/// Returns the excluded profile fields whose string value occurs in the
/// password. Empty when the password passes.
pub fn check_password_excluded_fields(password: &str, user_data: &FieldMap, fields: &[String]) -> Vec<String> {
    user_data
        .string_values()
        .filter(|(key, _)| fields.iter().any(|f| f == key))
        .filter(|(_, value)| !check_password_excluded_keywords(password, &[*value]))
        .map(|(key, _)| key.to_string())
        .collect()
}

/// Returns `(pw_level, ok)` where `pw_level` is the estimator score plus one.
pub fn check_password_guessable_level<E: GuessabilityEstimator + ?Sized>(
    estimator: &E,
    password: &str,
    min_level: i32,
    user_inputs: &[&str],
) -> (i32, bool) {
    if min_level <= 0 {
        return (0, true);
    }
    let min_score = (min_level - 1).min(4);
    let score = i32::from(estimator.score(password, user_inputs));
    (score + 1, score >= min_score)
}

/// Stateless evaluator of one tenant's password policy.
pub struct PasswordAuditor<E = ZxcvbnEstimator> {
    policy: PasswordPolicy,
    estimator: E,
}

impl PasswordAuditor<ZxcvbnEstimator> {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy, estimator: ZxcvbnEstimator }
    }
}

impl<E: GuessabilityEstimator> PasswordAuditor<E> {
    pub fn with_estimator(policy: PasswordPolicy, estimator: E) -> Self {
        Self { policy, estimator }
    }

    pub fn policy(&self) -> &PasswordPolicy { &self.policy }

    pub fn should_save_password_history(&self) -> bool {
        self.policy.should_save_password_history()
    }

    /// Check `password` against the policy. `user_data` supplies the
    /// profile values for the excluded-fields rule and the guessability
    /// dictionary.
    pub fn validate(&self, password: &str, user_data: &FieldMap) -> Result<(), PasswordViolation> {
        let p = &self.policy;

        if !check_password_length(password, p.min_length) {
            return Err(PasswordViolation::TooShort {
                min_length: p.min_length.max(0) as usize,
                pw_length: password.len(),
            });
        }
        if p.uppercase_required && !check_password_uppercase(password) {
            return Err(PasswordViolation::UppercaseRequired);
        }
        if p.lowercase_required && !check_password_lowercase(password) {
            return Err(PasswordViolation::LowercaseRequired);
        }
        if p.digit_required && !check_password_digit(password) {
            return Err(PasswordViolation::DigitRequired);
        }
        if p.symbol_required && !check_password_symbol(password) {
            return Err(PasswordViolation::SymbolRequired);
        }
        if !check_password_excluded_keywords(password, p.excluded_keywords.as_slice()) {
            return Err(PasswordViolation::ExcludedKeywords);
        }
        if !p.excluded_fields.is_empty() {
            let hits = check_password_excluded_fields(password, user_data, &p.excluded_fields);
            if !hits.is_empty() {
                return Err(PasswordViolation::ExcludedFields { fields: hits });
            }
        }
        if p.min_guessable_level > 0 {
            let inputs: Vec<&str> = user_data.string_values().map(|(_, v)| v).collect();
            let (pw_level, ok) =
                check_password_guessable_level(&self.estimator, password, p.min_guessable_level, &inputs);
            if !ok {
                debug!(pw_level, min_level = p.min_guessable_level, "password_below_guessable_level");
                return Err(PasswordViolation::BelowGuessableLevel {
                    min_level: p.min_guessable_level,
                    pw_level,
                });
            }
        }
        Ok(())
    }
}
