use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// An issued verification code for one profile value of one user.
#[derive(Clone, PartialEq)]
pub struct VerifyCode {
    pub id: Uuid,
    pub user_id: String,
    pub record_key: String,
    pub record_value: String,
    pub code: String,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl VerifyCode {
    pub fn new(user_id: &str, record_key: &str, record_value: &str, code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            record_key: record_key.to_string(),
            record_value: record_value.to_string(),
            code,
            consumed: false,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for VerifyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyCode")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("record_key", &self.record_key)
            .field("consumed", &self.consumed)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Fixed-length decimal codes.
#[derive(Debug, Clone)]
pub struct NumericCodeGenerator {
    length: usize,
}

impl NumericCodeGenerator {
    pub fn new(length: usize) -> Self { Self { length: length.max(1) } }
}

impl Default for NumericCodeGenerator {
    fn default() -> Self { Self::new(6) }
}

impl CodeGenerator for NumericCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
    }
}
