/// Strength estimator consulted by the guessable-level rule.
pub trait GuessabilityEstimator: Send + Sync {
    /// Score in `0..=4`. `user_inputs` are extra dictionary words that
    /// should count as easy to guess.
    fn score(&self, password: &str, user_inputs: &[&str]) -> u8;
}

/// Estimator backed by the `zxcvbn` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZxcvbnEstimator;

impl GuessabilityEstimator for ZxcvbnEstimator {
    fn score(&self, password: &str, user_inputs: &[&str]) -> u8 {
        // zxcvbn refuses blank passwords; those are as guessable as it gets.
        match zxcvbn::zxcvbn(password, user_inputs) {
            Ok(entropy) => entropy.score().min(4),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_password_scores_zero() {
        assert_eq!(ZxcvbnEstimator.score("", &[]), 0);
    }

    #[test]
    fn user_inputs_lower_the_score() {
        let pw = "correcthorsebatterystaple";
        let plain = ZxcvbnEstimator.score(pw, &[]);
        let seeded = ZxcvbnEstimator.score(pw, &["correcthorsebatterystaple"]);
        assert!(seeded <= plain);
        assert_eq!(seeded, 0);
    }
}
