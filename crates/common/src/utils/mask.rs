/// Render a secret for log lines: a three character prefix and a fixed tail.
/// Values of three characters or fewer are fully masked.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let prefix: String = value.chars().take(3).collect();
    if value.chars().count() <= 3 {
        return "***".to_string();
    }
    format!("{prefix}***")
}
