//! CLI argument validators.

use crate::constants::confidence;

/// Parse a decision threshold in `[0, 1]`.
pub fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(confidence::MIN..=confidence::MAX).contains(&value) {
        return Err(format!(
            "threshold must be between {} and {}, got {value}",
            confidence::MIN,
            confidence::MAX
        ));
    }

    Ok(value)
}
