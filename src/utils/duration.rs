use crate::error::{LockfileError, Result};
use std::time::Duration;

/// Parse a duration string like "250ms", "30s", "5m", "2h", "7d"
/// Defaults to seconds if no unit specified
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if s.is_empty() {
        return Err(LockfileError::InvalidDuration {
            input: s.to_string(),
            message: "empty string".to_string(),
        });
    }

    // "ms" must be checked before the single-letter units
    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, "h")
    } else if let Some(stripped) = s.strip_suffix('d') {
        (stripped, "d")
    } else {
        // No unit, assume seconds
        (s, "s")
    };

    let invalid = || LockfileError::InvalidDuration {
        input: s.to_string(),
        message: "expected format: NUMBER[ms|s|m|h|d] (e.g., '250ms', '30s', '5m', '2h', '7d')"
            .to_string(),
    };

    let value: u64 = num_str.parse().map_err(|_| invalid())?;

    let multiplier = match unit {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        _ => unreachable!(),
    };

    let seconds = value.checked_mul(multiplier).ok_or_else(invalid)?;
    Ok(Duration::from_secs(seconds))
}

/// Parse an octal permission string like "0600" or "644"
pub fn parse_mode(s: &str) -> Result<u32> {
    let digits = s.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);

    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| LockfileError::InvalidPermissions {
            input: s.to_string(),
        })
}
