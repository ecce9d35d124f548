use chrono::Duration;

use crate::error::ImpersonationError;

pub const DEFAULT_EXPIRES_IN: &str = "24h";

/// Parses a relative lifetime such as `24h`, `30 min` or `7d`.
pub fn parse_expires_in(input: &str) -> Result<Duration, ImpersonationError> {
    let invalid = |reason: &str| ImpersonationError::InvalidExpiry {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let split_at = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (amount, unit) = trimmed.split_at(split_at);

    if amount.is_empty() {
        return Err(invalid("missing amount"));
    }
    let amount: i64 = amount.parse().map_err(|_| invalid("amount out of range"))?;

    let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        "" => return Err(invalid("missing unit")),
        _ => return Err(invalid("unknown unit")),
    };

    let seconds = amount
        .checked_mul(seconds_per_unit)
        .ok_or_else(|| invalid("amount out of range"))?;
    if seconds == 0 {
        return Err(invalid("lifetime must be positive"));
    }

    Duration::try_seconds(seconds).ok_or_else(|| invalid("amount out of range"))
}

#[cfg(test)]
#[path = "tests/expiry_tests.rs"]
mod tests;
