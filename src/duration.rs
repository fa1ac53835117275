//! Duration-string grammar shared by the CLI and the collector.
//!
//! Grounded on `examples/original_source/src/python/utils/time_utils.py::parse_duration`:
//! `^(\d+)([hdwm])$`, where `h`/`d`/`w`/`m` are hours/days/weeks/"months"
//! (a fixed 30-day unit, not a calendar month).

use crate::error::CoreError;

const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_WEEK: u64 = 604_800;
const SECONDS_PER_MONTH: u64 = 2_592_000;

/// Parses a duration string like `"7d"` or `"1w"` into seconds.
pub fn parse_duration(text: &str) -> Result<u64, CoreError> {
    let invalid = || CoreError::InvalidDuration(text.to_string());

    if text.len() < 2 {
        return Err(invalid());
    }
    let (digits, unit) = text.split_at(text.len() - 1);
    let count: u64 = digits.parse().map_err(|_| invalid())?;
    let multiplier = match unit {
        "h" => SECONDS_PER_HOUR,
        "d" => SECONDS_PER_DAY,
        "w" => SECONDS_PER_WEEK,
        "m" => SECONDS_PER_MONTH,
        _ => return Err(invalid()),
    };

    Ok(count * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("1h").unwrap(), 3_600);
        assert_eq!(parse_duration("7d").unwrap(), 604_800);
        assert_eq!(parse_duration("2w").unwrap(), 1_209_600);
        assert_eq!(parse_duration("1m").unwrap(), 2_592_000);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(parse_duration("7").is_err());
        assert!(parse_duration("d7").is_err());
        assert!(parse_duration("7x").is_err());
        assert!(parse_duration("").is_err());
    }
}
