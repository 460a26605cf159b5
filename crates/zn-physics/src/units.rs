//! Livetime parsing.

use zn_core::{Error, Result};

/// Days per year.
pub const DAYS_PER_YEAR: f64 = 365.25;

fn seconds_per_unit(unit: &str) -> Option<f64> {
    let day = 86_400.0;
    Some(match unit {
        "y" | "yr" | "year" | "years" => DAYS_PER_YEAR * day,
        "d" | "day" | "days" => day,
        "h" | "hr" | "hour" | "hours" => 3_600.0,
        "m" | "min" | "minute" | "minutes" => 60.0,
        "s" | "sec" | "second" | "seconds" => 1.0,
        "ms" => 1e-3,
        "us" | "µs" => 1e-6,
        _ => return None,
    })
}

/// Parse a duration such as `"112.3 d"` or `"5 y"` into years.
///
/// A bare number is taken to be in years.
pub fn parse_duration_years(text: &str) -> Result<f64> {
    let text = text.trim();
    let number = text.trim_end_matches(|c: char| c.is_alphabetic());
    let unit = &text[number.len()..];
    let value: f64 = number.trim().parse().map_err(|_| {
        Error::Validation(format!(
            "cannot parse duration '{}': bad number '{}'",
            text,
            number.trim()
        ))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!("duration must be finite and >= 0, got '{}'", text)));
    }
    let unit = unit.trim();
    if unit.is_empty() {
        return Ok(value);
    }
    let seconds = seconds_per_unit(unit)
        .ok_or_else(|| Error::Validation(format!("unknown time unit '{}' in '{}'", unit, text)))?;
    Ok(value * seconds / (DAYS_PER_YEAR * 86_400.0))
}
