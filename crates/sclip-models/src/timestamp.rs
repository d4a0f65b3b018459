//! Timestamp parsing and formatting.
//!
//! Supports `HH:MM:SS`, `MM:SS`, and bare seconds, with optional
//! millisecond fractions.

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use sclip_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let parsed: Result<Vec<f64>, _> = parts
        .iter()
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| TimestampError::InvalidValue(p.to_string()))
        })
        .collect();
    let parsed = parsed?;

    if parsed.iter().any(|v| *v < 0.0) {
        return Err(TimestampError::Negative);
    }

    match parsed.as_slice() {
        [secs] => Ok(*secs),
        [mins, secs] => Ok(mins * 60.0 + secs),
        [hours, mins, secs] => Ok(hours * 3600.0 + mins * 60.0 + secs),
        _ => Err(TimestampError::InvalidFormat(ts.to_string())),
    }
}

/// Format seconds into `HH:MM:SS` or `HH:MM:SS.mmm`.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamp cannot be empty")]
    Empty,
    #[error("timestamp cannot be negative")]
    Negative,
    #[error("invalid timestamp component: {0}")]
    InvalidValue(String),
    #[error("invalid timestamp format '{0}'; use HH:MM:SS, MM:SS, or SS")]
    InvalidFormat(String),
}
