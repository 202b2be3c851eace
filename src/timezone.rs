use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, Result};

/// Parse an IANA timezone name. Unknown names are a validation error,
/// never a silent fallback to UTC.
pub fn parse(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| AppError::Validation(format!("invalid timezone: {tz}")))
}

/// Render a stored UTC instant in the given timezone as RFC 3339.
pub fn to_local_rfc3339(utc: DateTime<Utc>, tz: Tz) -> String {
    utc.with_timezone(&tz).to_rfc3339()
}
