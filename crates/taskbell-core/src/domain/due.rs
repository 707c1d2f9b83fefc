//! Due timestamps: parsing user text and formatting for replies.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use super::errors::TaskbellError;

/// +09:00 (JST)
const DEFAULT_UTC_OFFSET_SECS: i32 = 9 * 3600;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Offset for due text typed without one, unless configured otherwise.
pub fn default_utc_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parse a due timestamp.
///
/// Text with an explicit offset (RFC 3339) is taken as is; everything else is
/// local time in `offset`. A bare date means 23:59 on that day.
pub fn parse_due(text: &str, offset: FixedOffset) -> Result<DateTime<Utc>, TaskbellError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskbellError::validation("due timestamp must not be empty"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return localize(naive, offset);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format)
            && let Some(naive) = date.and_hms_opt(23, 59, 0)
        {
            return localize(naive, offset);
        }
    }

    Err(TaskbellError::validation(format!(
        "unrecognized due timestamp: {text} (expected e.g. 2025-01-10 15:00)"
    )))
}

fn localize(naive: NaiveDateTime, offset: FixedOffset) -> Result<DateTime<Utc>, TaskbellError> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TaskbellError::validation(format!("due timestamp out of range: {naive}")))
}

/// `2025-01-10 15:00` in the given offset.
pub fn format_local(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}
