//! CalendarWindowPlanner - 締め切りと見積もりからカレンダー登録用の
//! [start, end) を計算する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::duration_parser::WorkDuration;
use crate::domain::TaskbellError;

/// Interval submitted to the calendar collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarWindow {
    /// Zero-length window (estimate had no markers).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// `start = due - duration`, `end = due`.
///
/// A zero duration gives a zero-length window; no minimum is enforced.
pub fn plan_window(
    due: DateTime<Utc>,
    duration: WorkDuration,
) -> Result<CalendarWindow, TaskbellError> {
    let start = due
        .checked_sub_signed(duration.to_time_delta())
        .ok_or_else(|| {
            TaskbellError::validation(format!(
                "estimated duration {}h{}m reaches before the supported time range",
                duration.hours, duration.minutes
            ))
        })?;
    Ok(CalendarWindow { start, end: due })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_ends_at_due() {
        let due = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        let window = plan_window(due, WorkDuration::new(1, 30)).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 1, 10, 13, 30, 0).unwrap());
        assert_eq!(window.end, due);
        assert!(!window.is_empty());
    }

    #[test]
    fn zero_duration_gives_empty_window() {
        let due = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        let window = plan_window(due, WorkDuration::default()).unwrap();
        assert_eq!(window.start, window.end);
        assert!(window.is_empty());
    }

    #[test]
    fn window_may_cross_midnight() {
        let due = Utc.with_ymd_and_hms(2025, 1, 10, 1, 0, 0).unwrap();
        let window = plan_window(due, WorkDuration::new(2, 0)).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 1, 9, 23, 0, 0).unwrap());
    }

    #[test]
    fn out_of_range_start_is_rejected() {
        let due = Utc.with_ymd_and_hms(-262_000, 1, 1, 0, 0, 0).unwrap();
        let result = plan_window(due, WorkDuration::new(u32::MAX, 0));
        assert!(matches!(result, Err(TaskbellError::Validation(_))));
    }
}
