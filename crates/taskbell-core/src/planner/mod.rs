//! Planner - 見積もり文の解析とカレンダー枠の計算（純粋関数のみ）

pub mod calendar_window;
pub mod duration_parser;

pub use self::calendar_window::{CalendarWindow, plan_window};
pub use self::duration_parser::{WorkDuration, parse_duration};
