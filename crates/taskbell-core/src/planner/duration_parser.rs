//! DurationParser - 文章生成サービスが返した所要時間の見積もり文から
//! 時間・分を抜き出す。
//!
//! 自然言語の解析ではなく、最初に見つかった `<数字>時間|h` と
//! `<数字>分|m` をそれぞれ独立に拾うだけのヒューリスティック。
//! 数字は半角と全角（`０`〜`９`）の両方を受け付ける。

use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9０-９]+)\s*(?:時間|h)").expect("HOURS_RE should compile - this is a bug")
});

static MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9０-９]+)\s*(?:分|m)").expect("MINUTES_RE should compile - this is a bug")
});

/// A non-negative span of work, hours plus minutes.
///
/// Minutes are kept as parsed (`90m` stays 0h90m); only the total matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDuration {
    pub hours: u32,
    pub minutes: u32,
}

impl WorkDuration {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0
    }

    pub fn to_time_delta(self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.hours)) + TimeDelta::minutes(i64::from(self.minutes))
    }
}

/// Extract the first hour count and the first minute count from `text`.
///
/// Missing markers count as zero, so text without any yields `0h0m`.
pub fn parse_duration(text: &str) -> WorkDuration {
    WorkDuration {
        hours: first_number(&HOURS_RE, text),
        minutes: first_number(&MINUTES_RE, text),
    }
}

fn first_number(re: &Regex, text: &str) -> u32 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| digits_value(m.as_str()))
        .unwrap_or(0)
}

/// 桁あふれは飽和させる（大きさの検証はしない）
fn digits_value(digits: &str) -> u32 {
    digits
        .chars()
        .filter_map(digit_value)
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d))
}

fn digit_value(c: char) -> Option<u32> {
    match c {
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => c.to_digit(10),
    }
}
