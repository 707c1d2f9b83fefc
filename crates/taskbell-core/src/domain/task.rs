//! Task - 追跡対象のタスク
//!
//! 作成後に変化するのは `completed` と `notified` だけで、どちらも
//! false -> true の一方向にしか遷移しない。遷移はストア内部でのみ行う。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::TaskbellError;
use super::ids::{ChannelId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    due: DateTime<Utc>,
    channel: ChannelId,
    created_at: DateTime<Utc>,
    completed: bool,
    notified: bool,
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        title: String,
        due: DateTime<Utc>,
        channel: ChannelId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            due,
            channel,
            created_at,
            completed: false,
            notified: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn due(&self) -> DateTime<Utc> {
        self.due
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_notified(&self) -> bool {
        self.notified
    }

    /// Returns `true` if this call flipped the flag.
    pub(crate) fn mark_completed(&mut self) -> bool {
        let changed = !self.completed;
        self.completed = true;
        changed
    }

    pub(crate) fn mark_notified(&mut self) {
        self.notified = true;
    }

    /// Does `target` select this task?
    pub fn matches(&self, target: &TaskRef) -> bool {
        match target {
            TaskRef::Id(id) | TaskRef::IdOrTitle(id, _) => self.id == *id,
            TaskRef::Title(title) => self.title == *title,
        }
    }

    /// リマインド対象か（未完了・未通知・締め切りが threshold 以前）
    pub fn is_reminder_due(&self, threshold: DateTime<Utc>) -> bool {
        !self.completed && !self.notified && self.due <= threshold
    }
}

/// Trim and check a task title.
pub fn validate_title(title: &str) -> Result<String, TaskbellError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskbellError::validation("title must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// 完了対象の指定（ID または完全一致のタイトル）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    /// `#3`
    Id(TaskId),
    Title(String),
    /// `3`: ID を優先し、該当がなければ同じ文字列のタイトルを探す
    IdOrTitle(TaskId, String),
}

impl TaskRef {
    /// `"#3"` は ID、`"3"` は ID かタイトル、それ以外はタイトルとして解釈する。
    pub fn parse(input: &str) -> Result<Self, TaskbellError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TaskbellError::validation(
                "task identifier must be an id or a title",
            ));
        }
        if let Some(digits) = trimmed.strip_prefix('#')
            && is_ascii_number(digits)
        {
            let id = digits
                .parse::<u64>()
                .map_err(|e| TaskbellError::validation(format!("task id {digits}: {e}")))?;
            return Ok(TaskRef::Id(TaskId::new(id)));
        }
        if is_ascii_number(trimmed) {
            // ID として読めない桁数ならタイトルとしてだけ扱う
            return Ok(match trimmed.parse::<u64>() {
                Ok(id) => TaskRef::IdOrTitle(TaskId::new(id), trimmed.to_string()),
                Err(_) => TaskRef::Title(trimmed.to_string()),
            });
        }
        Ok(TaskRef::Title(trimmed.to_string()))
    }

    /// Second lookup to try when nothing matched this reference.
    pub fn title_fallback(&self) -> Option<TaskRef> {
        match self {
            TaskRef::IdOrTitle(_, title) => Some(TaskRef::Title(title.clone())),
            TaskRef::Id(_) | TaskRef::Title(_) => None,
        }
    }
}

fn is_ascii_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskRef::Id(id) | TaskRef::IdOrTitle(id, _) => id.fmt(f),
            TaskRef::Title(title) => write!(f, "「{title}」"),
        }
    }
}

/// Result of a completion request.
#[derive(Debug, Clone)]
pub struct Completion {
    pub task: Task,
    /// The task was completed before this call; nothing changed.
    pub already_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        let due = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        Task::new(
            TaskId::new(1),
            "資料作成".to_string(),
            due,
            ChannelId::new("C1"),
            due,
        )
    }

    #[test]
    fn new_task_is_open_and_not_notified() {
        let task = sample();
        assert!(!task.is_completed());
        assert!(!task.is_notified());
    }

    #[test]
    fn mark_completed_reports_first_transition_only() {
        let mut task = sample();
        assert!(task.mark_completed());
        assert!(!task.mark_completed());
        assert!(task.is_completed());
    }

    #[test]
    fn reminder_due_ignores_completed_and_notified() {
        let threshold = Utc.with_ymd_and_hms(2025, 1, 10, 15, 5, 0).unwrap();
        let mut task = sample();
        assert!(task.is_reminder_due(threshold));

        task.mark_notified();
        assert!(!task.is_reminder_due(threshold));

        let mut task = sample();
        task.mark_completed();
        assert!(!task.is_reminder_due(threshold));
    }

    #[test]
    fn validate_title_trims_and_rejects_blank() {
        assert_eq!(validate_title("  資料作成 ").unwrap(), "資料作成");
        assert!(matches!(
            validate_title("   "),
            Err(TaskbellError::Validation(_))
        ));
    }

    #[test]
    fn task_ref_parses_ids_and_titles() {
        assert_eq!(
            TaskRef::parse("3").unwrap(),
            TaskRef::IdOrTitle(TaskId::new(3), "3".to_string())
        );
        assert_eq!(TaskRef::parse(" #12 ").unwrap(), TaskRef::Id(TaskId::new(12)));
        assert_eq!(
            TaskRef::parse("資料作成").unwrap(),
            TaskRef::Title("資料作成".to_string())
        );
        assert_eq!(TaskRef::parse("#").unwrap(), TaskRef::Title("#".to_string()));
        assert!(TaskRef::parse("").is_err());
    }

    #[test]
    fn task_ref_rejects_ids_out_of_range() {
        assert!(TaskRef::parse("#99999999999999999999999").is_err());
        assert_eq!(
            TaskRef::parse("99999999999999999999999").unwrap(),
            TaskRef::Title("99999999999999999999999".to_string())
        );
    }

    #[test]
    fn bare_number_falls_back_to_title() {
        let target = TaskRef::parse("2025").unwrap();
        assert_eq!(target.title_fallback(), Some(TaskRef::Title("2025".to_string())));
        assert_eq!(TaskRef::parse("#2025").unwrap().title_fallback(), None);
        assert_eq!(target.to_string(), "#2025");
    }

    #[test]
    fn matches_by_id_or_exact_title() {
        let task = sample();
        assert!(task.matches(&TaskRef::Id(TaskId::new(1))));
        assert!(task.matches(&TaskRef::Title("資料作成".into())));
        assert!(!task.matches(&TaskRef::Title("資料".into())));
    }
}
