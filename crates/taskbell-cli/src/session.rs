//! One console conversation: turns input lines into replies.
//!
//! `/add-task` and the `/new` form both end up in `TaskService::create_task`.

use std::sync::Arc;

use chrono::FixedOffset;
use taskbell_core::app::{
    AddTaskOutcome, AddTaskRequest, CalendarSync, CompleteOutcome, TaskCounts, TaskService,
};
use taskbell_core::domain::{ChannelId, Task, TaskbellError, format_local};

use tracing::warn;

use crate::command::{self, Command, HELP};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// `/new` form progress.
enum Form {
    AwaitingTitle,
    AwaitingDue { title: String },
}

pub struct Session {
    service: Arc<TaskService>,
    channel: ChannelId,
    form: Option<Form>,
}

impl Session {
    pub fn new(service: Arc<TaskService>, channel: ChannelId) -> Self {
        Self {
            service,
            channel,
            form: None,
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> Reply {
        if let Some(form) = self.form.take() {
            return self.continue_form(form, line).await;
        }
        self.run(command::parse(line)).await
    }

    async fn run(&mut self, command: Command) -> Reply {
        match command {
            Command::AddTask { raw, title, due } => {
                Reply::Text(self.add_task(raw, title, due).await)
            }
            Command::NewForm => {
                self.form = Some(Form::AwaitingTitle);
                Reply::Text("タスクのタイトルを教えてね📝（/cancel でやめる）".into())
            }
            Command::List => Reply::Text(self.list().await),
            Command::Done(identifier) => Reply::Text(self.complete(&identifier).await),
            Command::Help => Reply::Text(HELP.into()),
            Command::Quit => Reply::Quit,
            Command::Usage(usage) => Reply::Text(usage.into()),
            Command::Unknown(name) => {
                Reply::Text(format!("「{name}」はわからないコマンドだよ🤔 /help を見てね"))
            }
            Command::Empty => Reply::Text(String::new()),
        }
    }

    async fn continue_form(&mut self, form: Form, line: &str) -> Reply {
        let input = line.trim();
        if input == "/cancel" {
            return Reply::Text("フォームをやめたよ".into());
        }
        // フォーム中のコマンドはタイトルや期限にせず、フォームを閉じて実行する
        if input.starts_with('/') {
            return match self.run(command::parse(input)).await {
                Reply::Text(text) => Reply::Text(format!("（フォームはやめたよ）\n{text}")),
                Reply::Quit => Reply::Quit,
            };
        }
        if input.is_empty() {
            self.form = Some(form);
            return Reply::Text("空っぽだよ💦 もう一度入力してね".into());
        }

        match form {
            Form::AwaitingTitle => {
                self.form = Some(Form::AwaitingDue {
                    title: input.to_string(),
                });
                Reply::Text("期限はいつ？（例: 2025-01-10 15:00）".into())
            }
            Form::AwaitingDue { title } => {
                let raw = format!("{title} {input}");
                Reply::Text(self.add_task(raw, title, input.to_string()).await)
            }
        }
    }

    async fn add_task(&self, raw_input: String, title: String, due_text: String) -> String {
        let request = AddTaskRequest {
            raw_input,
            title,
            due_text,
            channel: self.channel.clone(),
        };
        match self.service.create_task(request).await {
            Ok(outcome) => render_added(&outcome, self.service.offset()),
            Err(error) => render_error(&error),
        }
    }

    async fn list(&self) -> String {
        let tasks = self.service.list_tasks().await;
        render_list(&tasks, TaskCounts::from_tasks(&tasks), self.service.offset())
    }

    async fn complete(&self, identifier: &str) -> String {
        match self.service.complete_task(identifier).await {
            Ok(outcome) => render_completed(&outcome),
            Err(error) => render_error(&error),
        }
    }
}

fn render_added(outcome: &AddTaskOutcome, offset: FixedOffset) -> String {
    let task = &outcome.task;
    let mut out = format!(
        "{}\n📌 {} {}（締め切り {}）",
        outcome.reply,
        task.id(),
        task.title(),
        format_local(task.due(), offset)
    );
    match &outcome.calendar {
        CalendarSync::Created { event_id, window } => out.push_str(&format!(
            "\n📅 カレンダーに {}〜{} で登録したよ ({event_id})",
            format_local(window.start, offset),
            format_local(window.end, offset)
        )),
        CalendarSync::Failed { error } => {
            out.push_str(&format!("\n⚠️ カレンダー登録は失敗しちゃった: {error}"))
        }
    }
    out
}

fn render_list(tasks: &[Task], counts: TaskCounts, offset: FixedOffset) -> String {
    if tasks.is_empty() {
        return "タスクはまだないよ🌱".into();
    }
    let mut out = format!(
        "📋 タスク一覧 {} 件（未完了 {} / 完了 {}）",
        counts.total(),
        counts.open,
        counts.completed
    );
    for task in tasks {
        let mark = if task.is_completed() { "[x]" } else { "[ ]" };
        let bell = if task.is_notified() { " 🔔" } else { "" };
        out.push_str(&format!(
            "\n{} {mark} {}（締め切り {}）{bell}",
            task.id(),
            task.title(),
            format_local(task.due(), offset)
        ));
    }
    out
}

fn render_completed(outcome: &CompleteOutcome) -> String {
    let title = outcome.task.title();
    match &outcome.celebration {
        None => format!("「{title}」はもう完了してるよ✅"),
        Some(Ok(text)) => text.clone(),
        Some(Err(error)) => {
            format!("「{title}」を完了にしたよ✅\n（お祝いメッセージは作れなかった: {error}）")
        }
    }
}

fn render_error(error: &TaskbellError) -> String {
    if !error.is_user_error() {
        warn!(%error, "request failed");
    }
    match error {
        TaskbellError::Validation(message) => format!("ごめんね💦 {message}"),
        TaskbellError::NotFound(target) => format!("{target} が見つからなかったよ🔍"),
        TaskbellError::Collaborator { .. } | TaskbellError::Config(_) => {
            format!("エラーが起きちゃった…😢\n```{error}```")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskbell_core::impls::{InMemoryCalendar, InMemoryTaskStore, TemplateTextGenerator};
    use taskbell_core::ports::{SystemClock, UlidGenerator};

    fn session() -> Session {
        let clock = Arc::new(SystemClock);
        let service = TaskService::new(
            Arc::new(InMemoryTaskStore::new(clock.clone())),
            Arc::new(TemplateTextGenerator::new("1時間30分")),
            Arc::new(InMemoryCalendar::new(Box::new(UlidGenerator::new(clock)))),
            FixedOffset::east_opt(9 * 3600).unwrap(),
        );
        Session::new(Arc::new(service), ChannelId::new("console"))
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn add_list_and_complete() {
        let mut s = session();

        let added = text(s.handle_line("/add-task 資料作成 2025-01-10 15:00").await);
        assert!(added.contains("#1 資料作成（締め切り 2025-01-10 15:00）"));
        assert!(added.contains("2025-01-10 13:30〜2025-01-10 15:00"));

        let list = text(s.handle_line("/list").await);
        assert!(list.contains("📋 タスク一覧 1 件（未完了 1 / 完了 0）"));
        assert!(list.contains("#1 [ ] 資料作成（締め切り 2025-01-10 15:00）"));

        let done = text(s.handle_line("/done 資料作成").await);
        assert!(done.contains("おめでとう"));
        let again = text(s.handle_line("/done 1").await);
        assert!(again.contains("もう完了してる"));

        let list = text(s.handle_line("/list").await);
        assert!(list.contains("#1 [x] 資料作成"));
    }

    #[tokio::test]
    async fn form_collects_title_then_due() {
        let mut s = session();

        text(s.handle_line("/new").await);
        let ask_due = text(s.handle_line("週次 レポート").await);
        assert!(ask_due.contains("期限"));
        let added = text(s.handle_line("2025-01-11 10:00").await);
        assert!(added.contains("#1 週次 レポート"));
    }

    #[tokio::test]
    async fn form_can_be_cancelled() {
        let mut s = session();
        text(s.handle_line("/new").await);
        text(s.handle_line("/cancel").await);
        assert_eq!(text(s.handle_line("/list").await), "タスクはまだないよ🌱");
    }

    #[tokio::test]
    async fn commands_typed_into_the_form_are_not_used_as_input() {
        let mut s = session();

        text(s.handle_line("/new").await);
        let list = text(s.handle_line("/list").await);
        assert!(list.contains("フォームはやめた"));
        assert!(list.contains("タスクはまだないよ"));

        // フォームは閉じているので次の行は通常のコマンド
        assert!(text(s.handle_line("週次").await).contains("わからないコマンド"));

        text(s.handle_line("/new").await);
        text(s.handle_line("週次 レポート").await);
        assert_eq!(s.handle_line("/quit").await, Reply::Quit);
        assert_eq!(text(s.handle_line("/list").await), "タスクはまだないよ🌱");
    }

    #[tokio::test]
    async fn errors_are_friendly() {
        let mut s = session();
        assert!(text(s.handle_line("/add-task 資料作成 あした").await).starts_with("ごめんね💦"));
        assert!(text(s.handle_line("/done 9").await).contains("#9 が見つからなかった"));
        assert_eq!(s.handle_line("/quit").await, Reply::Quit);
    }
}
