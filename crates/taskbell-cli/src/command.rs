//! Slash command parsing for the console front end.

pub const ADD_USAGE: &str = "ごめんね💦 `/add-task タイトル 期限` の形で送ってねっ🌸";
pub const DONE_USAGE: &str = "ごめんね💦 `/done 番号かタイトル` の形で送ってねっ🌸";

pub const HELP: &str = "\
使えるコマンド:
  /add-task <タイトル> <期限>   例: /add-task 資料作成 2025-01-10 15:00
  /new                         タイトルと期限を順番に聞くフォーム
  /list                        タスク一覧
  /done <番号|タイトル>         タスクを完了にする（3 は ID 優先、#3 は ID のみ）
  /help                        この説明
  /quit                        終了";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/add-task <title> <due...>`; `raw` is everything after the command.
    AddTask {
        raw: String,
        title: String,
        due: String,
    },
    NewForm,
    List,
    Done(String),
    Help,
    Quit,
    /// Known command with missing arguments; carries the usage text.
    Usage(&'static str),
    Unknown(String),
    Empty,
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "/add-task" => match rest.split_once(char::is_whitespace) {
            Some((title, due)) if !due.trim().is_empty() => Command::AddTask {
                raw: rest.to_string(),
                title: title.to_string(),
                due: due.trim().to_string(),
            },
            _ => Command::Usage(ADD_USAGE),
        },
        "/new" => Command::NewForm,
        "/list" => Command::List,
        "/done" | "/complete" if rest.is_empty() => Command::Usage(DONE_USAGE),
        "/done" | "/complete" => Command::Done(rest.to_string()),
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(name.to_string()),
    }
}
