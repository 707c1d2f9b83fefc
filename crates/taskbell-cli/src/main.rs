mod command;
mod console;
mod session;

use std::sync::Arc;

use anyhow::Context;
use taskbell_core::app::{AppBuilder, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleNotifier;
use crate::session::{Reply, Session};

const DEFAULT_LOG_FILTER: &str = "taskbell=info,taskbell_core=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // (A) ログ: stdout はチャット出力に使うので stderr へ
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    // (B) .env があれば読み込む（無くてもよい）
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(error) => debug!(%error, "no .env loaded"),
    }
    let config = Config::from_env().context("reading configuration")?;

    // (C) ワイヤリング
    let app = AppBuilder::new()
        .with_config(&config)
        .context("configuring text generator")?
        .notifier(Arc::new(ConsoleNotifier))
        .build()?;
    info!(
        channel = %config.channel,
        openai = config.openai.is_some(),
        tick_secs = config.reminder.tick.as_secs(),
        "taskbell started"
    );

    // (D) リマインドループ起動
    let reminders = app.start_reminders();

    // (E) stdin を 1 行ずつ処理。/quit か EOF で終了
    let mut session = Session::new(Arc::clone(&app.service), config.channel.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("taskbell へようこそ🔔 /help でコマンド一覧");
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match session.handle_line(&line).await {
            Reply::Text(text) if text.is_empty() => {}
            Reply::Text(text) => println!("{text}"),
            Reply::Quit => break,
        }
    }

    // (F) graceful shutdown
    reminders.shutdown_and_join().await;
    info!("taskbell stopped");
    Ok(())
}
