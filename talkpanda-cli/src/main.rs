//! CLI entry point for talkpanda

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use talkpanda_api::BackendClient;
use talkpanda_client::{ConversationSessionClient, SessionClose, SessionStart};
use talkpanda_core::config::{Config, ConfigLoader};
use talkpanda_core::logging::init_logging;
use talkpanda_core::session::{Role, SessionId};

#[derive(Parser)]
#[command(name = "talkpanda")]
#[command(about = "Practice English conversation from your terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive practice conversation
    Chat,
    /// List stored conversations
    History {
        /// Page to fetch
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Items per page (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Print one stored conversation
    Show {
        /// Session to print
        session_id: String,
    },
    /// Delete stored conversations
    Delete {
        /// Session to delete
        session_id: Option<String>,
        /// Delete every stored conversation
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    let _log_guard = init_logging(&config.logging);

    match cli.command {
        Commands::Chat => run_chat(&config).await,
        Commands::History { page, limit } => run_history(&config, page, limit).await,
        Commands::Show { session_id } => run_show(&config, session_id).await,
        Commands::Delete { session_id, all } => run_delete(&config, session_id, all).await,
    }
}

async fn run_chat(config: &Config) -> Result<()> {
    let client = ConversationSessionClient::from_config(config);

    match client.start_session().await? {
        SessionStart::Keyed(id) => {
            println!("{} {}", style("session").dim(), style(&id).dim());
        }
        SessionStart::Sessionless => {
            println!(
                "{}",
                style("Backend unreachable — practicing without saving this conversation.")
                    .yellow()
            );
        }
    }
    println!(
        "{}",
        style("Type a sentence to chat. Commands: /feedback /suggest /reset /end /quit").dim()
    );

    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        match line.as_str() {
            "/quit" => break,
            "/end" => {
                end_conversation(&client).await;
                break;
            }
            "/reset" => match client.reset_session(None).await {
                Ok(()) => println!("{}", style("Context cleared, clean slate.").dim()),
                Err(err) => print_error(&err),
            },
            "/feedback" => feedback_on_last_turn(&client).await,
            "/suggest" => suggest_for_last_reply(&client).await,
            text => exchange_turn(&client, text).await,
        }
    }

    Ok(())
}

async fn exchange_turn(client: &ConversationSessionClient, text: &str) {
    let spinner = spinner("panda is thinking...");
    let result = client.send_turn(text).await;
    spinner.finish_and_clear();

    match result {
        Ok(turn) => println!("{} {}", style("panda").green().bold(), turn.text),
        Err(err) => print_error(&err),
    }
}

async fn feedback_on_last_turn(client: &ConversationSessionClient) {
    let Some(turn_id) = client.transcript().last_turn_of(Role::User).map(|t| t.id) else {
        println!("{}", style("Nothing to check yet — say something first.").dim());
        return;
    };

    let spinner = spinner("checking grammar...");
    let result = client.request_feedback(turn_id).await;
    spinner.finish_and_clear();

    match result {
        Ok(feedback) if feedback.corrected => {
            println!(
                "{} {}",
                style("better:").cyan().bold(),
                feedback.corrected_text.unwrap_or_default()
            );
            if let Some(explanation) = feedback.explanation {
                println!("         {}", style(explanation).dim());
            }
        }
        Ok(_) => println!("{}", style("Sounds natural, nothing to fix.").cyan()),
        Err(err) => print_error(&err),
    }
}

async fn suggest_for_last_reply(client: &ConversationSessionClient) {
    let Some(turn_id) = client
        .transcript()
        .last_turn_of(Role::Assistant)
        .map(|t| t.id)
    else {
        println!("{}", style("No assistant reply to respond to yet.").dim());
        return;
    };

    let spinner = spinner("thinking of a reply...");
    let result = client.request_suggestion(turn_id).await;
    spinner.finish_and_clear();

    match result {
        Ok(suggestion) => println!("{} {}", style("try:").yellow().bold(), suggestion.text),
        Err(err) => print_error(&err),
    }
}

async fn end_conversation(client: &ConversationSessionClient) {
    let session_id = client.session_id();

    let spinner = spinner("saving conversation...");
    let result = client.finish_session().await;
    spinner.finish_and_clear();

    match result {
        Ok(SessionClose::Persisted(summary)) => {
            println!(
                "{} {} turns saved",
                style("done.").green().bold(),
                summary.turns
            );
            print_session_stats(client, session_id.as_ref()).await;
        }
        Ok(SessionClose::Unpersisted) => {
            println!("{}", style("Conversation ended (nothing saved).").dim());
        }
        Err(err) => print_error(&err),
    }
}

/// Best-effort post-session stats; the conversation is already saved, so
/// failures here only warn.
async fn print_session_stats(client: &ConversationSessionClient, session_id: Option<&SessionId>) {
    match client.ai().accuracy(session_id).await {
        Ok(report) => println!(
            "{} {:.0}%",
            style("accuracy").magenta(),
            report.accuracy * 100.0
        ),
        Err(err) => warn!(error = %err, "accuracy unavailable"),
    }

    match client.ai().review(session_id).await {
        Ok(review) if !review.words.is_empty() => {
            println!("{}", style("words to review:").magenta());
            for word in review.words {
                match word.meaning {
                    Some(meaning) => println!("  {} — {}", style(word.word).bold(), meaning),
                    None => println!("  {}", style(word.word).bold()),
                }
            }
        }
        Ok(_) => {}
        Err(err) => warn!(error = %err, "review unavailable"),
    }
}

async fn run_history(config: &Config, page: u32, limit: Option<u32>) -> Result<()> {
    let backend = BackendClient::new(&config.backend);
    let limit = limit.unwrap_or(config.backend.history_page_size);

    let items = backend.history(page, limit).await?;
    if items.is_empty() {
        println!("{}", style("No stored conversations.").dim());
        return Ok(());
    }

    for item in items {
        let title = item.title.unwrap_or_else(|| "(untitled)".to_string());
        let when = item
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {} turns  {}",
            style(&item.session_id).dim(),
            style(title).bold(),
            item.turns,
            style(when).dim()
        );
    }
    Ok(())
}

async fn run_show(config: &Config, session_id: String) -> Result<()> {
    let backend = BackendClient::new(&config.backend);
    let detail = backend.conversation(&SessionId::new(session_id)).await?;

    for entry in &detail.script {
        match entry.role() {
            Role::User => println!("{}  {}", style("you  ").bold(), entry.text),
            Role::Assistant => println!("{}  {}", style("panda").green().bold(), entry.text),
        }
    }
    Ok(())
}

async fn run_delete(config: &Config, session_id: Option<String>, all: bool) -> Result<()> {
    let backend = BackendClient::new(&config.backend);

    if all {
        let confirmed = Confirm::new()
            .with_prompt("Delete ALL stored conversations?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", style("Cancelled.").dim());
            return Ok(());
        }
        backend.delete_all().await?;
        println!("{}", style("All conversations deleted.").green());
        return Ok(());
    }

    match session_id {
        Some(id) => {
            backend.delete_conversation(&SessionId::new(id)).await?;
            println!("{}", style("Conversation deleted.").green());
            Ok(())
        }
        None => anyhow::bail!("pass a session id or --all"),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_error(err: &dyn std::error::Error) {
    eprintln!("{} {}", style("error:").red().bold(), err);
}
