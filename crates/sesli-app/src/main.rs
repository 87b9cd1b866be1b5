//! Sesli application binary - composition root.
//!
//! Ties the Sesli crates into a terminal voice-search session:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (to stderr, so the dialogue owns stdout)
//! 3. Build the search index from the configured catalog or the built-in one
//! 4. Wire a console synthesizer and a channel-fed recognizer into the
//!    dialogue controller
//! 5. Read stdin: `:` commands drive the dialogue, other lines are "heard"

mod cli;
mod console;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

use sesli_core::config::SesliConfig;
use sesli_core::events::DialogueEvent;
use sesli_core::types::Phase;
use sesli_dialogue::{DialogueController, DialogueError, DialogueHandle};
use sesli_search::{builtin_catalog, load_catalog, SearchIndex};
use sesli_speech::{ChannelRecognizer, ConsoleSynthesizer, RecognizerFeed};

use cli::CliArgs;
use console::ConsoleCommand;

/// Expand ~ to home directory in a path string.
fn resolve_path(path: &str) -> PathBuf {
    if path.starts_with("~/") || path.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&path[2..])
    } else {
        PathBuf::from(path)
    }
}

/// Tracing filter priority: --log-level > RUST_LOG > config file.
fn init_tracing(flag: Option<String>, config_level: &str) {
    let filter = match flag {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_index(config: &SesliConfig) -> Result<SearchIndex, Box<dyn std::error::Error>> {
    let catalog = match config.search.catalog_path {
        Some(ref path) => load_catalog(&resolve_path(path))?,
        None => builtin_catalog(),
    };
    Ok(SearchIndex::with_max_results(
        catalog,
        config.search.max_results,
    )?)
}

/// Print dialogue events until the controller goes away.
async fn print_events(
    mut events: broadcast::Receiver<DialogueEvent>,
    index: Arc<SearchIndex>,
    json: bool,
) {
    loop {
        match events.recv().await {
            Ok(event) if json => match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "Event serialization failed"),
            },
            Ok(event) => {
                if let Some(line) = console::describe(&event, &index) {
                    println!("{}", line);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event printer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Run a session in the background so stdin stays responsive.
fn spawn_session(handle: DialogueHandle, query: Option<String>) {
    tokio::spawn(async move {
        let result = match query {
            Some(text) => handle.submit_query(text).await,
            None => handle.activate().await,
        };
        match result {
            Ok(outcome) => tracing::debug!(outcome = ?outcome, "Session finished"),
            Err(DialogueError::SessionActive(phase)) => {
                println!("Bir oturum zaten sürüyor ({}). Önce :temizle deyin.", phase);
            }
            // Already surfaced to the user by the controller.
            Err(e) => tracing::debug!(error = %e, "Session ended with error"),
        }
    });
}

async fn console_loop(handle: DialogueHandle, feed: RecognizerFeed) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Start => spawn_session(handle.clone(), None),
            ConsoleCommand::Search(query) => spawn_session(handle.clone(), Some(query)),
            ConsoleCommand::Clear => {
                if let Err(e) = handle.clear_search().await {
                    tracing::warn!(error = %e, "Clear failed");
                }
            }
            ConsoleCommand::State => match serde_json::to_string_pretty(&handle.state()) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "State serialization failed"),
            },
            ConsoleCommand::Help => println!("{}", console::HELP),
            ConsoleCommand::Quit => break,
            // Typing while idle searches, as the search box does.
            ConsoleCommand::Speech(text) if handle.phase() == Phase::Idle => {
                spawn_session(handle.clone(), Some(text));
            }
            ConsoleCommand::Speech(text) => {
                if !feed.say(text) {
                    tracing::warn!("Recognizer is gone, input dropped");
                }
            }
            ConsoleCommand::Unknown(line) => {
                println!("Bilinmeyen komut: {} (:yardim)", line);
            }
            ConsoleCommand::Empty => {}
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing exists so its log level can apply.
    let config_file = args.resolve_config_path();
    let config_found = config_file.exists();
    let mut config = SesliConfig::load_or_default(&config_file);
    args.apply_overrides(&mut config);

    init_tracing(args.resolve_log_level(), &config.general.log_level);
    tracing::info!("Starting Sesli v{}", env!("CARGO_PKG_VERSION"));
    if config_found {
        tracing::info!(path = %config_file.display(), "Configuration loaded");
    } else {
        tracing::info!(path = %config_file.display(), "No configuration file, using defaults");
    }

    let index = Arc::new(build_index(&config)?);
    tracing::info!(
        entries = index.len(),
        max_results = index.max_results(),
        "Search index ready"
    );

    let output = ConsoleSynthesizer::stdout(config.speech.words_per_minute);
    let (input, feed) = ChannelRecognizer::new();
    let (controller, handle) =
        DialogueController::from_config(Arc::clone(&index), output, input, &config);

    let printer = tokio::spawn(print_events(
        handle.subscribe(),
        Arc::clone(&index),
        args.json_events,
    ));
    let controller_task = tokio::spawn(controller.run());

    println!("{}", console::HELP);
    console_loop(handle.clone(), feed).await?;

    handle.shutdown().await;
    controller_task.await?;
    printer.abort();
    tracing::info!("Sesli stopped");
    Ok(())
}
