//! CLI argument definitions for the Sesli application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use sesli_core::config::SesliConfig;

/// Sesli - a voice-driven search dialogue in the terminal.
#[derive(Parser, Debug)]
#[command(name = "sesli", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// JSON catalog to search instead of the built-in one.
    #[arg(long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Capture session timeout in milliseconds.
    #[arg(short = 't', long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Language tag for speech input and output.
    #[arg(long = "language")]
    pub language: Option<String>,

    /// Print dialogue events as JSON lines.
    #[arg(long = "json-events")]
    pub json_events: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SESLI_CONFIG env var > platform default (~/.sesli/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SESLI_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > RUST_LOG (applied by the caller) > config file value.
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut SesliConfig) {
        if let Some(ref path) = self.catalog {
            config.search.catalog_path = Some(path.to_string_lossy().to_string());
        }
        if let Some(ms) = self.timeout_ms {
            config.speech.capture_timeout_ms = ms;
        }
        if let Some(ref language) = self.language {
            config.speech.language = language.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".sesli").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".sesli").join("config.toml");
    }
    PathBuf::from("config.toml")
}
