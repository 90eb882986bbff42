//! Application configuration: fixed constants and the runtime `Config`.

use crate::error::{AppError, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Default settling interval for the input debounce.
pub const DEFAULT_SETTLE_MS: u64 = 500;

/// API host for keys on the free plan (keys ending in `:fx`).
pub const FREE_API_URL: &str = "https://api-free.deepl.com";
/// API host for keys on a paid plan.
pub const PRO_API_URL: &str = "https://api.deepl.com";

/// Label of the source option that leaves the source language unset.
pub const DETECT_LANGUAGE_LABEL: &str = "Detect language";

/// Label of the glossary option that disables glossaries.
pub const NO_GLOSSARY_LABEL: &str = "No glossary";

/// Command line of the application.
#[derive(Debug, Parser)]
#[command(name = "deepl-tui")]
#[command(about = "Translate text in the terminal using the DeepL API", long_about = None)]
pub struct Cli {
    /// The authentication key as given in your DeepL account.
    #[arg(long, env = "DEEPL_AUTH_KEY", hide_env_values = true)]
    pub auth_key: Option<String>,

    /// Override the API host (defaults depend on the key's plan).
    #[arg(long)]
    pub server_url: Option<String>,

    /// Milliseconds without typing before the input is translated.
    #[arg(long, default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,

    /// Target language selected at startup, e.g. DE or EN-GB.
    #[arg(long)]
    pub target_lang: Option<String>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub auth_key: String,
    pub server_url: String,
    pub settle_interval: Duration,
    pub initial_target_lang: Option<String>,
    pub debug: bool,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Validates the parsed command line.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let auth_key = cli
            .auth_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(AppError::MissingAuthKey)?;

        let server_url = cli
            .server_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_server_url(&auth_key).to_string());

        Ok(Self {
            auth_key,
            server_url,
            settle_interval: Duration::from_millis(cli.settle_ms),
            initial_target_lang: cli.target_lang,
            debug: cli.debug,
            log_file: cli.log_file,
        })
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Free-plan keys carry a `:fx` suffix.
fn default_server_url(auth_key: &str) -> &'static str {
    if auth_key.ends_with(":fx") {
        FREE_API_URL
    } else {
        PRO_API_URL
    }
}
