//! Command-line interface parsing for holocron
//!
//! This module handles parsing of CLI arguments using clap and validating them into
//! the runtime configuration the application is built from.

use clap::Parser;
use directories::ProjectDirs;
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::data::{RetryPolicy, DEFAULT_API_BASE};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Name of the log file written inside the data directory
const LOG_FILE_NAME: &str = "holocron.log";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The API base is not an absolute http(s) URL
    #[error("Invalid API base URL: '{0}'. Expected an absolute http or https URL")]
    InvalidApiBase(String),

    /// Fewer than one attempt was requested
    #[error("Invalid max attempts: {0}. At least one attempt is required")]
    InvalidMaxAttempts(u32),
}

/// holocron - Browse Star Wars characters, vehicles, and planets
#[derive(Parser, Debug)]
#[command(name = "holocron")]
#[command(about = "Browse Star Wars characters, vehicles, and planets from the terminal")]
#[command(version)]
pub struct Cli {
    /// Base URL of the Star Wars API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Directory for favorites, cached data, and the log file
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Write logs to this file instead of the data directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Attempts per request before giving up
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub max_attempts: u32,

    /// Keep everything in memory; nothing is read from or written to disk
    #[arg(long)]
    pub ephemeral: bool,

    /// Remove cached listings and details at startup (favorites are kept)
    #[arg(long)]
    pub clear_cache: bool,
}

/// Validated configuration the application is started with
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// API base URL, always ending in `/`
    pub api_base: String,
    /// Data directory, if one could be determined
    pub data_dir: Option<PathBuf>,
    /// Explicit log file path
    pub log_file: Option<PathBuf>,
    /// Retry policy for every request
    pub retry: RetryPolicy,
    /// Use a non-durable store
    pub ephemeral: bool,
    /// Drop cached catalog and detail entries at startup
    pub clear_cache: bool,
}

/// Builds [`AppConfig`] from parsed arguments
pub struct StartupConfig;

impl StartupConfig {
    /// Validates CLI arguments.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` with defaults applied
    /// * `Err(CliError)` if the API base or attempt count is invalid
    pub fn from_cli(cli: &Cli) -> Result<AppConfig, CliError> {
        if cli.max_attempts == 0 {
            return Err(CliError::InvalidMaxAttempts(cli.max_attempts));
        }

        let api_base = normalize_api_base(&cli.api_base)?;
        let data_dir = cli.data_dir.clone().or_else(default_data_dir);

        Ok(AppConfig {
            api_base,
            data_dir,
            log_file: cli.log_file.clone(),
            retry: RetryPolicy {
                max_attempts: cli.max_attempts,
                ..RetryPolicy::default()
            },
            ephemeral: cli.ephemeral,
            clear_cache: cli.clear_cache,
        })
    }
}

fn normalize_api_base(raw: &str) -> Result<String, CliError> {
    let url = Url::parse(raw).map_err(|_| CliError::InvalidApiBase(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(CliError::InvalidApiBase(raw.to_string()));
    }

    let mut base = url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "holocron").map(|dirs| dirs.data_dir().to_path_buf())
}

impl AppConfig {
    /// Directory of the persistent store
    pub fn store_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("store"))
    }

    /// Where logs are written; `None` disables logging
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| self.data_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME)))
    }

    /// Opens the store this configuration asks for
    ///
    /// Falls back to an in-memory store when no data directory is known.
    pub fn open_store(&self) -> Arc<dyn KeyValueStore> {
        if self.ephemeral {
            return Arc::new(MemoryStore::new());
        }
        match self.store_dir() {
            Some(dir) => Arc::new(FileStore::with_dir(dir)),
            None => {
                tracing::warn!("no data directory available, favorites will not persist");
                Arc::new(MemoryStore::new())
            }
        }
    }
}

/// Defaults to an in-memory store so nothing touches the user's data directory
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: None,
            log_file: None,
            retry: RetryPolicy::default(),
            ephemeral: true,
            clear_cache: false,
        }
    }
}
