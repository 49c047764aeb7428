//! Settings file handling: `~/.exam-results.conf`.
//!
//! Plain `key=value` lines. Missing files and keys fall back to defaults.

use crate::print::DEFAULT_PRINT_COMMAND;
use crate::ranking::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATASET_SOURCE: &str = "students.json";

/// Status keyword that marks a failed result ("failed" in the dataset's language).
pub const DEFAULT_FAIL_KEYWORD: &str = "راسب";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// URL or file path of the dataset document
    pub dataset_source: String,
    pub fail_keyword: String,
    pub leaderboard_size: usize,
    /// Program (plus leading arguments) that receives the slip path
    pub print_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_source: DEFAULT_DATASET_SOURCE.to_string(),
            fail_keyword: DEFAULT_FAIL_KEYWORD.to_string(),
            leaderboard_size: DEFAULT_TOP_N,
            print_command: DEFAULT_PRINT_COMMAND.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings text. Unknown keys and bad values are logged and skipped.
    pub fn parse(content: &str) -> Self {
        let mut settings = Settings::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "dataset_source" => settings.dataset_source = value.to_string(),
                "fail_keyword" => settings.fail_keyword = value.to_string(),
                "leaderboard_size" => match value.parse() {
                    Ok(n) => settings.leaderboard_size = n,
                    Err(_) => log::warn!("Invalid leaderboard_size '{}', using default", value),
                },
                "print_command" => settings.print_command = value.to_string(),
                other => log::warn!("Unknown config key '{}'", other),
            }
        }

        settings
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read config {}", path.display())),
        }
    }

    /// Load from the user's config file, if there is a home directory.
    ///
    /// An unreadable file is logged and the defaults are used instead.
    pub fn load_or_default() -> Self {
        match config_path() {
            Some(path) => Self::load_from_or_default(&path),
            None => Self::default(),
        }
    }

    fn load_from_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            log::warn!("{:#}; using default settings", e);
            Self::default()
        })
    }
}

/// Get the config file path: ~/.exam-results.conf
pub fn config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".exam-results.conf"))
}
