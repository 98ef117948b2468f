// Configuration for quizdesk.
// Layers defaults, an optional JSON file and QUIZDESK_* environment variables.

pub mod paths;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QuizError, Result};
use crate::state::QuestionFetch;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

const ENV_BASE_URL: &str = "QUIZDESK_BASE_URL";
const ENV_DEDUPE: &str = "QUIZDESK_DEDUPE_QUESTIONS";
const ENV_RETRIES: &str = "QUIZDESK_MAX_RETRIES";
const ENV_TIMEOUT: &str = "QUIZDESK_TIMEOUT_SECS";

/// Runtime settings for the client and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the quiz data service.
    pub base_url: String,
    /// Drop questions whose text repeats an earlier one when fetching a quiz.
    pub dedupe_questions: bool,
    /// Re-fetch attempts after a version conflict before giving up.
    pub max_conflict_retries: u32,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dedupe_questions: true,
            max_conflict_retries: 3,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default config file is
    /// read if present. Environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match paths::config_path().filter(|p| p.exists()) {
                Some(default_path) => Self::from_file(&default_path)?,
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config file");
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_DEDUPE) {
            self.dedupe_questions = parse_bool(ENV_DEDUPE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RETRIES) {
            self.max_conflict_retries = parse_number(ENV_RETRIES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            self.request_timeout_secs = parse_number(ENV_TIMEOUT, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(QuizError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(QuizError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Question fetch policy selected by `dedupe_questions`.
    pub fn question_fetch(&self) -> QuestionFetch {
        if self.dedupe_questions {
            QuestionFetch::Deduplicate
        } else {
            QuestionFetch::Verbatim
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(QuizError::Config(format!("{} must be a boolean, got {:?}", key, raw))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| QuizError::Config(format!("{} must be a number, got {:?}", key, raw)))
}
