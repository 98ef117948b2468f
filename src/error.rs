// Error types for quizdesk.
// Covers transport failures, service error payloads, version conflicts and input errors.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service error ({status}): {message}")]
    Service { status: StatusCode, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Quiz {quiz_id} was modified concurrently")]
    Conflict { quiz_id: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("CSV error on line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl QuizError {
    /// Message suitable for storing as the cache's last error.
    pub fn payload(&self) -> String {
        match self {
            QuizError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
