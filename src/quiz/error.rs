use thiserror::Error;

use crate::quiz::Difficulty;

#[derive(Error, Debug)]
pub enum QuizError {
    /// The question source could not be reached, timed out or sent garbage.
    /// Retryable.
    #[error("Question source is unavailable: {0}")]
    SourceUnavailable(String),
    /// The fetched batch is too thin to fill one of the difficulty blocks.
    /// Retryable with a fresh fetch.
    #[error("Not enough {difficulty} questions: found {found}, need {needed}")]
    InsufficientQuestions {
        difficulty: Difficulty,
        found: usize,
        needed: usize,
    },
    /// The operation is not allowed in the current state. Never mutates state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// The request body could not be read as the expected JSON.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl QuizError {
    /// Whether a caller should try again later (with a fresh fetch).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuizError::SourceUnavailable(_) | QuizError::InsufficientQuestions { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QuizError::SourceUnavailable(_) => "sourceUnavailable",
            QuizError::InsufficientQuestions { .. } => "insufficientQuestions",
            QuizError::InvalidOperation(_) => "invalidOperation",
            QuizError::MalformedRequest(_) => "malformedRequest",
            QuizError::Config(_) => "config",
            QuizError::IO(_) => "io",
        }
    }
}

impl From<reqwest::Error> for QuizError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return QuizError::SourceUnavailable(format!("request timed out: {}", err));
        }
        QuizError::SourceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::SourceUnavailable(format!("malformed question batch: {}", err))
    }
}
