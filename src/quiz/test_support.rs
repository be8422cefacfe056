//! Fixture batches shared by the unit tests.

use crate::quiz::source::{QuestionSource, RawQuestion};
use crate::quiz::QuizError;

pub(crate) fn raw(difficulty: &str, n: usize) -> RawQuestion {
    RawQuestion {
        question: format!("{} question #{}", difficulty, n),
        difficulty: difficulty.to_string(),
        correct_answer: format!("{} answer {}", difficulty, n),
        incorrect_answers: (1..=3)
            .map(|i| format!("{} wrong {}.{}", difficulty, n, i))
            .collect(),
        category: Some("Geography".to_string()),
    }
}

/// `per_difficulty` items of each difficulty, interleaved like a real batch.
pub(crate) fn batch(per_difficulty: usize) -> Vec<RawQuestion> {
    batch_with(per_difficulty, per_difficulty, per_difficulty)
}

pub(crate) fn batch_with(easy: usize, medium: usize, hard: usize) -> Vec<RawQuestion> {
    let most = easy.max(medium).max(hard);
    let mut items = Vec::new();
    for n in 0..most {
        if n < easy {
            items.push(raw("easy", n));
        }
        if n < medium {
            items.push(raw("medium", n));
        }
        if n < hard {
            items.push(raw("hard", n));
        }
    }
    items
}

/// A source whose upstream is always down.
pub(crate) struct DownSource;

impl QuestionSource for DownSource {
    async fn fetch_batch(&self) -> Result<Vec<RawQuestion>, QuizError> {
        Err(QuizError::SourceUnavailable("connection refused".to_string()))
    }
}

/// Serves `good_fetches` batches, then goes down for good.
pub(crate) struct FlakySource {
    batch: Vec<RawQuestion>,
    good_fetches: std::sync::atomic::AtomicUsize,
}

impl FlakySource {
    pub(crate) fn new(batch: Vec<RawQuestion>, good_fetches: usize) -> Self {
        Self {
            batch,
            good_fetches: std::sync::atomic::AtomicUsize::new(good_fetches),
        }
    }
}

impl QuestionSource for FlakySource {
    async fn fetch_batch(&self) -> Result<Vec<RawQuestion>, QuizError> {
        use std::sync::atomic::Ordering;

        let left = self.good_fetches.load(Ordering::SeqCst);
        if left == 0 {
            return Err(QuizError::SourceUnavailable("timed out".to_string()));
        }
        self.good_fetches.store(left - 1, Ordering::SeqCst);
        Ok(self.batch.clone())
    }
}
