use std::fs::File;
use std::future::Future;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::quiz::QuizError;

/// One item as the trivia service sends it. Text is still HTML-entity encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub difficulty: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: u32,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

impl TriviaResponse {
    fn into_batch(self) -> Result<Vec<RawQuestion>, QuizError> {
        if self.response_code != 0 {
            return Err(QuizError::SourceUnavailable(format!(
                "question source answered with response code {}",
                self.response_code
            )));
        }
        Ok(self.results)
    }
}

/// Anything that can hand out a batch of raw trivia items.
pub trait QuestionSource: Send + Sync + 'static {
    fn fetch_batch(&self) -> impl Future<Output = Result<Vec<RawQuestion>, QuizError>> + Send;
}

/// Client for the Open Trivia Database API (or anything speaking its format).
pub struct OpenTriviaSource {
    client: reqwest::Client,
    url: String,
    amount: usize,
    category: Option<u32>,
}

impl OpenTriviaSource {
    pub fn new(
        url: impl Into<String>,
        amount: usize,
        category: Option<u32>,
        timeout: Duration,
    ) -> Result<Self, QuizError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            amount,
            category,
        })
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("amount", self.amount.to_string()),
            ("type", "multiple".to_string()),
        ];
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        query
    }
}

impl QuestionSource for OpenTriviaSource {
    async fn fetch_batch(&self) -> Result<Vec<RawQuestion>, QuizError> {
        log::debug!("Fetching {} questions from {}", self.amount, self.url);

        let response: TriviaResponse = self
            .client
            .get(&self.url)
            .query(&self.query())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let batch = response.into_batch()?;
        log::debug!("Question source returned {} items", batch.len());
        Ok(batch)
    }
}

/// A fixed batch, e.g. loaded from a file in the upstream wire format.
/// Every fetch hands out the whole batch again.
#[derive(Debug, Clone)]
pub struct StaticSource {
    batch: Vec<RawQuestion>,
}

impl StaticSource {
    pub fn new(batch: Vec<RawQuestion>) -> Self {
        Self { batch }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, QuizError> {
        let response: TriviaResponse = serde_json::from_reader(reader)?;
        Ok(Self::new(response.into_batch()?))
    }

    /// Loads a question file in the upstream wire format.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

impl QuestionSource for StaticSource {
    async fn fetch_batch(&self) -> Result<Vec<RawQuestion>, QuizError> {
        Ok(self.batch.clone())
    }
}
