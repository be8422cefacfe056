pub mod engine;
pub mod error;
pub mod pool;
pub mod rng;
pub mod session;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::str::FromStr;

pub use error::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Block order of a question sequence.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Parses the upstream tag. Anything else is not a playable difficulty.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    pub difficulty: Difficulty,
    pub correct_answer: String,
    pub choices: Vec<String>,
}

impl Question {
    /// Builds the choice list as the incorrect answers followed by the correct one.
    /// Duplicates are dropped so every choice is unique.
    pub fn new(
        text: String,
        difficulty: Difficulty,
        correct_answer: String,
        incorrect_answers: Vec<String>,
    ) -> Self {
        let mut choices: Vec<String> = Vec::with_capacity(incorrect_answers.len() + 1);
        for answer in incorrect_answers {
            if answer != correct_answer && !choices.contains(&answer) {
                choices.push(answer);
            }
        }
        choices.push(correct_answer.clone());

        Self {
            text,
            difficulty,
            correct_answer,
            choices,
        }
    }

    pub fn is_correct(&self, candidate: &str) -> bool {
        candidate == self.correct_answer
    }
}

/// One-time aids. `true` means still available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hints {
    pub two_choices: bool,
    pub hint: bool,
    pub skip: bool,
}

impl Default for Hints {
    fn default() -> Self {
        Self {
            two_choices: true,
            hint: true,
            skip: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    TwoChoices,
    /// Reserved: tracked in [`Hints`] but has no effect yet.
    Hint,
    Skip,
}

impl FromStr for HintKind {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twoChoices" => Ok(HintKind::TwoChoices),
            "hint" => Ok(HintKind::Hint),
            "skip" => Ok(HintKind::Skip),
            other => Err(QuizError::InvalidOperation(format!(
                "unknown hint kind '{}'",
                other
            ))),
        }
    }
}
