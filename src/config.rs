//! Game rules and process configuration.
//!
//! Rules are fixed constants; the process settings come from the environment
//! (optionally via a `.env` file loaded in `main`).

use std::path::PathBuf;
use std::time::Duration;

use crate::quiz::QuizError;

/// Cumulative money unlocked by completing each round. Index 0 is the start.
pub const PRIZE_TABLE: [u64; 16] = [
    0, 100, 350, 600, 1000, 2000, 5000, 10000, 25000, 50000, 75000, 100000, 200000, 300000,
    500000, 1000000,
];

/// Seconds per round, one entry per difficulty block.
pub const ROUND_SECONDS: [u32; 3] = [15, 20, 25];

pub const QUESTIONS_PER_DIFFICULTY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    pub prize_table: Vec<u64>,
    pub round_seconds: Vec<u32>,
    pub questions_per_difficulty: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            prize_table: PRIZE_TABLE.to_vec(),
            round_seconds: ROUND_SECONDS.to_vec(),
            questions_per_difficulty: QUESTIONS_PER_DIFFICULTY,
        }
    }
}

impl GameRules {
    /// Total rounds in one game: one block per difficulty.
    pub fn round_count(&self) -> usize {
        self.questions_per_difficulty * self.round_seconds.len()
    }

    pub fn prize_for_round(&self, round: usize) -> u64 {
        self.prize_table[round]
    }

    /// What completing `round` adds to the player's money.
    pub fn prize_delta(&self, round: usize) -> u64 {
        self.prize_table[round] - self.prize_table[round - 1]
    }

    pub fn seconds_for_round(&self, round: usize) -> u32 {
        let tier = (round.saturating_sub(1) / self.questions_per_difficulty)
            .min(self.round_seconds.len() - 1);
        self.round_seconds[tier]
    }

    pub fn validate(&self) -> Result<(), QuizError> {
        if self.questions_per_difficulty == 0 {
            return Err(QuizError::Config(
                "questions per difficulty must be positive".to_string(),
            ));
        }
        if self.round_seconds.len() != 3 {
            return Err(QuizError::Config(
                "one time budget per difficulty is required".to_string(),
            ));
        }
        if self.prize_table.len() != self.round_count() + 1 {
            return Err(QuizError::Config(format!(
                "prize table needs {} entries, has {}",
                self.round_count() + 1,
                self.prize_table.len()
            )));
        }
        if self.prize_table[0] != 0 || self.prize_table.windows(2).any(|w| w[0] >= w[1]) {
            return Err(QuizError::Config(
                "prize table must start at 0 and strictly increase".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where questions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Remote {
        url: String,
        category: Option<u32>,
        batch_size: usize,
        timeout: Duration,
    },
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub source: SourceConfig,
    pub seed: Option<u64>,
    pub start_attempts: u32,
    pub retry_backoff: Duration,
    pub rules: GameRules,
}

const DEFAULT_SOURCE_URL: &str = "https://opentdb.com/api.php";
const DEFAULT_CATEGORY: u32 = 22;
const DEFAULT_BATCH_SIZE: usize = 50;

impl Config {
    pub fn from_env() -> Result<Self, QuizError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QuizError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rules = GameRules::default();
        rules.validate()?;

        let source = match lookup("QUIZ_QUESTIONS_FILE").filter(|p| !p.is_empty()) {
            Some(path) => SourceConfig::File(PathBuf::from(path)),
            None => {
                let batch_size = parse_or(&lookup, "QUIZ_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
                if batch_size < rules.round_count() {
                    return Err(QuizError::Config(format!(
                        "QUIZ_BATCH_SIZE must be at least {}",
                        rules.round_count()
                    )));
                }
                let category = match lookup("QUIZ_CATEGORY") {
                    Some(raw) if raw.is_empty() => None,
                    Some(raw) => Some(parse_value::<u32>("QUIZ_CATEGORY", &raw)?),
                    None => Some(DEFAULT_CATEGORY),
                };
                SourceConfig::Remote {
                    url: lookup("QUIZ_SOURCE_URL")
                        .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
                    category,
                    batch_size,
                    timeout: Duration::from_secs(parse_or(&lookup, "QUIZ_FETCH_TIMEOUT_SECS", 10)?),
                }
            }
        };

        let seed = match lookup("QUIZ_SEED") {
            Some(raw) => Some(parse_value::<u64>("QUIZ_SEED", &raw)?),
            None => None,
        };

        Ok(Self {
            port: parse_or(&lookup, "QUIZ_PORT", 3000)?,
            source,
            seed,
            start_attempts: parse_or::<_, u32>(&lookup, "QUIZ_START_ATTEMPTS", 5)?.max(1),
            retry_backoff: Duration::from_millis(parse_or(&lookup, "QUIZ_RETRY_BACKOFF_MS", 500)?),
            rules,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, QuizError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, QuizError> {
    raw.trim()
        .parse()
        .map_err(|_| QuizError::Config(format!("{} has an invalid value '{}'", key, raw)))
}
