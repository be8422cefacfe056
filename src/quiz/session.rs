//! A game session: the single owner of one live [`GameState`].
//!
//! Every state-changing call takes the write half of the session lock and
//! keeps it until its effects, including a restart after a finished game,
//! have been applied. Reads share the read half.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::GameRules;
use crate::quiz::engine::{GameState, HintOutcome, Score, Tick, Verdict};
use crate::quiz::pool::PoolBuilder;
use crate::quiz::rng::QuizRng;
use crate::quiz::source::QuestionSource;
use crate::quiz::{HintKind, Hints, QuizError};

/// What the player gets to see of the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub question: String,
    pub choices: Vec<String>,
}

struct Slot {
    game: Option<GameState>,
    rng: QuizRng,
}

pub struct GameSession<S> {
    source: S,
    builder: PoolBuilder,
    rules: Arc<GameRules>,
    slot: RwLock<Slot>,
}

impl<S: QuestionSource> GameSession<S> {
    /// Creates a session with no game yet. Call [`GameSession::start_game`].
    pub fn new(source: S, rules: GameRules, rng: QuizRng) -> Result<Self, QuizError> {
        rules.validate()?;
        Ok(Self {
            source,
            builder: PoolBuilder::new(rules.questions_per_difficulty),
            rules: Arc::new(rules),
            slot: RwLock::new(Slot { game: None, rng }),
        })
    }

    /// Replaces whatever game is running with a fresh one.
    pub async fn start_game(&self) -> Result<Score, QuizError> {
        let mut slot = self.slot.write().await;
        self.restart(&mut slot).await
    }

    /// Keeps calling [`GameSession::start_game`] with doubling backoff until a
    /// game starts, a non-retryable error shows up or the attempts run out.
    pub async fn start_game_with_retry(
        &self,
        attempts: u32,
        backoff: Duration,
    ) -> Result<Score, QuizError> {
        let mut delay = backoff;
        let mut attempt = 1;
        loop {
            match self.start_game().await {
                Ok(score) => return Ok(score),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    log::warn!(
                        "Starting a game failed (attempt {}/{}): {}",
                        attempt,
                        attempts,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub async fn is_active(&self) -> bool {
        let slot = self.slot.read().await;
        slot.game.as_ref().is_some_and(GameState::is_active)
    }

    pub async fn current_question(&self) -> Result<QuestionView, QuizError> {
        let slot = self.slot.read().await;
        let question = active(&slot.game)?.current_question();
        Ok(QuestionView {
            question: question.text.clone(),
            choices: question.choices.clone(),
        })
    }

    pub async fn hints(&self) -> Result<Hints, QuizError> {
        let slot = self.slot.read().await;
        Ok(active(&slot.game)?.hints())
    }

    pub async fn score(&self) -> Result<Score, QuizError> {
        let slot = self.slot.read().await;
        Ok(active(&slot.game)?.score())
    }

    pub async fn submit_answer(&self, candidate: &str) -> Result<Verdict, QuizError> {
        let mut slot = self.slot.write().await;
        let verdict = active_mut(&mut slot.game)?.submit_answer(candidate)?;
        log::debug!("Answer '{}' judged {:?}", candidate, verdict);

        if verdict.ends_game() {
            log::info!("Game ended with ${}", verdict.money());
            self.restart_after_end(&mut slot).await;
        }
        Ok(verdict)
    }

    pub async fn use_hint(&self, kind: HintKind) -> Result<HintOutcome, QuizError> {
        let mut slot = self.slot.write().await;
        let Slot { game, rng } = &mut *slot;
        let outcome = active_mut(game)?.use_hint(kind, rng)?;
        log::debug!("Used hint {:?}", kind);

        if outcome.ends_game() {
            log::info!("Game completed by skipping the last round");
            self.restart_after_end(&mut slot).await;
        }
        Ok(outcome)
    }

    pub async fn initialize_timer(&self) -> Result<u32, QuizError> {
        let mut slot = self.slot.write().await;
        active_mut(&mut slot.game)?.initialize_timer()
    }

    pub async fn tick(&self) -> Result<Tick, QuizError> {
        let mut slot = self.slot.write().await;
        let tick = active_mut(&mut slot.game)?.tick()?;

        if tick.is_expired() {
            log::info!("Time elapsed, game over");
            self.restart_after_end(&mut slot).await;
        }
        Ok(tick)
    }

    /// On failure the previous game, active or finished, stays in place.
    async fn restart(&self, slot: &mut Slot) -> Result<Score, QuizError> {
        let batch = self.source.fetch_batch().await?;
        let questions = self.builder.build(batch, &mut slot.rng)?;
        let game = GameState::new(questions, self.rules.clone())?;
        let score = game.score();
        slot.game = Some(game);

        log::info!("New game started");
        Ok(score)
    }

    /// The outcome of the finished game has already been decided, so a failed
    /// restart is only logged. The session stays without an active game until
    /// a later `start_game` succeeds.
    async fn restart_after_end(&self, slot: &mut Slot) {
        if let Err(err) = self.restart(slot).await {
            log::warn!("Could not start the next game: {}", err);
        }
    }
}

fn active(game: &Option<GameState>) -> Result<&GameState, QuizError> {
    match game {
        Some(game) if game.is_active() => Ok(game),
        _ => Err(no_active_game()),
    }
}

fn active_mut(game: &mut Option<GameState>) -> Result<&mut GameState, QuizError> {
    match game {
        Some(game) if game.is_active() => Ok(game),
        _ => Err(no_active_game()),
    }
}

fn no_active_game() -> QuizError {
    QuizError::InvalidOperation("no game is in progress".to_string())
}
