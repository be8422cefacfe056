//! The round engine: one game's mutable state and its transition rules.
//!
//! A [`GameState`] starts `Active` on round 1 with no money and every hint
//! available. Correct answers and skips move it forward one round at a time.
//! A wrong answer or an expired timer moves it to `GameOver`; finishing the
//! last round moves it to `Jackpot`. Both are terminal: every further
//! operation is rejected and the owner replaces the state with a fresh game.

use std::sync::Arc;

use serde::Serialize;

use crate::config::GameRules;
use crate::quiz::rng::QuizRng;
use crate::quiz::{HintKind, Hints, Question, QuizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Active,
    GameOver,
    Jackpot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Verdict {
    Correct { money: u64 },
    Wrong { correct_answer: String, money: u64 },
    Jackpot { money: u64 },
}

impl Verdict {
    pub fn ends_game(&self) -> bool {
        !matches!(self, Verdict::Correct { .. })
    }

    pub fn money(&self) -> u64 {
        match self {
            Verdict::Correct { money } | Verdict::Wrong { money, .. } | Verdict::Jackpot { money } => {
                *money
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            Verdict::Correct { .. } => "Correct!".to_string(),
            Verdict::Jackpot { .. } => "Congratulations!\nYou are a millionaire!".to_string(),
            Verdict::Wrong {
                correct_answer,
                money,
            } => format!(
                "Wrong!\nThe correct answer is {}\n\nGame Over :(\nYou won ${}",
                correct_answer, money
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Running { remaining: i64 },
    Expired {
        remaining: i64,
        correct_answer: String,
        money: u64,
    },
}

impl Tick {
    pub fn remaining(&self) -> i64 {
        match self {
            Tick::Running { remaining } | Tick::Expired { remaining, .. } => *remaining,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Tick::Expired { .. })
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Tick::Running { .. } => None,
            Tick::Expired {
                correct_answer,
                money,
                ..
            } => Some(format!(
                "Time elapsed\nThe correct answer is {}\n\nGame Over :(\nYou won ${}",
                correct_answer, money
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HintOutcome {
    TwoChoices {
        choices: Vec<String>,
        hints: Hints,
    },
    Skip {
        answer: String,
        hints: Hints,
        money: u64,
        /// The skipped round was the last one.
        jackpot: bool,
    },
}

impl HintOutcome {
    pub fn ends_game(&self) -> bool {
        matches!(self, HintOutcome::Skip { jackpot: true, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub round: usize,
    pub money: u64,
    /// What the current round is worth.
    pub prize: u64,
}

#[derive(Debug, Clone)]
pub struct GameState {
    rules: Arc<GameRules>,
    questions: Vec<Question>,
    round: usize,
    money: u64,
    hints: Hints,
    remaining_seconds: i64,
    phase: Phase,
}

impl GameState {
    /// Starts a game on round 1 with its timer initialized.
    pub fn new(questions: Vec<Question>, rules: Arc<GameRules>) -> Result<Self, QuizError> {
        if questions.len() != rules.round_count() {
            return Err(QuizError::InvalidOperation(format!(
                "a game needs {} questions, got {}",
                rules.round_count(),
                questions.len()
            )));
        }

        let mut state = Self {
            rules,
            questions,
            round: 1,
            money: 0,
            hints: Hints::default(),
            remaining_seconds: 0,
            phase: Phase::Active,
        };
        state.reset_timer();
        Ok(state)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn money(&self) -> u64 {
        self.money
    }

    pub fn hints(&self) -> Hints {
        self.hints
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.round - 1]
    }

    pub fn score(&self) -> Score {
        Score {
            round: self.round,
            money: self.money,
            prize: self.rules.prize_delta(self.round),
        }
    }

    pub fn submit_answer(&mut self, candidate: &str) -> Result<Verdict, QuizError> {
        self.ensure_active()?;

        if !self.current_question().is_correct(candidate) {
            let correct_answer = self.current_question().correct_answer.clone();
            self.phase = Phase::GameOver;
            log::debug!(
                "Wrong answer on round {}, game over with ${}",
                self.round,
                self.money
            );
            return Ok(Verdict::Wrong {
                correct_answer,
                money: self.money,
            });
        }

        if self.complete_round() {
            return Ok(Verdict::Jackpot { money: self.money });
        }
        Ok(Verdict::Correct { money: self.money })
    }

    /// Sets the countdown for the current round's tier and returns it.
    pub fn initialize_timer(&mut self) -> Result<u32, QuizError> {
        self.ensure_active()?;
        Ok(self.reset_timer())
    }

    pub fn tick(&mut self) -> Result<Tick, QuizError> {
        self.ensure_active()?;

        self.remaining_seconds -= 1;
        if self.remaining_seconds > 0 {
            return Ok(Tick::Running {
                remaining: self.remaining_seconds,
            });
        }

        self.phase = Phase::GameOver;
        log::debug!("Time elapsed on round {}", self.round);
        Ok(Tick::Expired {
            remaining: self.remaining_seconds,
            correct_answer: self.current_question().correct_answer.clone(),
            money: self.money,
        })
    }

    pub fn use_hint(&mut self, kind: HintKind, rng: &mut QuizRng) -> Result<HintOutcome, QuizError> {
        self.ensure_active()?;

        match kind {
            HintKind::TwoChoices => {
                if self.hints.two_choices {
                    self.remove_wrong_choices(rng);
                }
                self.hints.two_choices = false;
                Ok(HintOutcome::TwoChoices {
                    choices: self.current_question().choices.clone(),
                    hints: self.hints,
                })
            }
            HintKind::Skip => {
                let answer = self.current_question().correct_answer.clone();
                let mut jackpot = false;
                if self.hints.skip {
                    self.hints.skip = false;
                    jackpot = self.complete_round();
                }
                Ok(HintOutcome::Skip {
                    answer,
                    hints: self.hints,
                    money: self.money,
                    jackpot,
                })
            }
            HintKind::Hint => Err(QuizError::InvalidOperation(
                "the 'hint' aid is not available in this game".to_string(),
            )),
        }
    }

    /// Credits the current round and moves on. Returns `true` when that was
    /// the last round.
    fn complete_round(&mut self) -> bool {
        self.money += self.rules.prize_delta(self.round);

        if self.round == self.questions.len() {
            self.phase = Phase::Jackpot;
            log::debug!("Last round completed with ${}", self.money);
            return true;
        }

        self.round += 1;
        self.reset_timer();
        false
    }

    /// Drops random incorrect choices until two are left. The correct answer
    /// is never a candidate for removal.
    fn remove_wrong_choices(&mut self, rng: &mut QuizRng) {
        let question = &mut self.questions[self.round - 1];
        while question.choices.len() > 2 {
            let wrong: Vec<usize> = question
                .choices
                .iter()
                .enumerate()
                .filter(|(_, choice)| **choice != question.correct_answer)
                .map(|(i, _)| i)
                .collect();
            if wrong.is_empty() {
                break;
            }
            let idx = wrong[rng.gen_range_usize(0..wrong.len())];
            question.choices.remove(idx);
        }
    }

    fn reset_timer(&mut self) -> u32 {
        let seconds = self.rules.seconds_for_round(self.round);
        self.remaining_seconds = i64::from(seconds);
        seconds
    }

    fn ensure_active(&self) -> Result<(), QuizError> {
        if self.is_active() {
            return Ok(());
        }
        Err(QuizError::InvalidOperation(format!(
            "the game has ended ({:?})",
            self.phase
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Difficulty;
    use proptest::prelude::*;

    fn questions() -> Vec<Question> {
        (1..=15)
            .map(|round| {
                let difficulty = Difficulty::ALL[(round - 1) / 5];
                Question::new(
                    format!("Question {}", round),
                    difficulty,
                    format!("right {}", round),
                    vec![
                        format!("wrong {}a", round),
                        format!("wrong {}b", round),
                        format!("wrong {}c", round),
                    ],
                )
            })
            .collect()
    }

    fn new_game() -> GameState {
        GameState::new(questions(), Arc::new(GameRules::default())).unwrap()
    }

    fn answer_correctly(game: &mut GameState) -> Verdict {
        let answer = game.current_question().correct_answer.clone();
        game.submit_answer(&answer).unwrap()
    }

    #[test]
    fn fresh_game() {
        let game = new_game();
        assert_eq!(game.round(), 1);
        assert_eq!(game.money(), 0);
        assert_eq!(game.hints(), Hints::default());
        assert_eq!(game.remaining_seconds(), 15);
        assert_eq!(game.phase(), Phase::Active);
        assert_eq!(game.current_question().text, "Question 1");
    }

    #[test]
    fn rejects_wrong_sized_pool() {
        let mut short = questions();
        short.pop();
        let err = GameState::new(short, Arc::new(GameRules::default())).unwrap_err();
        assert!(matches!(err, QuizError::InvalidOperation(_)));
    }

    #[test]
    fn correct_answers_accumulate_the_prize_table() {
        let mut game = new_game();
        let rules = GameRules::default();
        for round in 1..=14 {
            let verdict = answer_correctly(&mut game);
            assert_eq!(verdict, Verdict::Correct { money: rules.prize_for_round(round) });
            assert_eq!(game.money(), rules.prize_for_round(round) - rules.prize_for_round(0));
            assert_eq!(game.round(), round + 1);
        }
    }

    #[test]
    fn last_round_is_the_jackpot() {
        let mut game = new_game();
        for _ in 1..=14 {
            answer_correctly(&mut game);
        }
        let verdict = answer_correctly(&mut game);
        assert_eq!(verdict, Verdict::Jackpot { money: 1_000_000 });
        assert!(verdict.ends_game());
        assert_eq!(game.phase(), Phase::Jackpot);
        assert_eq!(verdict.message(), "Congratulations!\nYou are a millionaire!");
    }

    #[test]
    fn wrong_answer_ends_the_game_with_the_answer() {
        let mut game = new_game();
        answer_correctly(&mut game);
        answer_correctly(&mut game);

        let verdict = game.submit_answer("wrong 3a").unwrap();
        assert_eq!(
            verdict,
            Verdict::Wrong {
                correct_answer: "right 3".to_string(),
                money: 350
            }
        );
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(
            verdict.message(),
            "Wrong!\nThe correct answer is right 3\n\nGame Over :(\nYou won $350"
        );
        // Round and money stay where they were
        assert_eq!(game.round(), 3);
        assert_eq!(game.money(), 350);
    }

    #[test]
    fn ended_game_rejects_everything() {
        let mut game = new_game();
        game.submit_answer("nope").unwrap();
        let mut rng = QuizRng::new(0);

        assert!(matches!(game.submit_answer("right 1"), Err(QuizError::InvalidOperation(_))));
        assert!(game.tick().is_err());
        assert!(game.initialize_timer().is_err());
        assert!(game.use_hint(HintKind::Skip, &mut rng).is_err());
        assert_eq!(game.money(), 0);
    }

    #[test]
    fn timer_tiers_follow_the_round() {
        let mut game = new_game();
        assert_eq!(game.initialize_timer().unwrap(), 15);
        for _ in 1..=5 {
            answer_correctly(&mut game);
        }
        assert_eq!(game.round(), 6);
        assert_eq!(game.remaining_seconds(), 20);
        assert_eq!(game.initialize_timer().unwrap(), 20);
        for _ in 6..=10 {
            answer_correctly(&mut game);
        }
        assert_eq!(game.initialize_timer().unwrap(), 25);
    }

    #[test]
    fn tick_counts_down_then_expires() {
        let mut game = new_game();
        for expected in (1..15).rev() {
            let tick = game.tick().unwrap();
            assert_eq!(tick, Tick::Running { remaining: expected });
            assert!(tick.message().is_none());
        }

        let tick = game.tick().unwrap();
        assert!(tick.is_expired());
        assert_eq!(tick.remaining(), 0);
        assert_eq!(
            tick.message().unwrap(),
            "Time elapsed\nThe correct answer is right 1\n\nGame Over :(\nYou won $0"
        );
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn correct_answer_restarts_the_clock() {
        let mut game = new_game();
        for _ in 0..10 {
            game.tick().unwrap();
        }
        answer_correctly(&mut game);
        assert_eq!(game.remaining_seconds(), 15);
    }

    #[test]
    fn two_choices_keeps_the_correct_answer() {
        let mut game = new_game();
        let mut rng = QuizRng::new(11);

        let outcome = game.use_hint(HintKind::TwoChoices, &mut rng).unwrap();
        match outcome {
            HintOutcome::TwoChoices { choices, hints } => {
                assert_eq!(choices.len(), 2);
                assert!(choices.contains(&"right 1".to_string()));
                assert!(!hints.two_choices);
                assert!(hints.skip);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(game.current_question().choices.len(), 2);
    }

    #[test]
    fn two_choices_only_once_per_game() {
        let mut game = new_game();
        let mut rng = QuizRng::new(12);
        game.use_hint(HintKind::TwoChoices, &mut rng).unwrap();
        answer_correctly(&mut game);

        let outcome = game.use_hint(HintKind::TwoChoices, &mut rng).unwrap();
        assert_eq!(
            outcome,
            HintOutcome::TwoChoices {
                choices: game.current_question().choices.clone(),
                hints: game.hints(),
            }
        );
        assert_eq!(game.current_question().choices.len(), 4);
        assert_eq!(game.round(), 2);
        assert_eq!(game.money(), 100);
    }

    #[test]
    fn skip_credits_and_advances() {
        let mut game = new_game();
        let mut rng = QuizRng::new(13);
        answer_correctly(&mut game);

        let outcome = game.use_hint(HintKind::Skip, &mut rng).unwrap();
        assert_eq!(
            outcome,
            HintOutcome::Skip {
                answer: "right 2".to_string(),
                hints: Hints {
                    two_choices: true,
                    hint: true,
                    skip: false
                },
                money: 350,
                jackpot: false,
            }
        );
        assert!(!outcome.ends_game());
        assert_eq!(game.round(), 3);
        assert_eq!(game.money(), 350);
    }

    #[test]
    fn skip_restarts_the_clock() {
        let mut game = new_game();
        let mut rng = QuizRng::new(17);
        for _ in 0..6 {
            game.tick().unwrap();
        }
        game.use_hint(HintKind::Skip, &mut rng).unwrap();
        assert_eq!(game.round(), 2);
        assert_eq!(game.remaining_seconds(), 15);
    }

    #[test]
    fn skip_into_the_next_tier_uses_its_budget() {
        let mut game = new_game();
        let mut rng = QuizRng::new(18);
        for _ in 1..5 {
            answer_correctly(&mut game);
        }
        assert_eq!(game.round(), 5);
        for _ in 0..9 {
            game.tick().unwrap();
        }
        assert_eq!(game.remaining_seconds(), 6);

        game.use_hint(HintKind::Skip, &mut rng).unwrap();
        assert_eq!(game.round(), 6);
        assert_eq!(game.remaining_seconds(), 20);
        assert_eq!(game.remaining_seconds(), i64::from(game.rules.seconds_for_round(6)));
    }

    #[test]
    fn second_skip_is_a_no_op() {
        let mut game = new_game();
        let mut rng = QuizRng::new(14);
        game.use_hint(HintKind::Skip, &mut rng).unwrap();

        let outcome = game.use_hint(HintKind::Skip, &mut rng).unwrap();
        assert!(matches!(
            outcome,
            HintOutcome::Skip { ref answer, money: 100, jackpot: false, .. } if answer == "right 2"
        ));
        assert_eq!(game.round(), 2);
        assert_eq!(game.money(), 100);
    }

    #[test]
    fn skipping_the_last_round_completes_the_game() {
        let mut game = new_game();
        let mut rng = QuizRng::new(15);
        for _ in 1..=14 {
            answer_correctly(&mut game);
        }
        let outcome = game.use_hint(HintKind::Skip, &mut rng).unwrap();
        assert!(outcome.ends_game());
        assert_eq!(game.money(), 1_000_000);
        assert_eq!(game.phase(), Phase::Jackpot);
    }

    #[test]
    fn reserved_hint_changes_nothing() {
        let mut game = new_game();
        let mut rng = QuizRng::new(16);
        let err = game.use_hint(HintKind::Hint, &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::InvalidOperation(_)));
        assert_eq!(game.hints(), Hints::default());
        assert!(game.is_active());
    }

    #[test]
    fn score_reports_the_round_prize() {
        let mut game = new_game();
        assert_eq!(game.score(), Score { round: 1, money: 0, prize: 100 });
        for _ in 1..=5 {
            answer_correctly(&mut game);
        }
        assert_eq!(game.score(), Score { round: 6, money: 1000, prize: 1000 });
    }

    #[test]
    fn verdict_serializes_with_tag() {
        let json = serde_json::to_value(Verdict::Wrong {
            correct_answer: "Oslo".to_string(),
            money: 600,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "verdict": "wrong", "correctAnswer": "Oslo", "money": 600 })
        );
    }

    proptest! {
        #[test]
        fn two_choices_property(seed in any::<u64>(), round in 1usize..=15) {
            let mut game = new_game();
            for _ in 1..round {
                answer_correctly(&mut game);
            }
            let mut rng = QuizRng::new(seed);
            game.use_hint(HintKind::TwoChoices, &mut rng).unwrap();

            let question = game.current_question();
            prop_assert_eq!(question.choices.len(), 2);
            prop_assert!(question.choices.contains(&question.correct_answer));
        }

        #[test]
        fn money_tracks_the_prize_table(rounds in 1usize..15) {
            let rules = GameRules::default();
            let mut game = new_game();
            for _ in 0..rounds {
                answer_correctly(&mut game);
            }
            prop_assert_eq!(game.money(), rules.prize_for_round(rounds));
            prop_assert_eq!(game.round(), rounds + 1);
        }
    }
}
