use crate::quiz::rng::QuizRng;
use crate::quiz::source::RawQuestion;
use crate::quiz::{Difficulty, Question, QuizError};

/// Turns a raw batch into the ordered question sequence of one game:
/// `per_difficulty` easy questions, then medium, then hard.
#[derive(Debug, Clone, Copy)]
pub struct PoolBuilder {
    per_difficulty: usize,
}

impl PoolBuilder {
    pub fn new(per_difficulty: usize) -> Self {
        Self { per_difficulty }
    }

    pub fn build(
        &self,
        mut batch: Vec<RawQuestion>,
        rng: &mut QuizRng,
    ) -> Result<Vec<Question>, QuizError> {
        // Shuffle the whole batch first so every bucket gets a random subset
        rng.shuffle(&mut batch);

        let mut buckets: [Vec<Question>; 3] = Default::default();
        for item in batch {
            let Some(difficulty) = Difficulty::from_tag(&item.difficulty) else {
                log::warn!(
                    "Skipping question with unknown difficulty '{}'",
                    item.difficulty
                );
                continue;
            };

            let mut question = Question::new(
                decode(&item.question),
                difficulty,
                decode(&item.correct_answer),
                item.incorrect_answers.iter().map(|a| decode(a)).collect(),
            );
            // We shuffle the choices so the correct one isn't always the last one
            rng.shuffle(&mut question.choices);

            buckets[bucket_index(difficulty)].push(question);
        }

        for difficulty in Difficulty::ALL {
            let found = buckets[bucket_index(difficulty)].len();
            if found < self.per_difficulty {
                return Err(QuizError::InsufficientQuestions {
                    difficulty,
                    found,
                    needed: self.per_difficulty,
                });
            }
        }

        let sequence: Vec<Question> = buckets
            .into_iter()
            .flat_map(|bucket| bucket.into_iter().take(self.per_difficulty))
            .collect();
        log::debug!("Built a pool of {} questions", sequence.len());

        Ok(sequence)
    }
}

fn bucket_index(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

/// The trivia service sends HTML entities (`&quot;`, `&ouml;`, `&#039;`...).
fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
