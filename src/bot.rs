//! Decision heuristics for the example player bot.
//!
//! A round requires three answers, except the round where both players'
//! earlier answers are already in: then the server expects the accumulated
//! six. The category only matters when completing the opponent's open round,
//! where it must match the opponent's last choice.

use rand::Rng;
use rand_distr::{Distribution, Normal, NormalError};

use crate::model::Game;

/// Number of answers per round in the regular case.
const ROUND_ANSWERS: usize = 3;

/// Total answers in a finished game (6 rounds x 3 questions).
const GAME_ANSWERS: usize = 18;

/// How many new answers the next upload must contain.
#[must_use]
pub fn required_answer_count(game: &Game) -> usize {
    if game.opponent_answers.is_empty() || game.opponent_answers.len() == GAME_ANSWERS {
        ROUND_ANSWERS
    } else {
        ROUND_ANSWERS * 2
    }
}

/// Which category id to send with the next upload.
///
/// When the opponent opened the round, their category choice is binding;
/// otherwise any category works and `0` is sent.
#[must_use]
pub fn category_choice(game: &Game, required_answers: usize) -> i64 {
    if required_answers == ROUND_ANSWERS && !game.opponent_answers.is_empty() {
        game.category_choices.last().copied().unwrap_or(0)
    } else {
        0
    }
}

/// True when `name` is on the do-not-play list.
#[must_use]
pub fn is_no_play_name(name: &str, no_play_names: &[String]) -> bool {
    no_play_names.iter().any(|other| other == name)
}

/// Draws answer indices from a half-normal distribution.
///
/// Index 0 is the correct answer, 1 to 3 are the wrong ones, so a small
/// standard deviation answers mostly correctly and a large one plays badly.
/// Samples beyond index 3 are clamped rather than rejected.
#[derive(Debug, Clone, Copy)]
pub struct AnswerSampler {
    normal: Normal<f64>,
}

impl AnswerSampler {
    /// Creates a sampler with the given standard deviation.
    ///
    /// # Errors
    ///
    /// Returns [`NormalError`] when `std_dev` is negative or not finite.
    pub fn new(std_dev: f64) -> Result<Self, NormalError> {
        // Normal::new accepts a negative std-dev, so range-check here.
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(NormalError::BadVariance);
        }
        Ok(Self {
            normal: Normal::new(0.0, std_dev)?,
        })
    }

    /// Draws one answer index in `0..=3`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sample(&self, rng: &mut impl Rng) -> i64 {
        let raw = self.normal.sample(rng).abs() as i64;
        raw.min(3)
    }

    /// Draws `count` answer indices.
    pub fn sample_round(&self, rng: &mut impl Rng, count: usize) -> Vec<i64> {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}
