//! Sources that decide the winner of a single game between two skill levels.

mod remote;
mod sample_pool;

pub use remote::{RemoteSample, ScoreClient};
pub use sample_pool::{CachedSample, SamplePoolCache};

use crate::Skill;
use crate::error::Result;
use crate::numerical::logistic_win_probability;
use rand::Rng;
use rand::rngs::StdRng;

pub trait OutcomeSource: std::fmt::Debug + Send + Sync {
    /// Plays one game and returns whether the side with `skill_a` wins it.
    fn decide(&self, skill_a: Skill, skill_b: Skill, rng: &mut StdRng) -> Result<bool>;
}

/// Treats skill as a true Elo rating and samples the logistic win probability.
#[derive(Clone, Copy, Debug, Default)]
pub struct QualityProportional;

impl OutcomeSource for QualityProportional {
    fn decide(&self, skill_a: Skill, skill_b: Skill, rng: &mut StdRng) -> Result<bool> {
        let probability = logistic_win_probability(skill_a as f64, skill_b as f64);
        Ok(rng.random::<f64>() < probability)
    }
}

/// The higher score wins. Draws don't exist: equal scores count as a loss for `a`.
fn compare_scores(score_a: u32, score_b: u32) -> bool {
    score_a > score_b
}
