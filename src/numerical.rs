use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Rating difference at which the stronger side is ten times as likely to win.
pub const ELO_SCALE: f64 = 400.;

/// Probability that a player rated `rating` beats one rated `foe` under the logistic Elo model.
pub fn logistic_win_probability(rating: f64, foe: f64) -> f64 {
    (1. + 10f64.powf((foe - rating) / ELO_SCALE)).recip()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TailStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Mean and population standard deviation of a non-empty window.
pub fn tail_stats(window: &[f64]) -> TailStats {
    assert!(!window.is_empty(), "statistics of an empty window");
    TailStats {
        mean: window.iter().mean(),
        std_dev: window.iter().population_std_dev(),
    }
}
