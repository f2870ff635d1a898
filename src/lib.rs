pub mod data_processing;
pub mod elo;
pub mod error;
pub mod experiment;
pub mod experiment_config;
pub mod numerical;
pub mod outcome;
pub mod schedule;
pub mod tournament;

pub use error::{Result, SimError};

/// A competitor's true strength. Its meaning is up to the outcome source: a logistic
/// quality for `QualityProportional`, a tier index for the sampled sources.
pub type Skill = i32;
