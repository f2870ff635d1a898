use crate::Skill;
use crate::elo::Elo;
use crate::error::{Result, SimError};
use crate::experiment::{Experiment, ExperimentMode, InitialRating};
use crate::outcome::{
    CachedSample, OutcomeSource, QualityProportional, RemoteSample, SamplePoolCache,
};
use crate::tournament::Tournament;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which source decides the winner of each game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeConfig {
    QualityProportional,
    CachedSample { sample_dir: PathBuf },
    RemoteSample { address: String },
}

impl OutcomeConfig {
    pub fn build(&self) -> Result<Box<dyn OutcomeSource>> {
        let source: Box<dyn OutcomeSource> = match self {
            Self::QualityProportional => Box::new(QualityProportional),
            Self::CachedSample { sample_dir } => {
                Box::new(CachedSample::new(SamplePoolCache::new(sample_dir)))
            }
            Self::RemoteSample { address } => Box::new(RemoteSample::connect(address.as_str())?),
        };
        Ok(source)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub num_iterations: usize,
    pub num_rounds: usize,
    pub k_factor: f64,
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub initial_rating: InitialRating,
    pub outcome: OutcomeConfig,
    pub mode: ExperimentMode,
    pub seed: Option<u64>,
    /// Results are written here when present, and only logged otherwise.
    pub output: Option<PathBuf>,
    /// Where a variance run's per-competitor summary goes, as `.json` or `.csv`.
    /// Defaults to `<output stem>.summary.csv`.
    pub summary_output: Option<PathBuf>,
}

impl ExperimentConfig {
    pub fn from_file(source: impl AsRef<Path>) -> Result<Self> {
        let path = source.as_ref();
        let config_error = |message: String| SimError::ConfigFile {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|err| config_error(err.to_string()))?;
        json5::from_str(&text).map_err(|err| config_error(err.to_string()))
    }

    /// Rejects settings under which an experiment is meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.skills.is_empty() {
            return Err(SimError::EmptySkills);
        }
        if self.skills.len() < 2 {
            return Err(SimError::InvalidConfig(
                "a round robin needs at least two competitors".into(),
            ));
        }
        if self.num_iterations == 0 || self.num_rounds == 0 {
            return Err(SimError::InvalidConfig(format!(
                "need at least one iteration and one round, got {} and {}",
                self.num_iterations, self.num_rounds
            )));
        }
        if !self.k_factor.is_finite() || self.k_factor < 0. {
            return Err(SimError::InvalidConfig(format!(
                "K-factor must be finite and non-negative, got {}",
                self.k_factor
            )));
        }
        if let InitialRating::Fixed(rating) = self.initial_rating {
            if !rating.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "initial rating must be finite, got {}",
                    rating
                )));
            }
        }
        if let ExperimentMode::Variance { settle_offsets } = &self.mode {
            settle_offsets.resolve(self.k_factor, self.skills.len(), self.num_rounds)?;
        }
        if let Some(path) = &self.summary_output {
            let extension = path.extension().and_then(|s| s.to_str());
            if !matches!(extension, Some("json" | "csv")) {
                return Err(SimError::InvalidConfig(format!(
                    "summary output {:?} must end in .json or .csv",
                    path
                )));
            }
        }
        Ok(())
    }
}

impl Experiment {
    pub fn from_config(config: ExperimentConfig) -> Result<Self> {
        tracing::info!("Loading experiment:\n{:?}", config);
        config.validate()?;
        let tournament = Tournament::new(config.skills, Elo::new(config.k_factor))?;
        let source = config.outcome.build()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());

        Ok(Self {
            num_iterations: config.num_iterations,
            num_rounds: config.num_rounds,
            tournament,
            initial_rating: config.initial_rating,
            source,
            mode: config.mode,
            seed,
            output: config.output,
            summary_output: config.summary_output,
        })
    }

    pub fn from_file(source: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(ExperimentConfig::from_file(source)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::experiment::SettleOffsets;
    use claims::{assert_matches, assert_ok};

    fn config() -> ExperimentConfig {
        ExperimentConfig {
            num_iterations: 1,
            num_rounds: 3,
            k_factor: 14.,
            skills: vec![10, 20, 30, 40],
            initial_rating: InitialRating::AverageSkill,
            outcome: OutcomeConfig::QualityProportional,
            mode: ExperimentMode::Mean,
            seed: Some(5),
            output: None,
            summary_output: None,
        }
    }

    #[test]
    fn test_parse_json5() {
        let text = r#"{
            // variance run over a cached pool
            num_iterations: 10,
            num_rounds: 400,
            k_factor: 14,
            skills: [1, 2, 3],
            initial_rating: { fixed: 1500 },
            outcome: { type: "cached_sample", sample_dir: "samples" },
            mode: {
                type: "variance",
                settle_offsets: [
                    { max_k_factor: 10, offsets: [300, 300, 250] },
                    { max_k_factor: 20, offsets: [150, 120, 100] },
                ],
            },
        }"#;
        let config: ExperimentConfig = json5::from_str(text).unwrap();
        assert_eq!(config.k_factor, 14.);
        assert_eq!(config.initial_rating, InitialRating::Fixed(1500.));
        assert_eq!(
            config.outcome,
            OutcomeConfig::CachedSample {
                sample_dir: "samples".into()
            }
        );
        assert!(matches!(
            &config.mode,
            ExperimentMode::Variance {
                settle_offsets: SettleOffsets::ByKFactor(buckets)
            } if buckets.len() == 2
        ));
        assert_eq!(config.seed, None);
        assert_eq!(config.output, None);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_parse_minimal() {
        let text = r#"{
            num_iterations: 2, num_rounds: 5, k_factor: 32.5, skills: [1500, 1600],
            outcome: { type: "quality_proportional" }, mode: { type: "mean" },
            seed: 99, output: "out/mean.tsv",
        }"#;
        let config: ExperimentConfig = json5::from_str(text).unwrap();
        assert_eq!(config.initial_rating, InitialRating::AverageSkill);
        assert_eq!(config.mode, ExperimentMode::Mean);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.output, Some(PathBuf::from("out/mean.tsv")));
        assert_eq!(config.summary_output, None);
    }

    #[test]
    fn test_summary_output_extension() {
        let config = ExperimentConfig {
            summary_output: Some("out/summary.json".into()),
            ..config()
        };
        assert_ok!(config.validate());
        let config = ExperimentConfig {
            summary_output: Some("out/summary.txt".into()),
            ..config
        };
        assert_matches!(config.validate(), Err(SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_skills() {
        let config = ExperimentConfig {
            skills: vec![],
            ..config()
        };
        assert_matches!(config.validate(), Err(SimError::EmptySkills));
    }

    #[test]
    fn test_lone_competitor() {
        let config = ExperimentConfig {
            skills: vec![7],
            ..config()
        };
        assert_matches!(config.validate(), Err(SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_k_factor() {
        let config = ExperimentConfig {
            k_factor: f64::NAN,
            ..config()
        };
        assert_matches!(config.validate(), Err(SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_rounds() {
        let config = ExperimentConfig {
            num_rounds: 0,
            ..config()
        };
        assert_matches!(config.validate(), Err(SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_tail_window_checked_up_front() {
        let config = ExperimentConfig {
            mode: ExperimentMode::Variance {
                settle_offsets: SettleOffsets::uniform(3),
            },
            ..config()
        };
        assert_matches!(
            Experiment::from_config(config),
            Err(SimError::EmptyTailWindow { .. })
        );
    }

    #[test]
    fn test_build_from_config() {
        let experiment = Experiment::from_config(config()).unwrap();
        assert_eq!(experiment.seed, 5);
        assert_eq!(experiment.k_factor(), 14.);
        assert_eq!(experiment.tournament.num_competitors(), 4);
    }

    #[test]
    fn test_missing_config_file() {
        assert_matches!(
            ExperimentConfig::from_file("no/such/config.json5"),
            Err(SimError::ConfigFile { .. })
        );
    }
}
