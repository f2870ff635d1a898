use crate::Skill;
use crate::data_processing::{write_mean_tsv, write_slice_to_file, write_variance_tsv};
use crate::error::{Result, SimError};
use crate::numerical::{TailStats, tail_stats};
use crate::outcome::OutcomeSource;
use crate::tournament::Tournament;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::path::{Path, PathBuf};

/// Where every rating starts at the beginning of an iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialRating {
    #[default]
    AverageSkill,
    Fixed(f64),
}

impl InitialRating {
    pub fn value(&self, skills: &[Skill]) -> f64 {
        match *self {
            Self::AverageSkill => skills.iter().map(|&skill| skill as f64).mean(),
            Self::Fixed(rating) => rating,
        }
    }
}

/// Empirically chosen rounds after which each competitor's rating is treated as settled.
/// Everything before the offset is discarded as transient when measuring spread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettleOffsets {
    /// The same offset for every competitor at every K-factor.
    Uniform(usize),
    /// Per-competitor offsets for K-factor buckets; the first bucket whose
    /// `max_k_factor` is at least the experiment's K-factor applies.
    ByKFactor(Vec<SettleBucket>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettleBucket {
    pub max_k_factor: f64,
    pub offsets: Vec<usize>,
}

impl SettleOffsets {
    pub fn uniform(offset: usize) -> Self {
        Self::Uniform(offset)
    }

    /// The offset of every competitor, checked against the experiment's length.
    pub fn resolve(
        &self,
        k_factor: f64,
        num_competitors: usize,
        num_rounds: usize,
    ) -> Result<Vec<usize>> {
        let offsets = match self {
            Self::Uniform(offset) => vec![*offset; num_competitors],
            Self::ByKFactor(buckets) => buckets
                .iter()
                .find(|bucket| k_factor <= bucket.max_k_factor)
                .ok_or(SimError::NoSettleBucket(k_factor))?
                .offsets
                .clone(),
        };
        if offsets.len() != num_competitors {
            return Err(SimError::OffsetTableMismatch {
                expected: num_competitors,
                found: offsets.len(),
            });
        }
        if let Some((competitor, &offset)) = offsets
            .iter()
            .enumerate()
            .find(|&(_, &offset)| offset >= num_rounds)
        {
            return Err(SimError::EmptyTailWindow {
                competitor,
                offset,
                num_rounds,
            });
        }
        Ok(offsets)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExperimentMode {
    Mean,
    Variance { settle_offsets: SettleOffsets },
}

/// Per-round rating totals across iterations.
#[derive(Clone, Debug)]
pub struct RatingSeries {
    // sums[round][competitor]
    sums: Vec<Vec<f64>>,
    num_iterations: usize,
}

impl RatingSeries {
    pub fn new(num_rounds: usize, num_competitors: usize) -> Self {
        Self {
            sums: vec![vec![0.; num_competitors]; num_rounds],
            num_iterations: 0,
        }
    }

    pub fn accumulate(&mut self, round: usize, ratings: &[f64]) {
        for (sum, rating) in self.sums[round].iter_mut().zip(ratings) {
            *sum += rating;
        }
    }

    pub fn finish_iteration(&mut self) {
        self.num_iterations += 1;
    }

    pub fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    /// averages[round][competitor]: each sum divided by the number of finished iterations.
    pub fn averages(&self) -> Vec<Vec<f64>> {
        assert!(self.num_iterations > 0, "no iteration has finished");
        let count = self.num_iterations as f64;
        self.sums
            .iter()
            .map(|round| round.iter().map(|sum| sum / count).collect())
            .collect()
    }
}

#[derive(Debug)]
pub struct MeanResults {
    pub averages: Vec<Vec<f64>>,
    pub skills: Vec<Skill>,
    pub secs_elapsed: f64,
}

impl MeanResults {
    pub fn final_ratings(&self) -> &[f64] {
        self.averages.last().map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CompetitorSpread {
    pub competitor: usize,
    pub skill: Skill,
    pub settle_offset: usize,
    pub mean_rating: f64,
    pub std_dev_of_means: f64,
    pub mean_std_dev: f64,
}

#[derive(Debug)]
pub struct VarianceResults {
    // repetitions[repetition][competitor]
    pub repetitions: Vec<Vec<TailStats>>,
    pub offsets: Vec<usize>,
    pub skills: Vec<Skill>,
    pub secs_elapsed: f64,
}

impl VarianceResults {
    fn column(&self, competitor: usize) -> impl Iterator<Item = TailStats> + '_ {
        self.repetitions.iter().map(move |tails| tails[competitor])
    }

    /// Across repetitions: the mean and spread of each competitor's settled rating,
    /// and its average within-repetition standard deviation.
    pub fn summary(&self) -> Vec<CompetitorSpread> {
        (0..self.skills.len())
            .map(|competitor| CompetitorSpread {
                competitor,
                skill: self.skills[competitor],
                settle_offset: self.offsets[competitor],
                mean_rating: self.column(competitor).map(|tail| tail.mean).mean(),
                std_dev_of_means: self
                    .column(competitor)
                    .map(|tail| tail.mean)
                    .population_std_dev(),
                mean_std_dev: self.column(competitor).map(|tail| tail.std_dev).mean(),
            })
            .collect()
    }
}

#[derive(Debug)]
pub enum ExperimentResults {
    Mean(MeanResults),
    Variance(VarianceResults),
}

impl ExperimentResults {
    pub fn secs_elapsed(&self) -> f64 {
        match self {
            Self::Mean(results) => results.secs_elapsed,
            Self::Variance(results) => results.secs_elapsed,
        }
    }

    /// Writes the tab-separated series to `path`. Variance results also get a
    /// per-competitor summary at `summary_path`, as JSON or CSV by its extension,
    /// or alongside the series at `<stem>.summary.csv` when none is given.
    pub fn save(&self, path: impl AsRef<Path>, summary_path: Option<&Path>) -> Result<()> {
        let path = path.as_ref();
        match self {
            Self::Mean(results) => write_mean_tsv(path, &results.averages, &results.skills),
            Self::Variance(results) => {
                write_variance_tsv(path, &results.repetitions)?;
                let summary_path = summary_path
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| path.with_extension("summary.csv"));
                write_slice_to_file(&results.summary(), summary_path)
            }
        }
    }
}

#[derive(Debug)]
pub struct Experiment {
    pub num_iterations: usize,
    pub num_rounds: usize,
    pub tournament: Tournament,
    pub initial_rating: InitialRating,
    pub source: Box<dyn OutcomeSource>,
    pub mode: ExperimentMode,
    pub seed: u64,
    pub output: Option<PathBuf>,
    pub summary_output: Option<PathBuf>,
}

impl Experiment {
    pub fn k_factor(&self) -> f64 {
        self.tournament.elo().k_factor
    }

    /// Plays `num_iterations` independent runs of `num_rounds` cycles each, starting
    /// every run from the initial rating, and totals the ratings after every cycle.
    pub fn simulate_series(&self, num_iterations: usize, rng: &mut StdRng) -> Result<RatingSeries> {
        let num_competitors = self.tournament.num_competitors();
        let baseline = self.initial_rating.value(self.tournament.skills());
        let mut series = RatingSeries::new(self.num_rounds, num_competitors);
        for iteration in 0..num_iterations {
            let mut ratings = vec![baseline; num_competitors];
            for round in 0..self.num_rounds {
                self.tournament
                    .run_round_robin(&mut ratings, &*self.source, rng)?;
                series.accumulate(round, &ratings);
            }
            series.finish_iteration();
            tracing::debug!("Finished iteration {} with ratings {:?}", iteration, ratings);
        }
        Ok(series)
    }

    pub fn eval_mean(&self) -> Result<MeanResults> {
        let now = std::time::Instant::now();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let series = self.simulate_series(self.num_iterations, &mut rng)?;
        Ok(MeanResults {
            averages: series.averages(),
            skills: self.tournament.skills().to_vec(),
            secs_elapsed: now.elapsed().as_secs_f64(),
        })
    }

    /// Repeats a single-iteration run `num_iterations` times, each on its own
    /// random stream, and measures each competitor's rating after it settles.
    pub fn eval_variance(&self) -> Result<VarianceResults> {
        let ExperimentMode::Variance { settle_offsets } = &self.mode else {
            return Err(SimError::InvalidConfig(
                "variance evaluation needs settle offsets from a variance mode".into(),
            ));
        };
        let num_competitors = self.tournament.num_competitors();
        let offsets = settle_offsets.resolve(self.k_factor(), num_competitors, self.num_rounds)?;

        let now = std::time::Instant::now();
        let repetitions = (0..self.num_iterations)
            .into_par_iter()
            .map(|repetition| -> Result<Vec<TailStats>> {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(repetition as u64));
                let averages = self.simulate_series(1, &mut rng)?.averages();
                let tails = offsets
                    .iter()
                    .enumerate()
                    .map(|(competitor, &offset)| {
                        let window: Vec<f64> =
                            averages[offset..].iter().map(|round| round[competitor]).collect();
                        tail_stats(&window)
                    })
                    .collect();
                tracing::debug!("Finished repetition {}", repetition);
                Ok(tails)
            })
            .collect::<Result<Vec<Vec<TailStats>>>>()?;

        Ok(VarianceResults {
            repetitions,
            offsets,
            skills: self.tournament.skills().to_vec(),
            secs_elapsed: now.elapsed().as_secs_f64(),
        })
    }

    pub fn eval(&self) -> Result<ExperimentResults> {
        tracing::info!(
            "Running {:?} experiment: {} competitors, {} iterations, {} rounds, K={}, {:?}, seed {}",
            self.mode,
            self.tournament.num_competitors(),
            self.num_iterations,
            self.num_rounds,
            self.k_factor(),
            self.source,
            self.seed,
        );
        let results = match self.mode {
            ExperimentMode::Mean => ExperimentResults::Mean(self.eval_mean()?),
            ExperimentMode::Variance { .. } => ExperimentResults::Variance(self.eval_variance()?),
        };
        tracing::info!("Finished in {} seconds.", results.secs_elapsed());

        if let Some(path) = &self.output {
            results.save(path, self.summary_output.as_deref())?;
        }
        Ok(results)
    }
}
