use elo_convergence::experiment::{Experiment, ExperimentResults};
use itertools::Itertools;

/// Runs every experiment described by the config files given on the command line
fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        tracing::error!("Usage: {} <list of config files>", args[0]);
        std::process::exit(2);
    }

    // Any failure aborts the whole batch; there's nothing to recover mid-experiment
    for filename in &args[1..] {
        let results = Experiment::from_file(filename).and_then(|ex| ex.eval());
        match results {
            Ok(ExperimentResults::Mean(results)) => tracing::info!(
                "{}: final averaged ratings {}",
                filename,
                results.final_ratings().iter().map(|r| format!("{:.1}", r)).join(", ")
            ),
            Ok(ExperimentResults::Variance(results)) => {
                for spread in results.summary() {
                    tracing::info!(
                        "{}: competitor {} (skill {}) settles at {:.1} +- {:.2}",
                        filename,
                        spread.competitor,
                        spread.skill,
                        spread.mean_rating,
                        spread.mean_std_dev
                    );
                }
            }
            Err(err) => {
                tracing::error!("{}: {}", filename, err);
                std::process::exit(1);
            }
        }
    }
}
