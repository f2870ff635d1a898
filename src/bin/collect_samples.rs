use elo_convergence::data_processing::{sample_file_path, write_sample_file};
use elo_convergence::outcome::ScoreClient;
use elo_convergence::{Result, SimError, Skill};

fn collect(address: &str, sample_dir: &str, num_samples: usize, skills: &[Skill]) -> Result<()> {
    let mut client = ScoreClient::connect(address)?;
    std::fs::create_dir_all(sample_dir).map_err(|err| SimError::Output {
        path: sample_dir.into(),
        message: err.to_string(),
    })?;
    for &skill in skills {
        let scores = (0..num_samples)
            .map(|_| client.query(skill))
            .collect::<Result<Vec<u32>>>()?;
        write_sample_file(sample_file_path(sample_dir, skill), &scores)?;
    }
    Ok(())
}

/// Records scores from a live generator into one sample file per skill tier
fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let num_samples = args.get(3).and_then(|s| s.parse::<usize>().ok());
    let skills: Option<Vec<Skill>> = args.iter().skip(4).map(|s| s.parse().ok()).collect();
    let (Some(num_samples), Some(skills)) = (num_samples, skills.filter(|s| !s.is_empty())) else {
        tracing::error!(
            "Usage: {} address sample_dir num_samples skill [skill ...]",
            args[0]
        );
        std::process::exit(2);
    };

    if let Err(err) = collect(&args[1], &args[2], num_samples, &skills) {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}
