use crate::Skill;
use crate::error::{Result, SimError};
use itertools::Itertools;
use std::path::{Path, PathBuf};

/// Location of the recorded scores for one skill tier inside a sample directory.
pub fn sample_file_path(sample_dir: impl AsRef<Path>, skill: Skill) -> PathBuf {
    sample_dir.as_ref().join(format!("{}.txt", skill))
}

/// Reads a sample file: one decimal score per line. Blank lines are skipped.
pub fn read_sample_file(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SimError::MissingSampleFile {
        path: path.to_path_buf(),
        source,
    })?;

    let scores = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.trim().parse().map_err(|_| SimError::MalformedSample {
                path: path.to_path_buf(),
                line: index + 1,
                content: line.to_string(),
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    if scores.is_empty() {
        return Err(SimError::EmptySamplePool(path.to_path_buf()));
    }
    Ok(scores)
}

pub fn write_sample_file(path: impl AsRef<Path>, scores: &[u32]) -> Result<()> {
    let path = path.as_ref();
    let mut text = scores.iter().join("\n");
    text.push('\n');
    std::fs::write(path, text).map_err(|err| SimError::Output {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    tracing::info!("Wrote {} samples to {:?}", scores.len(), path);
    Ok(())
}
