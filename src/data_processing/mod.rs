mod samples;

pub use samples::{read_sample_file, sample_file_path, write_sample_file};

use crate::Skill;
use crate::error::{Result, SimError};
use crate::numerical::TailStats;
use itertools::Itertools;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;

fn output_error(path: &Path, err: impl std::fmt::Display) -> SimError {
    SimError::Output {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|err| output_error(path, err))?;
    }
    Ok(())
}

fn write_with(path: &Path, body: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> Result<()> {
    create_parent_dir(path)?;
    let file = std::fs::File::create(path).map_err(|err| output_error(path, err))?;
    let mut writer = BufWriter::new(file);
    body(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(|err| output_error(path, err))?;
    tracing::info!("Successfully wrote to {:?}", path);
    Ok(())
}

/// One row per round: the round index, then every competitor's averaged rating.
/// A blank line and the competitors' skills follow, for reference.
pub fn format_mean_tsv(
    out: &mut dyn Write,
    averages: &[Vec<f64>],
    skills: &[Skill],
) -> std::io::Result<()> {
    for (round, ratings) in averages.iter().enumerate() {
        writeln!(out, "{}\t{}", round, ratings.iter().join("\t"))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", skills.iter().join("\t"))
}

/// One row per repetition: the repetition index, then every competitor's standard deviation.
pub fn format_variance_tsv(out: &mut dyn Write, repetitions: &[Vec<TailStats>]) -> std::io::Result<()> {
    for (index, stats) in repetitions.iter().enumerate() {
        let std_devs = stats.iter().map(|tail| tail.std_dev).join("\t");
        writeln!(out, "{}\t{}", index, std_devs)?;
    }
    Ok(())
}

pub fn write_mean_tsv(path: impl AsRef<Path>, averages: &[Vec<f64>], skills: &[Skill]) -> Result<()> {
    write_with(path.as_ref(), |out| format_mean_tsv(out, averages, skills))
}

pub fn write_variance_tsv(path: impl AsRef<Path>, repetitions: &[Vec<TailStats>]) -> Result<()> {
    write_with(path.as_ref(), |out| format_variance_tsv(out, repetitions))
}

fn write_to_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|err| output_error(path, err))?;
    std::fs::write(path, json).map_err(|err| output_error(path, err))
}

fn write_to_csv<T: Serialize>(values: &[T], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|err| output_error(path, err))?;
    for value in values {
        writer.serialize(value).map_err(|err| output_error(path, err))?;
    }
    writer.flush().map_err(|err| output_error(path, err))
}

/// Serializes records to JSON or CSV, depending on the filename extension.
pub fn write_slice_to_file<T: Serialize>(values: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|s| s.to_str());
    if !matches!(extension, Some("json" | "csv")) {
        return Err(output_error(path, "invalid or missing filename extension"));
    }
    create_parent_dir(path)?;
    match extension {
        Some("json") => write_to_json(values, path)?,
        _ => write_to_csv(values, path)?,
    }
    tracing::info!("Successfully wrote to {:?}", path);
    Ok(())
}
