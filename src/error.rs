use crate::Skill;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SimError>;

/// Everything that can abort a simulation run. None of these are retried.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("the skill list is empty")]
    EmptySkills,
    #[error(
        "competitor {competitor} settles at round {offset}, leaving no tail window in {num_rounds} rounds"
    )]
    EmptyTailWindow {
        competitor: usize,
        offset: usize,
        num_rounds: usize,
    },
    #[error("settle offset table has {found} entries but there are {expected} competitors")]
    OffsetTableMismatch { expected: usize, found: usize },
    #[error("no settle offset bucket covers K-factor {0}")]
    NoSettleBucket(f64),

    #[error("sample file {path:?} could not be read")]
    MissingSampleFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sample file {path:?} line {line} is not a score: {content:?}")]
    MalformedSample {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("sample file {0:?} contains no scores")]
    EmptySamplePool(PathBuf),
    #[error("connection to the score generator failed")]
    Connection(#[source] std::io::Error),
    #[error("the score generator closed the connection mid-reply")]
    ShortRead,
    #[error("skill {0} does not fit in the one-byte request")]
    SkillOutOfRange(Skill),

    #[error("failed to load config {path:?}: {message}")]
    ConfigFile { path: PathBuf, message: String },
    #[error("failed to write {path:?}: {message}")]
    Output { path: PathBuf, message: String },
}
