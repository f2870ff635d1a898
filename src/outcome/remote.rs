use super::{OutcomeSource, compare_scores};
use crate::Skill;
use crate::error::{Result, SimError};
use byteorder::{BigEndian, ReadBytesExt};
use rand::rngs::StdRng;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Mutex, PoisonError};

/// Blocking client for the score generator. Each query sends the skill as a single
/// byte and receives a two-byte big-endian score; there is no other framing.
#[derive(Debug)]
pub struct ScoreClient<S> {
    stream: S,
}

impl ScoreClient<TcpStream> {
    pub fn connect(address: impl ToSocketAddrs + std::fmt::Debug) -> Result<Self> {
        let stream = TcpStream::connect(&address).map_err(SimError::Connection)?;
        tracing::info!("Connected to score generator at {:?}", address);
        Ok(Self::new(stream))
    }
}

impl<S: Read + Write> ScoreClient<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn query(&mut self, skill: Skill) -> Result<u32> {
        let request = u8::try_from(skill).map_err(|_| SimError::SkillOutOfRange(skill))?;
        self.stream
            .write_all(&[request])
            .and_then(|()| self.stream.flush())
            .map_err(SimError::Connection)?;
        let score = self
            .stream
            .read_u16::<BigEndian>()
            .map_err(|err| match err.kind() {
                ErrorKind::UnexpectedEof => SimError::ShortRead,
                _ => SimError::Connection(err),
            })?;
        Ok(score.into())
    }
}

/// Asks the remote generator for a fresh score per side on every game.
#[derive(Debug)]
pub struct RemoteSample<S = TcpStream> {
    client: Mutex<ScoreClient<S>>,
}

impl RemoteSample {
    pub fn connect(address: impl ToSocketAddrs + std::fmt::Debug) -> Result<Self> {
        ScoreClient::connect(address).map(Self::new)
    }
}

impl<S: Read + Write> RemoteSample<S> {
    pub fn new(client: ScoreClient<S>) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }
}

impl<S: Read + Write + Send + std::fmt::Debug> OutcomeSource for RemoteSample<S> {
    fn decide(&self, skill_a: Skill, skill_b: Skill, _rng: &mut StdRng) -> Result<bool> {
        // Both queries share one lock so the replies can't interleave with another caller's
        let mut client = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        let score_a = client.query(skill_a)?;
        let score_b = client.query(skill_b)?;
        Ok(compare_scores(score_a, score_b))
    }
}
