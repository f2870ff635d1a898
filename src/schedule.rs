//! Round-robin pairings by the circle method: one slot stays fixed while the others
//! rotate past it, so every pair meets exactly once per cycle.

use crate::error::{Result, SimError};

/// One scheduled match. The order of `a` and `b` is the order of emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pairing {
    pub round: usize,
    pub a: usize,
    pub b: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Competitor(usize),
    Bye,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    num_competitors: usize,
    rounds: Vec<Vec<Pairing>>,
}

impl Schedule {
    /// Builds one full cycle for `n` competitors: `n - 1` rounds when `n` is even,
    /// `n` rounds when it's odd, in which case every competitor sits out exactly once.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(SimError::InvalidConfig(
                "cannot schedule a round robin without competitors".into(),
            ));
        }

        let mut slots: Vec<Slot> = (0..n).map(Slot::Competitor).collect();
        if n % 2 == 1 {
            slots.push(Slot::Bye);
        }
        let fixed = slots[0];
        let rotating = &slots[1..];
        let m = rotating.len();

        let rounds = (0..m)
            .map(|round| {
                let mut pairings = Vec::with_capacity(n / 2);
                let mut emit = |x: Slot, y: Slot| {
                    // A match against the bye is no match at all
                    if let (Slot::Competitor(a), Slot::Competitor(b)) = (x, y) {
                        pairings.push(Pairing { round, a, b });
                    }
                };
                emit(fixed, rotating[round % m]);
                for k in 1..(m + 1) / 2 {
                    emit(rotating[(round + k) % m], rotating[(round + m - k) % m]);
                }
                pairings
            })
            .collect();

        Ok(Self {
            num_competitors: n,
            rounds,
        })
    }

    pub fn num_competitors(&self) -> usize {
        self.num_competitors
    }

    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn rounds(&self) -> &[Vec<Pairing>] {
        &self.rounds
    }

    /// All pairings of the cycle, round by round, in the order they must be played.
    pub fn pairings(&self) -> impl Iterator<Item = &Pairing> + '_ {
        self.rounds.iter().flatten()
    }
}
