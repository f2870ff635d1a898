use crate::Skill;
use crate::elo::Elo;
use crate::error::Result;
use crate::outcome::OutcomeSource;
use crate::schedule::Schedule;
use rand::rngs::StdRng;

/// A fixed field of competitors playing repeated round-robin cycles.
/// The schedule depends only on the field size, so it's built once and replayed.
#[derive(Clone, Debug)]
pub struct Tournament {
    schedule: Schedule,
    skills: Vec<Skill>,
    elo: Elo,
}

impl Tournament {
    pub fn new(skills: Vec<Skill>, elo: Elo) -> Result<Self> {
        let schedule = Schedule::new(skills.len())?;
        Ok(Self {
            schedule,
            skills,
            elo,
        })
    }

    pub fn num_competitors(&self) -> usize {
        self.skills.len()
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn elo(&self) -> &Elo {
        &self.elo
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Plays one full cycle, updating `ratings` after every game in schedule order.
    /// Returns the number of games played.
    pub fn run_round_robin(
        &self,
        ratings: &mut [f64],
        source: &dyn OutcomeSource,
        rng: &mut StdRng,
    ) -> Result<usize> {
        assert_eq!(ratings.len(), self.skills.len());
        let mut games = 0;
        for pairing in self.schedule.pairings() {
            let (a, b) = (pairing.a, pairing.b);
            let a_wins = source.decide(self.skills[a], self.skills[b], rng)?;
            (ratings[a], ratings[b]) = self.elo.update(ratings[a], ratings[b], a_wins);
            games += 1;
        }
        Ok(games)
    }
}
