//! Elo system details: https://en.wikipedia.org/wiki/Elo_rating_system

use crate::numerical::logistic_win_probability;
use serde::{Deserialize, Serialize};

/// Ratings of both players after a single decisive game between them.
pub fn elo_update(rating_a: f64, rating_b: f64, a_wins: bool, k_factor: f64) -> (f64, f64) {
    assert!(
        rating_a.is_finite() && rating_b.is_finite(),
        "non-finite rating entered an Elo update: {} vs {}",
        rating_a,
        rating_b
    );
    // Both expectations are computed directly rather than as 1 - expected_a
    let expected_a = logistic_win_probability(rating_a, rating_b);
    let expected_b = logistic_win_probability(rating_b, rating_a);
    let (score_a, score_b) = if a_wins { (1., 0.) } else { (0., 1.) };
    (
        rating_a + k_factor * (score_a - expected_a),
        rating_b + k_factor * (score_b - expected_b),
    )
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Elo {
    pub k_factor: f64,
}

impl Elo {
    pub fn new(k_factor: f64) -> Self {
        Self { k_factor }
    }

    pub fn update(&self, rating_a: f64, rating_b: f64, a_wins: bool) -> (f64, f64) {
        elo_update(rating_a, rating_b, a_wins, self.k_factor)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;

    const EPS: f64 = 1e-9;

    // Keeps generated ratings in a range where the expected score is never saturated
    fn rating(raw: i16) -> f64 {
        1500. + (raw % 1000) as f64
    }

    #[test]
    fn test_even_game() {
        let (a, b) = elo_update(1500., 1500., true, 32.);
        assert!((a - 1516.).abs() < EPS);
        assert!((b - 1484.).abs() < EPS);
    }

    #[test]
    fn test_upset_moves_more_than_expected_win() {
        let elo = Elo::new(14.);
        let (underdog, _) = elo.update(1400., 1600., true);
        let (favourite, _) = elo.update(1600., 1400., true);
        assert!(underdog - 1400. > favourite - 1600.);
    }

    #[test]
    fn test_zero_k_factor_freezes_ratings() {
        assert_eq!(elo_update(1234., 1789., false, 0.), (1234., 1789.));
    }

    #[test]
    #[should_panic]
    fn test_non_finite_rating_is_fatal() {
        elo_update(f64::NAN, 1500., true, 14.);
    }

    #[quickcheck]
    fn updates_are_zero_sum(ra: i16, rb: i16, a_wins: bool) -> bool {
        let (ra, rb) = (rating(ra), rating(rb));
        let (new_a, new_b) = elo_update(ra, rb, a_wins, 14.);
        ((new_a - ra) + (new_b - rb)).abs() < EPS
    }

    #[quickcheck]
    fn updates_are_symmetric(ra: i16, rb: i16, a_wins: bool) -> bool {
        let (ra, rb) = (rating(ra), rating(rb));
        let (new_a, new_b) = elo_update(ra, rb, a_wins, 14.);
        let (mirror_b, mirror_a) = elo_update(rb, ra, !a_wins, 14.);
        (new_a - mirror_a).abs() < EPS && (new_b - mirror_b).abs() < EPS
    }

    #[quickcheck]
    fn winner_gains_and_loser_drops(ra: i16, rb: i16, a_wins: bool) -> bool {
        let (ra, rb) = (rating(ra), rating(rb));
        let (new_a, new_b) = elo_update(ra, rb, a_wins, 14.);
        if a_wins {
            new_a > ra && new_b < rb
        } else {
            new_a < ra && new_b > rb
        }
    }
}
