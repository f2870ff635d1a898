use super::{OutcomeSource, compare_scores};
use crate::Skill;
use crate::data_processing::{read_sample_file, sample_file_path};
use crate::error::{Result, SimError};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Recorded scores per skill tier, read from disk the first time a tier is requested
/// and kept for the rest of the process.
#[derive(Debug)]
pub struct SamplePoolCache {
    sample_dir: PathBuf,
    pools: Mutex<HashMap<Skill, Arc<[u32]>>>,
}

impl SamplePoolCache {
    pub fn new(sample_dir: impl Into<PathBuf>) -> Self {
        Self {
            sample_dir: sample_dir.into(),
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a cache whose pools are already populated, useful for testing.
    /// Every pool must hold at least one score.
    pub fn from_pools(pools: impl IntoIterator<Item = (Skill, Vec<u32>)>) -> Result<Self> {
        let sample_dir = PathBuf::new();
        let pools = pools
            .into_iter()
            .map(|(skill, scores)| {
                if scores.is_empty() {
                    return Err(SimError::EmptySamplePool(sample_file_path(&sample_dir, skill)));
                }
                Ok((skill, scores.into()))
            })
            .collect::<Result<HashMap<Skill, Arc<[u32]>>>>()?;
        Ok(Self {
            sample_dir,
            pools: Mutex::new(pools),
        })
    }

    /// The pool for `skill`. Every lookup goes through the lock, so concurrent callers
    /// can never load the same file twice or observe a half-built pool.
    pub fn pool(&self, skill: Skill) -> Result<Arc<[u32]>> {
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = pools.get(&skill) {
            return Ok(Arc::clone(pool));
        }
        let path = sample_file_path(&self.sample_dir, skill);
        let pool: Arc<[u32]> = read_sample_file(&path)?.into();
        tracing::info!("Loaded {} samples for skill {} from {:?}", pool.len(), skill, path);
        pools.insert(skill, Arc::clone(&pool));
        Ok(pool)
    }

    pub fn num_loaded(&self) -> usize {
        self.pools.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Draws one recorded score per side, uniformly with replacement, and compares them.
#[derive(Debug)]
pub struct CachedSample {
    cache: SamplePoolCache,
}

impl CachedSample {
    pub fn new(cache: SamplePoolCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SamplePoolCache {
        &self.cache
    }

    pub fn draw(&self, skill: Skill, rng: &mut StdRng) -> Result<u32> {
        let pool = self.cache.pool(skill)?;
        pool.choose(rng).copied().ok_or_else(|| {
            SimError::EmptySamplePool(sample_file_path(&self.cache.sample_dir, skill))
        })
    }
}

impl OutcomeSource for CachedSample {
    fn decide(&self, skill_a: Skill, skill_b: Skill, rng: &mut StdRng) -> Result<bool> {
        let score_a = self.draw(skill_a, rng)?;
        let score_b = self.draw(skill_b, rng)?;
        Ok(compare_scores(score_a, score_b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_processing::write_sample_file;
    use claims::assert_matches;
    use rand::SeedableRng;

    #[test]
    fn test_draws_are_uniform_over_the_pool() {
        let cache = SamplePoolCache::from_pools([(5, vec![100, 200, 300])]).unwrap();
        let source = CachedSample::new(cache);
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = HashMap::new();
        for _ in 0..1000 {
            *counts.entry(source.draw(5, &mut rng).unwrap()).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 3);
        // Each count is Binomial(1000, 1/3): the standard deviation is about 15
        for score in [100, 200, 300] {
            let count = counts[&score];
            assert!((270..=397).contains(&count), "{} drawn {} times", score, count);
        }
    }

    #[test]
    fn test_higher_score_wins() {
        let source = CachedSample::new(SamplePoolCache::from_pools([
            (1, vec![10]),
            (2, vec![20]),
            (3, vec![20]),
        ])
        .unwrap());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!source.decide(1, 2, &mut rng).unwrap());
        assert!(source.decide(2, 1, &mut rng).unwrap());
        assert!(!source.decide(2, 3, &mut rng).unwrap());
        assert!(!source.decide(3, 2, &mut rng).unwrap());
    }

    #[test]
    fn test_pools_load_once() {
        let dir = std::env::temp_dir().join(format!("elo_pool_cache_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_sample_file(sample_file_path(&dir, 9), &[1, 2, 3]).unwrap();

        let cache = SamplePoolCache::new(&dir);
        assert_eq!(cache.num_loaded(), 0);
        let first = cache.pool(9).unwrap();
        // Removing the file proves the second lookup never touches the disk
        std::fs::remove_dir_all(&dir).unwrap();
        let second = cache.pool(9).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.num_loaded(), 1);
    }

    #[test]
    fn test_missing_tier_is_fatal() {
        let cache = SamplePoolCache::new("no/such/sample/dir");
        assert_matches!(cache.pool(3), Err(SimError::MissingSampleFile { .. }));
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        assert_matches!(
            SamplePoolCache::from_pools([(1, vec![]), (2, vec![5])]),
            Err(SimError::EmptySamplePool(_))
        );
    }

    #[test]
    fn test_empty_pool_never_decides_a_game() {
        let cache = SamplePoolCache::from_pools([(2, vec![5])]).unwrap();
        // Slip an empty pool past the constructor
        cache.pools.lock().unwrap().insert(1, Arc::from(Vec::new()));
        let source = CachedSample::new(cache);
        let mut rng = StdRng::seed_from_u64(0);
        assert_matches!(source.draw(1, &mut rng), Err(SimError::EmptySamplePool(_)));
        assert_matches!(source.decide(2, 1, &mut rng), Err(SimError::EmptySamplePool(_)));
    }
}
