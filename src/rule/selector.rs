use rand::SeedableRng;
use rand::seq::IteratorRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Mutex;

/// Picks one data source out of a candidate set.
///
/// Shared by every routing call, so implementations must be thread safe.
pub trait DataSourceSelector: Send + Sync + Debug {
    /// Returns `None` only when `candidates` is empty.
    fn select(&self, candidates: &BTreeSet<String>) -> Option<String>;
}

/// Uniform choice backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl DataSourceSelector for RandomSelector {
    fn select(&self, candidates: &BTreeSet<String>) -> Option<String> {
        candidates.iter().choose(&mut rand::thread_rng()).cloned()
    }
}

/// Uniform choice with a reproducible sequence.
#[derive(Debug)]
pub struct SeededSelector {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl DataSourceSelector for SeededSelector {
    fn select(&self, candidates: &BTreeSet<String>) -> Option<String> {
        // A poisoned lock still holds a usable generator.
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        candidates.iter().choose(&mut *rng).cloned()
    }
}

/// Always the lexicographically smallest candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstCandidateSelector;

impl DataSourceSelector for FirstCandidateSelector {
    fn select(&self, candidates: &BTreeSet<String>) -> Option<String> {
        candidates.iter().next().cloned()
    }
}
