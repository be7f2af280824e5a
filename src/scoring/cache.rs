use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::Caption;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreKey {
    pub entity_name: String,
    pub source_year: String,
    pub caption: Caption,
    pub day: u32,
}

impl ScoreKey {
    pub fn new(entity_name: &str, source_year: &str, caption: Caption, day: u32) -> Self {
        Self {
            entity_name: entity_name.to_string(),
            source_year: source_year.to_string(),
            caption,
            day,
        }
    }
}

/// Run-scoped memo of base caption scores, shared across scoring workers.
///
/// The first value stored for a key wins, so a repeat lookup returns the
/// same number (jitter included) for the rest of the run.
#[derive(Debug, Default)]
pub struct ScoreCache {
    entries: Mutex<HashMap<ScoreKey, f64>>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, key: &ScoreKey) -> Option<f64> {
        self.lock().get(key).copied()
    }

    pub fn get_or_insert_with<F>(&self, key: ScoreKey, compute: F) -> f64
    where
        F: FnOnce(&ScoreKey) -> f64,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        // Computed outside the lock; a concurrent insert for the same key wins.
        let value = compute(&key);
        *self.lock().entry(key).or_insert(value)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ScoreKey, f64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
