//! Copy-then-swap holder for the trained model set
//!
//! Readers take an `Arc` snapshot and keep using it for the whole request.
//! A retrain builds the complete new set off to the side and swaps the
//! pointer under a write lock held only for the assignment, so no reader ever
//! sees a partially replaced set.

use std::sync::{Arc, RwLock};

use deepage_common::models::TrainedClusterModel;
use tracing::info;

/// Installed model set and the swap count that produced it
#[derive(Debug, Default)]
struct Installed {
    generation: u64,
    models: Arc<Vec<TrainedClusterModel>>,
}

/// Shared, read-mostly model set
#[derive(Debug, Default)]
pub struct ModelRegistry {
    installed: RwLock<Installed>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with a model set (e.g. loaded from storage)
    pub fn with_models(models: Vec<TrainedClusterModel>) -> Self {
        Self {
            installed: RwLock::new(Installed {
                generation: 1,
                models: Arc::new(models),
            }),
        }
    }

    /// Current model set
    pub fn snapshot(&self) -> Arc<Vec<TrainedClusterModel>> {
        self.snapshot_with_generation().1
    }

    /// Current model set together with the generation that installed it
    pub fn snapshot_with_generation(&self) -> (u64, Arc<Vec<TrainedClusterModel>>) {
        // A poisoned lock still holds a complete pair; swaps never leave it half-written
        let guard = match self.installed.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        (guard.generation, Arc::clone(&guard.models))
    }

    /// Atomically replace the model set, returning the installed snapshot
    pub fn replace(&self, models: Vec<TrainedClusterModel>) -> Arc<Vec<TrainedClusterModel>> {
        let next = Arc::new(models);
        let generation = {
            let mut guard = match self.installed.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.generation += 1;
            guard.models = Arc::clone(&next);
            guard.generation
        };
        info!(models = next.len(), generation, "Model set replaced");
        next
    }

    /// Number of completed swaps (0 = never populated)
    pub fn generation(&self) -> u64 {
        self.snapshot_with_generation().0
    }
}
