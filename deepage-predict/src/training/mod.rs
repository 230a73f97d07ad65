//! Offline training of cluster models from terrestrial records

pub mod aggregates;
pub mod registry;
pub mod trainer;

pub use registry::ModelRegistry;
pub use trainer::{train, train_with_stats, TrainingStats};
