//! deepage-predict: undersea aging prediction engine
//!
//! Trains cluster statistics from terrestrial aging records, derives physical
//! correction coefficients, and predicts flavor, quality and the harvest
//! window for a candidate product.

pub mod coefficients;
pub mod config;
pub mod db;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod harvest;
pub mod matching;
pub mod scoring;
pub mod timeline;
pub mod training;

pub use engine::AgingEngine;
pub use ensemble::{predict_statistical, Blender, PredictionInput};
pub use error::{EngineError, Result};
pub use matching::{find_similar_clusters, ClusterMatch};
pub use training::{train, ModelRegistry};
