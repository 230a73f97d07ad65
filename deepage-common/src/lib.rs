//! # DeepAge Common Library
//!
//! Shared code for the DeepAge undersea-aging prediction workspace:
//! - Data model (historical records, cluster models, candidates, predictions)
//! - Coefficient types with provenance
//! - Immutable engine parameters
//! - Bootstrap configuration loading (TOML)
//! - Clamp / normalize / statistics utilities

pub mod config;
pub mod error;
pub mod math;
pub mod models;
pub mod params;

pub use error::{Error, Result};
pub use params::EngineParams;
