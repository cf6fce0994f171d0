// src/config/mod.rs
//! Configuration for the feature-extraction engine

pub mod constants;
pub mod feature_config;
pub mod loader;

pub use constants::*;
pub use feature_config::{AutocorrMethod, FeatureConfig, LineNoiseConfig};
pub use loader::ConfigLoader;
