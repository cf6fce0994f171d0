// src/error.rs
//! Unified error handling for the feature-extraction engine
//!
//! Every fallible operation in the crate returns [`FeatureResult`]. Errors fall
//! into three groups:
//! - precondition violations, detected before any computation starts
//! - numerical failures that cannot be recovered locally
//! - configuration loading failures
//!
//! Recoverable degeneracies (rank-deficient interpolation systems, constant
//! topographies, empty segment subsets) are not errors; they are handled where
//! they occur and reported through `tracing`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unified error type for feature extraction
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Input does not satisfy the engine's contract
    #[error("[INPUT] Invalid {field}: {reason}{}", format_expectation(.expected, .actual))]
    InvalidInput {
        /// Offending argument or field
        field: String,
        /// What the contract requires
        reason: String,
        /// Declared value, when one applies
        expected: Option<String>,
        /// Supplied value
        actual: Option<String>,
    },

    /// A numerical routine failed in a way that has no local fallback
    #[error("[NUMERICAL] {stage} stage failure: {reason}")]
    Numerical {
        /// Stage that failed
        stage: ProcessingStage,
        /// Failure description
        reason: String,
    },

    /// Configuration values are inconsistent
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration {
        /// Configuration section
        component: String,
        /// Failed constraint
        reason: String,
    },

    /// Configuration file could not be read or written
    #[error("[CONFIG] IO error on {path}: {source}")]
    ConfigIo {
        /// File being read or written
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::config::FeatureConfig`]
    #[error("[CONFIG] Parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("[CONFIG] Serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

fn format_expectation(expected: &Option<String>, actual: &Option<String>) -> String {
    match (expected, actual) {
        (Some(exp), Some(act)) => format!(" (expected: {}, got: {})", exp, act),
        (Some(exp), None) => format!(" (expected: {})", exp),
        _ => String::new(),
    }
}

/// Engine stages, used to tag where an error happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStage {
    /// Input contract checks
    Validation,
    /// Biharmonic spline fit and evaluation
    Interpolation,
    /// Scalp map rendering
    Topography,
    /// Robust power spectral density
    Spectrum,
    /// Autocorrelation estimation
    Autocorrelation,
    /// Polyphase resampling
    Resampling,
    /// Tensor assembly across components
    Assembly,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingStage::Validation => "validation",
            ProcessingStage::Interpolation => "interpolation",
            ProcessingStage::Topography => "topography",
            ProcessingStage::Spectrum => "spectrum",
            ProcessingStage::Autocorrelation => "autocorrelation",
            ProcessingStage::Resampling => "resampling",
            ProcessingStage::Assembly => "assembly",
        };
        f.write_str(name)
    }
}

/// Result type alias for feature extraction operations
pub type FeatureResult<T> = Result<T, FeatureError>;

impl FeatureError {
    /// Precondition violation with no expected/actual detail
    pub fn invalid_input(field: &str, reason: &str) -> Self {
        FeatureError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
            expected: None,
            actual: None,
        }
    }

    /// Shape or size mismatch between what was declared and what was supplied
    pub fn mismatch<E: fmt::Display, A: fmt::Display>(
        field: &str,
        reason: &str,
        expected: E,
        actual: A,
    ) -> Self {
        FeatureError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
            expected: Some(expected.to_string()),
            actual: Some(actual.to_string()),
        }
    }

    /// Unrecoverable numerical failure in `stage`
    pub fn numerical(stage: ProcessingStage, reason: &str) -> Self {
        FeatureError::Numerical {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Invalid configuration value
    pub fn configuration(component: &str, reason: &str) -> Self {
        FeatureError::Configuration {
            component: component.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors raised before any computation ran
    pub fn is_precondition(&self) -> bool {
        matches!(self, FeatureError::InvalidInput { .. })
    }
}
