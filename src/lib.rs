//! ICLabel-Features: feature extraction for ICLabel classification of EEG
//! independent components
//!
//! Given an ICA decomposition of an EEG recording, this library computes the
//! three feature tensors the pretrained ICLabel classifier consumes:
//!
//! - Scalp topographies, 32x32 biharmonic-spline maps of each component's
//!   spatial pattern
//! - Robust power spectral density, the median dB spectrum from 1 to 100 Hz
//! - Autocorrelation, one second of lags resampled to 100 Hz
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use iclabel_features::{FeatureAssembler, FeatureConfig, IcaInput, MixingGeometry};
//! use ndarray::{Array2, Array3};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let activations = Array3::<f64>::zeros((3, 256, 1));
//!     let inverse_mixing = Array2::<f64>::eye(3);
//!     let theta = [0.0, 120.0, 240.0];
//!     let rho = [0.3, 0.3, 0.3];
//!
//!     let geometry = MixingGeometry::new(inverse_mixing.view(), &theta, &rho)?;
//!     let input = IcaInput::new(activations.view(), geometry, 128);
//!
//!     let assembler = FeatureAssembler::new(FeatureConfig::default())?;
//!     let features = assembler.extract(&input)?;
//!     println!("topography: {:?}", features.topography.dim());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod labels;
pub mod processing;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{AutocorrMethod, ConfigLoader, FeatureConfig, LineNoiseConfig};
pub use error::{FeatureError, FeatureResult, ProcessingStage};
pub use labels::{summarize_predictions, ComponentLabel, IcLabelClass, LabelingMethod};
pub use processing::{ComponentFeatures, FeatureAssembler, IcaFeatures, IcaInput, MixingGeometry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Feature extraction for ICLabel classification of EEG independent components".to_string(),
        features: vec![
            "Biharmonic scalp topographies".to_string(),
            "Robust power spectral density".to_string(),
            "Autocorrelation with polyphase resampling".to_string(),
            "TOML configuration with environment overrides".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}
