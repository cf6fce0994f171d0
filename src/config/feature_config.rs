// src/config/feature_config.rs
//! Feature extraction configuration structures

use crate::config::constants::spectrum;
use crate::error::{FeatureError, FeatureResult};
use serde::{Deserialize, Serialize};

/// Complete feature extraction configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeatureConfig {
    /// Percentage of spectral segments used when no explicit subset is given
    #[serde(default = "defaults::pct_data")]
    pub pct_data: u8,

    /// Autocorrelation estimator
    #[serde(default)]
    pub autocorr_method: AutocorrMethod,

    /// Render topographies on the rayon pool
    #[serde(default = "defaults::parallel")]
    pub parallel: bool,

    /// Factor applied to every output tensor
    #[serde(default = "defaults::output_scale")]
    pub output_scale: f64,

    /// Line-noise notch correction of the spectrum
    #[serde(default)]
    pub line_noise: LineNoiseConfig,
}

/// Line-noise notch correction settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LineNoiseConfig {
    /// Apply the correction at all
    #[serde(default = "defaults::line_noise_enabled")]
    pub enabled: bool,

    /// 0-based spectrum columns to inspect
    #[serde(default = "defaults::line_noise_bins")]
    pub bins: Vec<usize>,

    /// Margin in dB both neighbours must exceed the bin by
    #[serde(default = "defaults::line_noise_threshold_db")]
    pub threshold_db: f64,
}

/// Autocorrelation estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AutocorrMethod {
    /// Whole-epoch FFT autocorrelation averaged over epochs
    #[default]
    Fft,
    /// Segment-averaged autocorrelation with overlap correction
    Welch,
    /// Welch for a single epoch longer than five seconds, FFT otherwise
    Auto,
}

mod defaults {
    use crate::config::constants::{output, spectrum};

    pub fn pct_data() -> u8 { spectrum::DEFAULT_PCT_DATA }
    pub fn parallel() -> bool { true }
    pub fn output_scale() -> f64 { output::OUTPUT_SCALE }
    pub fn line_noise_enabled() -> bool { true }
    pub fn line_noise_bins() -> Vec<usize> { spectrum::LINE_NOISE_BINS.to_vec() }
    pub fn line_noise_threshold_db() -> f64 { spectrum::LINE_NOISE_THRESHOLD_DB }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            pct_data: defaults::pct_data(),
            autocorr_method: AutocorrMethod::default(),
            parallel: defaults::parallel(),
            output_scale: defaults::output_scale(),
            line_noise: LineNoiseConfig::default(),
        }
    }
}

impl Default for LineNoiseConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::line_noise_enabled(),
            bins: defaults::line_noise_bins(),
            threshold_db: defaults::line_noise_threshold_db(),
        }
    }
}

impl FeatureConfig {
    /// Check value ranges and cross-field constraints
    pub fn validate(&self) -> FeatureResult<()> {
        if !(spectrum::MIN_PCT_DATA..=spectrum::MAX_PCT_DATA).contains(&self.pct_data) {
            return Err(FeatureError::configuration(
                "feature_config",
                &format!(
                    "pct_data must be in {}..={}, got {}",
                    spectrum::MIN_PCT_DATA,
                    spectrum::MAX_PCT_DATA,
                    self.pct_data
                ),
            ));
        }

        if !self.output_scale.is_finite() || self.output_scale <= 0.0 {
            return Err(FeatureError::configuration(
                "feature_config",
                &format!("output_scale must be finite and positive, got {}", self.output_scale),
            ));
        }

        self.line_noise.validate()
    }
}

impl LineNoiseConfig {
    /// Bins need both neighbours in range; the threshold must be non-negative
    pub fn validate(&self) -> FeatureResult<()> {
        for &bin in &self.bins {
            // Both neighbours must exist inside the 100-bin spectrum
            if bin == 0 || bin + 1 >= spectrum::N_FREQS {
                return Err(FeatureError::configuration(
                    "line_noise",
                    &format!("bin {} has no neighbours inside 0..{}", bin, spectrum::N_FREQS),
                ));
            }
        }

        if !self.threshold_db.is_finite() || self.threshold_db < 0.0 {
            return Err(FeatureError::configuration(
                "line_noise",
                &format!("threshold_db must be finite and non-negative, got {}", self.threshold_db),
            ));
        }

        Ok(())
    }
}
