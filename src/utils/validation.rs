//! Input contract validation
//!
//! The engine fails fast: every check here runs before any feature is
//! computed, so a rejected call never produces partial output.

use crate::config::constants::{output, spectrum};
use crate::error::{FeatureError, FeatureResult};
use ndarray::ArrayView3;

/// Sample rate must be positive and high enough to yield 100 autocorrelation lags
pub fn validate_sample_rate(srate: usize) -> FeatureResult<()> {
    if srate == 0 {
        return Err(FeatureError::invalid_input("srate", "sample rate must be positive"));
    }
    if srate < output::MIN_SAMPLE_RATE_HZ {
        return Err(FeatureError::mismatch(
            "srate",
            "sample rate too low for a one-second lag axis at 100 Hz",
            format!(">= {}", output::MIN_SAMPLE_RATE_HZ),
            srate,
        ));
    }
    Ok(())
}

/// `pct_data` must be a percentage in 1..=100
pub fn validate_pct_data(pct_data: u8) -> FeatureResult<()> {
    if !(spectrum::MIN_PCT_DATA..=spectrum::MAX_PCT_DATA).contains(&pct_data) {
        return Err(FeatureError::mismatch(
            "pct_data",
            "percentage of data out of range",
            format!("{}..={}", spectrum::MIN_PCT_DATA, spectrum::MAX_PCT_DATA),
            pct_data,
        ));
    }
    Ok(())
}

/// Activation tensor must match the declared (components, samples, epochs)
pub fn validate_activation_shape(
    activations: &ArrayView3<'_, f64>,
    n_components: usize,
    pnts: usize,
    trials: usize,
) -> FeatureResult<()> {
    let (c, p, t) = activations.dim();
    if c != n_components {
        return Err(FeatureError::mismatch("activations", "component count mismatch", n_components, c));
    }
    if p != pnts {
        return Err(FeatureError::mismatch("activations", "samples per epoch mismatch", pnts, p));
    }
    if t != trials {
        return Err(FeatureError::mismatch("activations", "epoch count mismatch", trials, t));
    }
    if c == 0 || p == 0 || t == 0 {
        return Err(FeatureError::invalid_input(
            "activations",
            "components, samples and epochs must all be positive",
        ));
    }
    Ok(())
}

/// Every subset index must address an existing segment
pub fn validate_subset(subset: &[usize], n_segments: usize) -> FeatureResult<()> {
    if let Some(&bad) = subset.iter().find(|&&idx| idx >= n_segments) {
        return Err(FeatureError::mismatch(
            "subset",
            "segment index out of range",
            format!("< {}", n_segments),
            bad,
        ));
    }
    Ok(())
}

/// Per-channel arrays must match the channel count
pub fn validate_equal_lengths(field: &str, expected: usize, actual: usize) -> FeatureResult<()> {
    if expected != actual {
        return Err(FeatureError::mismatch(field, "length mismatch", expected, actual));
    }
    Ok(())
}
