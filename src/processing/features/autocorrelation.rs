//! Autocorrelation features
//!
//! Autocorrelation is computed through the power spectrum (Wiener-Khinchin),
//! normalized to 1 at lag zero, and resampled onto a 100 Hz lag axis so every
//! recording yields one second of 10 ms lags.

use super::segments::SegmentLayout;
use crate::config::constants::autocorrelation::{TARGET_RATE_HZ, WELCH_MIN_DURATION_SECONDS, WELCH_SEGMENT_SECONDS};
use crate::config::AutocorrMethod;
use crate::error::{FeatureError, FeatureResult, ProcessingStage};
use crate::processing::resample::resample_poly;
use ndarray::{Array4, ArrayView2, ArrayView3, Axis};
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::{debug, warn};

/// Pick the estimator for a recording. `Auto` uses Welch only for a single
/// epoch longer than five seconds.
pub fn resolve_method(method: AutocorrMethod, srate: usize, pnts: usize, epochs: usize) -> AutocorrMethod {
    match method {
        AutocorrMethod::Auto => {
            if epochs == 1 && pnts > WELCH_MIN_DURATION_SECONDS * srate {
                AutocorrMethod::Welch
            } else {
                AutocorrMethod::Fft
            }
        }
        other => other,
    }
}

/// Autocorrelation extractor for one recording geometry
#[derive(Debug, Clone)]
pub struct AutocorrExtractor {
    srate: usize,
    pnts: usize,
    epochs: usize,
    method: AutocorrMethod,
}

impl AutocorrExtractor {
    /// Resolves `Auto` and checks the epoch geometry up front
    pub fn new(method: AutocorrMethod, srate: usize, pnts: usize, epochs: usize) -> FeatureResult<Self> {
        if srate == 0 || pnts == 0 || epochs == 0 {
            return Err(FeatureError::invalid_input(
                "autocorrelation",
                "sample rate, samples per epoch and epochs must be positive",
            ));
        }

        let method = resolve_method(method, srate, pnts, epochs);
        if method == AutocorrMethod::Welch {
            let n_points = pnts.min(WELCH_SEGMENT_SECONDS * srate);
            if n_points <= srate {
                return Err(FeatureError::mismatch(
                    "pnts",
                    "Welch autocorrelation needs segments longer than one second",
                    format!("> {}", srate),
                    pnts,
                ));
            }
        }

        Ok(Self {
            srate,
            pnts,
            epochs,
            method,
        })
    }

    /// The estimator actually used, never `Auto`
    pub fn method(&self) -> AutocorrMethod {
        self.method
    }

    /// Lag-zero-normalized autocorrelation of one component, `srate + 1` lags
    pub fn component_lags(&self, activation: &ArrayView2<'_, f64>) -> Vec<f64> {
        match self.method {
            AutocorrMethod::Welch => welch_autocorrelation(activation, self.srate),
            _ => fft_autocorrelation(activation, self.srate),
        }
    }

    /// Autocorrelation of all components, shape (1, 100, 1, n_components)
    pub fn extract(&self, activations: ArrayView3<'_, f64>) -> FeatureResult<Array4<f64>> {
        debug!(
            method = ?self.method,
            srate = self.srate,
            pnts = self.pnts,
            epochs = self.epochs,
            "computing autocorrelation features"
        );

        let n_components = activations.len_of(Axis(0));
        let mut out = Array4::<f64>::zeros((1, TARGET_RATE_HZ, 1, n_components));
        for (c, activation) in activations.axis_iter(Axis(0)).enumerate() {
            let lags = resample_lags(&self.component_lags(&activation), self.srate)?;
            for (k, value) in lags.into_iter().enumerate() {
                out[[0, k, 0, c]] = value;
            }
        }
        Ok(out)
    }
}

/// FFT autocorrelation features, shape (1, 100, 1, C)
pub fn eeg_autocorr_fftw(activations: ArrayView3<'_, f64>, srate: usize) -> FeatureResult<Array4<f64>> {
    let (_, pnts, epochs) = activations.dim();
    AutocorrExtractor::new(AutocorrMethod::Fft, srate, pnts, epochs)?.extract(activations)
}

/// Welch autocorrelation features, shape (1, 100, 1, C)
pub fn eeg_autocorr_welch(activations: ArrayView3<'_, f64>, srate: usize) -> FeatureResult<Array4<f64>> {
    let (_, pnts, epochs) = activations.dim();
    AutocorrExtractor::new(AutocorrMethod::Welch, srate, pnts, epochs)?.extract(activations)
}

/// Whole-epoch autocorrelation averaged over epochs.
///
/// Epochs shorter than one second keep their `pnts` available lags and are
/// zero-filled up to `srate + 1`.
pub fn fft_autocorrelation(activation: &ArrayView2<'_, f64>, srate: usize) -> Vec<f64> {
    let (pnts, epochs) = activation.dim();
    let nfft = (2 * pnts - 1).next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(nfft);
    let inverse = planner.plan_fft_inverse(nfft);

    let mut power = vec![Complex64::new(0.0, 0.0); nfft];
    let mut buffer = vec![Complex64::new(0.0, 0.0); nfft];
    for epoch in activation.axis_iter(Axis(1)) {
        buffer.iter_mut().for_each(|b| *b = Complex64::new(0.0, 0.0));
        for (slot, &sample) in buffer.iter_mut().zip(epoch.iter()) {
            *slot = Complex64::new(sample, 0.0);
        }
        forward.process(&mut buffer);
        for (p, b) in power.iter_mut().zip(&buffer) {
            p.re += b.norm_sqr() / epochs as f64;
        }
    }

    inverse.process(&mut power);
    let available = pnts.min(srate + 1);
    let mut lags = vec![0.0; srate + 1];
    for (lag, p) in lags.iter_mut().zip(&power).take(available) {
        *lag = p.re / nfft as f64;
    }

    normalize_to_lag_zero(&mut lags);
    lags
}

/// Segment-averaged autocorrelation over segments of at most three seconds,
/// corrected for the shrinking overlap at long lags.
///
/// Segments are drawn from every epoch. Expects `min(pnts, 3 * srate) > srate`.
pub fn welch_autocorrelation(activation: &ArrayView2<'_, f64>, srate: usize) -> Vec<f64> {
    let (pnts, epochs) = activation.dim();
    let n_points = pnts.min(WELCH_SEGMENT_SECONDS * srate);
    let nfft = (2 * n_points - 1).next_power_of_two();
    let layout = SegmentLayout::new(pnts, n_points, epochs);
    let n_segments = layout.n_segments();

    let mut lags = vec![0.0; srate + 1];
    if n_segments == 0 {
        warn!(pnts, n_points, "no Welch segments fit, autocorrelation left at zero");
        return lags;
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(nfft);
    let inverse = planner.plan_fft_inverse(nfft);

    let mut power = vec![Complex64::new(0.0, 0.0); nfft];
    let mut buffer = vec![Complex64::new(0.0, 0.0); nfft];
    for segment in 0..n_segments {
        buffer.iter_mut().for_each(|b| *b = Complex64::new(0.0, 0.0));
        for (slot, sample) in buffer.iter_mut().zip(layout.extract(activation, segment)) {
            *slot = Complex64::new(sample, 0.0);
        }
        forward.process(&mut buffer);
        for (p, b) in power.iter_mut().zip(&buffer) {
            p.re += b.norm_sqr() / n_segments as f64;
        }
    }

    inverse.process(&mut power);
    for (k, lag) in lags.iter_mut().enumerate() {
        let raw = power.get(k).map_or(0.0, |p| p.re / nfft as f64);
        // Fraction of the segment that overlaps itself at lag k
        let overlap = n_points.saturating_sub(k).max(1) as f64 / n_points as f64;
        *lag = raw / overlap;
    }

    normalize_to_lag_zero(&mut lags);
    lags
}

/// Divide by lag zero; a zero or non-finite lag zero zeroes every lag
pub fn normalize_to_lag_zero(lags: &mut [f64]) {
    let Some(&lag0) = lags.first() else {
        return;
    };
    if lag0 != 0.0 && lag0.is_finite() {
        lags.iter_mut().for_each(|v| *v /= lag0);
    } else {
        warn!(lag0, "degenerate autocorrelation, leaving lags at zero");
        lags.iter_mut().for_each(|v| *v = 0.0);
    }
}

/// Resample `srate + 1` lags onto the 100 Hz lag axis and drop lag zero
pub fn resample_lags(lags: &[f64], srate: usize) -> FeatureResult<Vec<f64>> {
    let resampled = resample_poly(lags, TARGET_RATE_HZ, srate)?;
    if resampled.len() != TARGET_RATE_HZ + 1 {
        return Err(FeatureError::numerical(
            ProcessingStage::Resampling,
            &format!(
                "expected {} resampled lags, got {}",
                TARGET_RATE_HZ + 1,
                resampled.len()
            ),
        ));
    }
    Ok(resampled[1..].to_vec())
}
