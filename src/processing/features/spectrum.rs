//! Robust power spectral density (RPSD) features
//!
//! Each component's activation is cut into half-overlapping Hamming-windowed
//! segments. The per-frequency median of the segment periodograms is taken
//! in dB, notches left by line-noise filtering are filled in, and the
//! spectrum is scaled by its largest magnitude.

use super::segments::SegmentLayout;
use crate::config::constants::spectrum::N_FREQS;
use crate::config::LineNoiseConfig;
use crate::error::{FeatureError, FeatureResult};
use crate::processing::windowing::hamming;
use crate::utils::validation::{validate_pct_data, validate_subset};
use ndarray::{Array4, ArrayView2, ArrayView3, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, warn};

/// Spectral feature extractor for one recording geometry
pub struct SpectralExtractor {
    srate: usize,
    n_freqs: usize,
    nyquist: usize,
    window: Vec<f64>,
    denominator: f64,
    layout: SegmentLayout,
    fft: Arc<dyn Fft<f64>>,
    line_noise: LineNoiseConfig,
}

impl SpectralExtractor {
    /// Build the extractor for epochs of `pnts` samples at `srate` Hz
    pub fn new(srate: usize, pnts: usize, epochs: usize, line_noise: &LineNoiseConfig) -> FeatureResult<Self> {
        if srate == 0 || pnts == 0 || epochs == 0 {
            return Err(FeatureError::invalid_input(
                "spectrum",
                "sample rate, samples per epoch and epochs must be positive",
            ));
        }

        let nyquist = srate / 2;
        let n_freqs = N_FREQS.min(nyquist);
        let n_points = pnts.min(srate);
        if n_points <= n_freqs {
            return Err(FeatureError::mismatch(
                "pnts",
                "epochs too short to resolve the spectral bins",
                format!("> {}", n_freqs),
                n_points,
            ));
        }

        let window = hamming(n_points);
        let denominator = srate as f64 * window.iter().map(|w| w * w).sum::<f64>();
        let fft = FftPlanner::<f64>::new().plan_fft_forward(n_points);

        Ok(Self {
            srate,
            n_freqs,
            nyquist,
            window,
            denominator,
            layout: SegmentLayout::new(pnts, n_points, epochs),
            fft,
            line_noise: line_noise.clone(),
        })
    }

    /// Segment layout shared by every component
    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    /// Segments available for the median
    pub fn n_segments(&self) -> usize {
        self.layout.n_segments()
    }

    /// Segments to use: the caller's subset, or a random `pct_data` percent of all segments
    pub fn select_segments<R: Rng + ?Sized>(
        &self,
        subset: Option<&[usize]>,
        pct_data: u8,
        rng: &mut R,
    ) -> FeatureResult<Vec<usize>> {
        let n_segments = self.n_segments();
        match subset {
            Some(indices) => {
                validate_subset(indices, n_segments)?;
                Ok(indices.to_vec())
            }
            None => {
                validate_pct_data(pct_data)?;
                let keep = (n_segments * pct_data as usize).div_ceil(100);
                let mut indices: Vec<usize> = (0..n_segments).collect();
                indices.shuffle(rng);
                indices.truncate(keep);
                Ok(indices)
            }
        }
    }

    /// Median log-power spectrum (dB) of one component, `n_freqs` bins
    pub fn median_log_psd(&self, activation: &ArrayView2<'_, f64>, segments: &[usize]) -> Vec<f64> {
        if segments.is_empty() {
            warn!("no spectral segments selected, spectrum left at zero");
            return vec![0.0; self.n_freqs];
        }

        let n_points = self.layout.segment_length();
        let mut powers: Vec<Vec<f64>> = vec![Vec::with_capacity(segments.len()); self.n_freqs];
        let mut buffer = vec![Complex64::new(0.0, 0.0); n_points];

        for &segment in segments {
            let samples = self.layout.extract(activation, segment);
            for ((slot, sample), w) in buffer.iter_mut().zip(&samples).zip(&self.window) {
                *slot = Complex64::new(sample * w, 0.0);
            }
            self.fft.process(&mut buffer);

            for (f, bin_powers) in powers.iter_mut().enumerate() {
                let mut power = buffer[f + 1].norm_sqr() * 2.0 / self.denominator;
                // The Nyquist bin has no mirrored negative frequency
                if self.n_freqs == self.nyquist && f + 1 == self.n_freqs {
                    power /= 2.0;
                }
                bin_powers.push(power);
            }
        }

        powers
            .iter_mut()
            .map(|bin_powers| 20.0 * median(bin_powers).log10())
            .collect()
    }

    /// Full 100-bin feature for one component: median dB spectrum, padded,
    /// line-noise corrected and normalized
    pub fn component_spectrum(&self, activation: &ArrayView2<'_, f64>, segments: &[usize]) -> Vec<f64> {
        let mut psd = self.median_log_psd(activation, segments);
        pad_spectrum(&mut psd, N_FREQS);
        if self.line_noise.enabled {
            correct_line_noise(&mut psd, &self.line_noise);
        }
        normalize_max_abs(&mut psd);
        psd
    }

    /// Spectra of all components, shape (1, 100, 1, n_components)
    pub fn extract<R: Rng + ?Sized>(
        &self,
        activations: ArrayView3<'_, f64>,
        subset: Option<&[usize]>,
        pct_data: u8,
        rng: &mut R,
    ) -> FeatureResult<Array4<f64>> {
        let segments = self.select_segments(subset, pct_data, rng)?;
        Ok(self.extract_segments(activations, &segments))
    }

    /// Spectra of all components over already selected segments
    pub fn extract_segments(&self, activations: ArrayView3<'_, f64>, segments: &[usize]) -> Array4<f64> {
        debug!(
            srate = self.srate,
            segments = segments.len(),
            available = self.n_segments(),
            "computing spectral features"
        );

        let n_components = activations.len_of(Axis(0));
        let mut out = Array4::<f64>::zeros((1, N_FREQS, 1, n_components));
        for (c, activation) in activations.axis_iter(Axis(0)).enumerate() {
            let psd = self.component_spectrum(&activation, segments);
            for (f, value) in psd.into_iter().enumerate() {
                out[[0, f, 0, c]] = value;
            }
        }
        out
    }
}

/// Spectral features with the default line-noise correction, shape (1, 100, 1, C)
pub fn eeg_rpsd<R: Rng + ?Sized>(
    activations: ArrayView3<'_, f64>,
    srate: usize,
    subset: Option<&[usize]>,
    pct_data: u8,
    rng: &mut R,
) -> FeatureResult<Array4<f64>> {
    let (_, pnts, epochs) = activations.dim();
    SpectralExtractor::new(srate, pnts, epochs, &LineNoiseConfig::default())?.extract(activations, subset, pct_data, rng)
}

/// Replicate the last bin until the spectrum has `n_bins` entries
pub fn pad_spectrum(psd: &mut Vec<f64>, n_bins: usize) {
    if let Some(&last) = psd.last() {
        if psd.len() < n_bins {
            psd.resize(n_bins, last);
        }
    }
}

/// Fill notches at the configured line-noise bins.
///
/// A bin is a notch when both of its neighbours exceed it by more than the
/// threshold; it is replaced by the neighbours' mean.
pub fn correct_line_noise(psd: &mut [f64], config: &LineNoiseConfig) {
    for &bin in &config.bins {
        if bin == 0 || bin + 1 >= psd.len() {
            continue;
        }
        let (below, above) = (psd[bin - 1], psd[bin + 1]);
        if below - psd[bin] > config.threshold_db && above - psd[bin] > config.threshold_db {
            psd[bin] = (below + above) / 2.0;
        }
    }
}

/// Divide by the largest magnitude; a zero or non-finite maximum zeroes the vector
pub fn normalize_max_abs(values: &mut [f64]) {
    let max_abs = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if max_abs > 0.0 && max_abs.is_finite() {
        values.iter_mut().for_each(|v| *v /= max_abs);
    } else {
        warn!(max_abs, "degenerate feature vector, leaving it at zero");
        values.iter_mut().for_each(|v| *v = 0.0);
    }
}

/// Median with the two middle values averaged for even counts
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    fn sine_activations(freq_hz: f64, srate: usize, pnts: usize, epochs: usize) -> Array3<f64> {
        Array3::from_shape_fn((1, pnts, epochs), |(_, t, e)| {
            let time = (t + e * pnts) as f64 / srate as f64;
            (2.0 * PI * freq_hz * time).sin() + 0.01 * (2.0 * PI * 3.7 * time).cos()
        })
    }

    #[test]
    fn test_sinusoid_peaks_at_its_bin() {
        let srate = 256;
        let acts = sine_activations(20.0, srate, 1024, 2);
        let extractor = SpectralExtractor::new(srate, 1024, 2, &LineNoiseConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let all: Vec<usize> = (0..extractor.n_segments()).collect();

        let psd = extractor.median_log_psd(&acts.index_axis(Axis(0), 0), &all);
        let peak = psd
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i + 1)
            .unwrap();
        // Column i holds (i + 1) Hz
        assert!((peak as i64 - 20).abs() <= 1, "peak at {} Hz", peak);

        let features = extractor.extract(acts.view(), None, 100, &mut rng).unwrap();
        assert_eq!(features.dim(), (1, 100, 1, 1));
        assert!(features.iter().all(|v| v.is_finite() && v.abs() <= 1.0 + 1e-12));
    }

    #[test]
    fn test_line_noise_notch_is_filled() {
        let mut psd = vec![-10.0; 100];
        psd[50] = -20.0;
        psd[49] = -12.0;
        psd[51] = -8.0;
        correct_line_noise(&mut psd, &LineNoiseConfig::default());
        assert_eq!(psd[50], -10.0);
    }

    #[test]
    fn test_line_noise_requires_both_neighbours() {
        let mut psd = vec![-10.0; 100];
        psd[60] = -20.0;
        psd[61] = -18.0;
        correct_line_noise(&mut psd, &LineNoiseConfig::default());
        assert_eq!(psd[60], -20.0);
    }

    /// One 256-sample epoch at 256 Hz with tones on both sides of 51 Hz and
    /// 61 Hz. Each pair is phased so its Hamming leakage cancels in the
    /// middle bin, leaving a deep notch in columns 50 and 60.
    fn notched_activation(n: usize) -> Array3<f64> {
        let opposed = -PI + 2.0 * PI / n as f64;
        Array3::from_shape_fn((1, n, 1), |(_, t, _)| {
            let phase = |hz: f64| 2.0 * PI * hz * t as f64 / n as f64;
            let floor: f64 = (1..n / 2)
                .filter(|hz| !(50..=52).contains(hz) && !(60..=62).contains(hz))
                .map(|hz| 1e-3 * (phase(hz as f64) + 0.1 * hz as f64).sin())
                .sum();
            floor
                + phase(50.0).cos()
                + (phase(52.0) + opposed).cos()
                + phase(60.0).cos()
                + (phase(62.0) + opposed).cos()
        })
    }

    #[test]
    fn test_extractor_fills_line_noise_notches() {
        let srate = 256;
        let acts = notched_activation(srate);
        let activation = acts.index_axis(Axis(0), 0);
        let uncorrected = LineNoiseConfig {
            enabled: false,
            ..LineNoiseConfig::default()
        };
        let plain = SpectralExtractor::new(srate, srate, 1, &uncorrected).unwrap();
        let corrected = SpectralExtractor::new(srate, srate, 1, &LineNoiseConfig::default()).unwrap();

        let raw = plain.median_log_psd(&activation, &[0]);
        for bin in [50, 60] {
            assert!(raw[bin - 1] - raw[bin] > 5.0, "no notch below column {}", bin);
            assert!(raw[bin + 1] - raw[bin] > 5.0, "no notch above column {}", bin);
        }

        let untouched = plain.component_spectrum(&activation, &[0]);
        assert!(untouched[50] < untouched[49] && untouched[60] < untouched[61]);

        let mut expected = raw.clone();
        for bin in [50, 60] {
            expected[bin] = (raw[bin - 1] + raw[bin + 1]) / 2.0;
        }
        normalize_max_abs(&mut expected);

        let filled = corrected.component_spectrum(&activation, &[0]);
        assert_eq!(filled.len(), 100);
        for (f, (got, want)) in filled.iter().zip(&expected).enumerate() {
            assert!((got - want).abs() < 1e-12, "column {}: {} vs {}", f, got, want);
        }
        for bin in [50, 60] {
            assert!((filled[bin] - (filled[bin - 1] + filled[bin + 1]) / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pad_replicates_last_bin() {
        let mut psd = vec![1.0, 2.0, 3.0];
        pad_spectrum(&mut psd, 6);
        assert_eq!(psd, vec![1.0, 2.0, 3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_low_rate_spectrum_is_padded() {
        // 128 Hz: only 64 native bins, the rest replicate bin 64
        let srate = 128;
        let acts = sine_activations(10.0, srate, 256, 1);
        let extractor = SpectralExtractor::new(srate, 256, 1, &LineNoiseConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let features = extractor.extract(acts.view(), None, 100, &mut rng).unwrap();

        for f in 64..100 {
            assert_eq!(features[[0, f, 0, 0]], features[[0, 63, 0, 0]]);
        }
    }

    #[test]
    fn test_subset_selection() {
        let extractor = SpectralExtractor::new(128, 512, 2, &LineNoiseConfig::default()).unwrap();
        assert_eq!(extractor.n_segments(), 14);
        let mut rng = StdRng::seed_from_u64(3);

        let chosen = extractor.select_segments(Some(&[0, 5, 13]), 100, &mut rng).unwrap();
        assert_eq!(chosen, vec![0, 5, 13]);
        assert!(extractor.select_segments(Some(&[14]), 100, &mut rng).is_err());

        let half = extractor.select_segments(None, 50, &mut rng).unwrap();
        assert_eq!(half.len(), 7);
        let tiny = extractor.select_segments(None, 1, &mut rng).unwrap();
        assert_eq!(tiny.len(), 1);
    }

    #[test]
    fn test_explicit_subset_is_deterministic() {
        let acts = sine_activations(12.0, 128, 512, 1);
        let extractor = SpectralExtractor::new(128, 512, 1, &LineNoiseConfig::default()).unwrap();
        let subset = [0, 2, 4];
        let a = extractor
            .extract(acts.view(), Some(&subset), 100, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let b = extractor
            .extract(acts.view(), Some(&subset), 100, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_subset_gives_zero_spectrum() {
        let acts = sine_activations(12.0, 128, 256, 1);
        let extractor = SpectralExtractor::new(128, 256, 1, &LineNoiseConfig::default()).unwrap();
        let features = extractor
            .extract(acts.view(), Some(&[]), 100, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(features.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_short_epochs_rejected() {
        assert!(SpectralExtractor::new(256, 64, 1, &LineNoiseConfig::default()).is_err());
        assert!(SpectralExtractor::new(0, 64, 1, &LineNoiseConfig::default()).is_err());
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_normalize_max_abs() {
        let mut values = vec![-4.0, 2.0, 1.0];
        normalize_max_abs(&mut values);
        assert_eq!(values, vec![-1.0, 0.5, 0.25]);

        let mut zeros = vec![0.0; 3];
        normalize_max_abs(&mut zeros);
        assert_eq!(zeros, vec![0.0; 3]);
    }
}
