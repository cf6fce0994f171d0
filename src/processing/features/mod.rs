//! ICLabel feature extraction
//!
//! Three feature families are computed per independent component:
//! - Scalp topography (32x32 interpolated map of the inverse-mixing column)
//! - Robust power spectral density (median dB spectrum, 1-100 Hz)
//! - Autocorrelation (one second of lags on a 100 Hz axis)

pub mod autocorrelation;
pub mod segments;
pub mod spectrum;
pub mod topography;

pub use autocorrelation::{
    eeg_autocorr_fftw, eeg_autocorr_welch, fft_autocorrelation, resolve_method, welch_autocorrelation,
    AutocorrExtractor,
};
pub use segments::SegmentLayout;
pub use spectrum::{correct_line_noise, eeg_rpsd, normalize_max_abs, pad_spectrum, SpectralExtractor};
pub use topography::{normalize_topography, render_topography, topoplot, MixingGeometry};
