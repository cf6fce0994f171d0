// src/config/constants.rs
//! Engine-wide constants
//!
//! These values define the feature layout the pretrained classifier was
//! calibrated against. Changing any of them changes the features.

/// Topography rendering constants
pub mod topography {
    /// Side length of the square interpolation grid
    pub const GRID_SCALE: usize = 32;
    /// Head radius in squeezed coordinates; cells beyond it are masked
    pub const RMAX: f64 = 0.5;
    /// Plot radius is the largest electrode radius scaled by this factor
    pub const PLOT_RADIUS_FACTOR: f64 = 1.02;
    /// Plot radius never exceeds this value
    pub const MAX_PLOT_RADIUS: f64 = 1.0;
    /// Grid points closer than this to a sample use the Green's function value at zero
    pub const COINCIDENT_DISTANCE: f64 = 1e-8;
}

/// Power spectral density constants
pub mod spectrum {
    /// Number of 1 Hz bins in the spectral feature
    pub const N_FREQS: usize = 100;
    /// Bins checked for line-noise notches (50 Hz and 60 Hz mains)
    pub const LINE_NOISE_BINS: [usize; 2] = [50, 60];
    /// A bin is a notch when both neighbours exceed it by more than this many dB
    pub const LINE_NOISE_THRESHOLD_DB: f64 = 5.0;
    /// Share of segments used when no subset is given
    pub const DEFAULT_PCT_DATA: u8 = 100;
    /// Smallest accepted `pct_data`
    pub const MIN_PCT_DATA: u8 = 1;
    /// Largest accepted `pct_data`
    pub const MAX_PCT_DATA: u8 = 100;
}

/// Autocorrelation constants
pub mod autocorrelation {
    /// Lag axis is resampled to this rate, giving one second of 10 ms lags
    pub const TARGET_RATE_HZ: usize = 100;
    /// Welch segments span at most this many seconds
    pub const WELCH_SEGMENT_SECONDS: usize = 3;
    /// `Auto` picks Welch for single-epoch recordings longer than this many seconds
    pub const WELCH_MIN_DURATION_SECONDS: usize = 5;
}

/// Polyphase resampler constants
pub mod resample {
    /// Kaiser window beta used by the anti-aliasing filter
    pub const KAISER_BETA: f64 = 5.0;
    /// Filter half length in units of max(up, down)
    pub const HALF_LEN_FACTOR: usize = 10;
}

/// Output tensor constants
pub mod output {
    /// Calibration factor applied to every feature tensor
    pub const OUTPUT_SCALE: f64 = 0.99;
    /// Minimum sample rate that still yields 100 autocorrelation lags
    pub const MIN_SAMPLE_RATE_HZ: usize = 100;
}

/// ICLabel model constants
pub mod labels {
    /// Output classes of the ICLabel network
    pub const N_CLASSES: usize = 7;
    /// Name accepted by `LabelingMethod::from_str`
    pub const METHOD_ICLABEL: &str = "iclabel";
}
