// src/processing/mod.rs
//! Signal processing for ICA component features

pub mod features;
pub mod interpolation;
pub mod pipeline;
pub mod resample;
pub mod windowing;

pub use features::*;
pub use pipeline::*;
pub use resample::resample_poly;
pub use windowing::{generate_window, hamming, WindowType};
