// src/processing/windowing.rs
//! Symmetric window functions for spectral estimation and FIR design

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// All ones
    Rectangular,
    /// 0.54 - 0.46 cos
    Hamming,
    /// Raised cosine
    Hanning,
    /// Kaiser window with shape parameter `beta`
    Kaiser {
        /// Shape parameter; larger values trade main-lobe width for sidelobe level
        beta: f64,
    },
}

/// Generate a symmetric window of `size` points
pub fn generate_window(window_type: WindowType, size: usize) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    if size == 1 {
        return vec![1.0];
    }

    let denom = (size - 1) as f64;
    match window_type {
        WindowType::Rectangular => vec![1.0; size],
        WindowType::Hamming => (0..size)
            .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
            .collect(),
        WindowType::Hanning => (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
            .collect(),
        WindowType::Kaiser { beta } => {
            let alpha = denom / 2.0;
            let i0_beta = modified_bessel_i0(beta);
            (0..size)
                .map(|i| {
                    let ratio = (i as f64 - alpha) / alpha;
                    let arg = beta * (1.0 - ratio * ratio).max(0.0).sqrt();
                    modified_bessel_i0(arg) / i0_beta
                })
                .collect()
        }
    }
}

/// Hamming window as used by the spectral extractor
pub fn hamming(size: usize) -> Vec<f64> {
    generate_window(WindowType::Hamming, size)
}

/// Modified Bessel function of the first kind, order 0 (power series)
pub fn modified_bessel_i0(x: f64) -> f64 {
    let half_sq = (x / 2.0).powi(2);
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    loop {
        term *= half_sq / (k * k);
        sum += term;
        if term < sum * 1e-17 {
            break;
        }
        k += 1.0;
    }
    sum
}
