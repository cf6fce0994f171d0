// src/processing/resample.rs
//! Rational-rate polyphase resampling
//!
//! Upsample by `up`, apply a Kaiser-windowed low-pass FIR, downsample by
//! `down`. The filter design, padding and output trimming reproduce the
//! conventions the classifier's autocorrelation features were computed with,
//! so edge samples match and not only the steady state.

use crate::config::constants::resample::{HALF_LEN_FACTOR, KAISER_BETA};
use crate::error::{FeatureError, FeatureResult};
use crate::processing::windowing::{generate_window, WindowType};
use std::f64::consts::PI;

/// Resample `x` by the rational factor `up / down`.
///
/// Output length is `ceil(x.len() * up / down)`.
pub fn resample_poly(x: &[f64], up: usize, down: usize) -> FeatureResult<Vec<f64>> {
    if up == 0 || down == 0 {
        return Err(FeatureError::mismatch(
            "resample_poly",
            "rate factors must be positive",
            "up > 0 and down > 0",
            format!("up = {}, down = {}", up, down),
        ));
    }

    let g = gcd(up, down);
    let (up, down) = (up / g, down / g);

    if up == 1 && down == 1 {
        return Ok(x.to_vec());
    }
    if x.is_empty() {
        return Ok(Vec::new());
    }

    let n_in = x.len();
    let n_out = (n_in * up).div_ceil(down);

    let max_rate = up.max(down);
    let half_len = HALF_LEN_FACTOR * max_rate;
    let mut taps = firwin(2 * half_len + 1, 1.0 / max_rate as f64, WindowType::Kaiser { beta: KAISER_BETA });
    for tap in taps.iter_mut() {
        *tap *= up as f64;
    }

    // Zero-pad the filter so the output is aligned with the input
    let n_pre_pad = down - half_len % down;
    let n_pre_remove = (half_len + n_pre_pad) / down;
    let mut n_post_pad = 0;
    while output_len(taps.len() + n_pre_pad + n_post_pad, n_in, up, down) < n_out + n_pre_remove {
        n_post_pad += 1;
    }

    let mut padded = vec![0.0; n_pre_pad];
    padded.extend_from_slice(&taps);
    padded.resize(padded.len() + n_post_pad, 0.0);

    let filtered = upfirdn(&padded, x, up, down);
    Ok(filtered[n_pre_remove..n_pre_remove + n_out].to_vec())
}

/// Upsample, FIR filter, downsample in one pass.
///
/// Equivalent to inserting `up - 1` zeros between input samples, convolving
/// fully with `taps`, and keeping every `down`-th output starting at 0.
pub fn upfirdn(taps: &[f64], x: &[f64], up: usize, down: usize) -> Vec<f64> {
    if taps.is_empty() || x.is_empty() {
        return Vec::new();
    }

    let n_taps = taps.len();
    let len = output_len(n_taps, x.len(), up, down);
    let mut y = vec![0.0; len];

    for (k, out) in y.iter_mut().enumerate() {
        let n = k * down;
        // Input j contributes when 0 <= n - j*up < n_taps
        let j_min = if n >= n_taps { (n - n_taps) / up + 1 } else { 0 };
        let j_max = (n / up).min(x.len() - 1);
        let mut acc = 0.0;
        for j in j_min..=j_max {
            acc += x[j] * taps[n - j * up];
        }
        *out = acc;
    }

    y
}

/// Windowed-sinc low-pass FIR with unit DC gain.
///
/// `cutoff` is relative to the Nyquist frequency (0 < cutoff <= 1).
pub fn firwin(num_taps: usize, cutoff: f64, window: WindowType) -> Vec<f64> {
    let alpha = 0.5 * (num_taps as f64 - 1.0);
    let win = generate_window(window, num_taps);

    let mut taps: Vec<f64> = win
        .iter()
        .enumerate()
        .map(|(i, w)| cutoff * sinc(cutoff * (i as f64 - alpha)) * w)
        .collect();

    let dc_gain: f64 = taps.iter().sum();
    if dc_gain != 0.0 {
        for tap in taps.iter_mut() {
            *tap /= dc_gain;
        }
    }
    taps
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn output_len(len_taps: usize, in_len: usize, up: usize, down: usize) -> usize {
    ((in_len - 1) * up + len_taps - 1) / down + 1
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_when_rates_equal() {
        let x = vec![1.0, -2.0, 3.5, 0.25];
        assert_eq!(resample_poly(&x, 100, 100).unwrap(), x);
        assert_eq!(resample_poly(&x, 1, 1).unwrap(), x);
    }

    #[test]
    fn test_output_length() {
        let x = vec![0.5; 129];
        assert_eq!(resample_poly(&x, 100, 128).unwrap().len(), 101);

        let x = vec![0.5; 257];
        assert_eq!(resample_poly(&x, 100, 256).unwrap().len(), 101);

        let x = vec![0.5; 10];
        assert_eq!(resample_poly(&x, 3, 1).unwrap().len(), 30);
    }

    #[test]
    fn test_constant_signal_preserved_in_interior() {
        let x = vec![1.0; 501];
        let y = resample_poly(&x, 100, 250).unwrap();
        assert_eq!(y.len(), 201);
        // Away from the zero-padded edges a constant passes through unchanged
        for &v in &y[40..160] {
            assert!((v - 1.0).abs() < 1e-2, "interior value {}", v);
        }
    }

    #[test]
    fn test_zero_factor_rejected() {
        assert!(resample_poly(&[1.0], 0, 2).is_err());
        assert!(resample_poly(&[1.0], 2, 0).is_err());
    }

    #[test]
    fn test_firwin_unit_dc_gain_and_symmetry() {
        let taps = firwin(41, 0.25, WindowType::Kaiser { beta: 5.0 });
        let sum: f64 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        for i in 0..20 {
            assert!((taps[i] - taps[40 - i]).abs() < 1e-14);
        }
        assert!(taps[20] > taps[19]);
    }

    #[test]
    fn test_upfirdn_matches_plain_convolution() {
        let taps = [1.0, 2.0, 3.0];
        let x = [1.0, 1.0];
        assert_eq!(upfirdn(&taps, &x, 1, 1), vec![1.0, 3.0, 5.0, 3.0]);
        // Upsampling by two interleaves zeros before filtering
        assert_eq!(upfirdn(&taps, &x, 2, 1), vec![1.0, 2.0, 4.0, 2.0, 3.0]);
        assert_eq!(upfirdn(&taps, &x, 2, 2), vec![1.0, 4.0, 3.0]);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(100, 128), 4);
        assert_eq!(gcd(100, 250), 50);
        assert_eq!(gcd(7, 3), 1);
    }
}
