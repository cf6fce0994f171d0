//! Coordinate conversion utilities
//!
//! Electrode positions arrive as polar coordinates (angle in degrees, radius
//! in head units). Interpolation works in Cartesian space.

/// Convert degrees to radians, element-wise
pub fn deg_to_rad(degrees: &[f64]) -> Vec<f64> {
    degrees.iter().map(|d| d.to_radians()).collect()
}

/// Convert polar coordinates to Cartesian, element-wise.
///
/// `theta` is in radians. NaNs propagate; slices must have equal length and
/// the output is truncated to the shorter one otherwise.
pub fn pol2cart(theta: &[f64], rho: &[f64]) -> (Vec<f64>, Vec<f64>) {
    theta
        .iter()
        .zip(rho)
        .map(|(&t, &r)| (r * t.cos(), r * t.sin()))
        .unzip()
}

/// Distance from `x` to the next larger representable `f64` (numpy `spacing`)
pub fn spacing(x: f64) -> f64 {
    if !x.is_finite() {
        return f64::NAN;
    }
    let magnitude = x.abs();
    let next = if magnitude == 0.0 {
        f64::from_bits(1)
    } else {
        f64::from_bits(magnitude.to_bits() + 1)
    };
    let step = next - magnitude;
    if x < 0.0 {
        -step
    } else {
        step
    }
}

/// Evenly spaced samples over a closed interval
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
