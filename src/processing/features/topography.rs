//! Scalp topography rendering
//!
//! One component's column of the inverse-mixing matrix is a set of electrode
//! weights. Electrodes are projected onto a flat disk, the weights are
//! interpolated onto a 32x32 grid, and everything outside the head radius is
//! masked out.

use crate::config::constants::topography::{GRID_SCALE, MAX_PLOT_RADIUS, PLOT_RADIUS_FACTOR, RMAX};
use crate::error::{FeatureError, FeatureResult};
use crate::processing::interpolation::gdatav4;
use crate::utils::conversion::{deg_to_rad, linspace, pol2cart};
use crate::utils::validation::validate_equal_lengths;
use ndarray::{Array2, ArrayView1, ArrayView2};
use tracing::warn;

/// Electrode layout paired with the inverse-mixing matrix
#[derive(Debug, Clone, Copy)]
pub struct MixingGeometry<'a> {
    /// Spatial patterns, shape (n_channels, n_components)
    pub inverse_mixing: ArrayView2<'a, f64>,
    /// Polar angle of each channel in degrees; NaN marks a channel without a location
    pub theta: &'a [f64],
    /// Polar radius of each channel
    pub rho: &'a [f64],
}

impl<'a> MixingGeometry<'a> {
    /// Fails when `theta` or `rho` length differs from the channel count
    pub fn new(inverse_mixing: ArrayView2<'a, f64>, theta: &'a [f64], rho: &'a [f64]) -> FeatureResult<Self> {
        let n_channels = inverse_mixing.nrows();
        validate_equal_lengths("theta", n_channels, theta.len())?;
        validate_equal_lengths("rho", n_channels, rho.len())?;
        Ok(Self {
            inverse_mixing,
            theta,
            rho,
        })
    }

    /// Rows of the inverse mixing matrix
    pub fn n_channels(&self) -> usize {
        self.inverse_mixing.nrows()
    }

    /// Columns of the inverse mixing matrix
    pub fn n_components(&self) -> usize {
        self.inverse_mixing.ncols()
    }

    /// Channels with a defined angle
    pub fn plot_channels(&self) -> Vec<usize> {
        self.theta
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_nan())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Interpolated scalp map for one component, NaN outside the head.
///
/// `weights` has one entry per channel. The image is indexed `[i, j]` with
/// `i` along x and `j` along y, both over `linspace(-0.5, 0.5, 32)`.
pub fn topoplot(
    weights: ArrayView1<'_, f64>,
    theta_deg: &[f64],
    rho: &[f64],
    plot_channels: &[usize],
) -> FeatureResult<Array2<f64>> {
    validate_equal_lengths("theta", weights.len(), theta_deg.len())?;
    validate_equal_lengths("rho", weights.len(), rho.len())?;
    if plot_channels.is_empty() {
        return Err(FeatureError::invalid_input("plot channels", "no channel has a defined location"));
    }
    if let Some(&bad) = plot_channels.iter().find(|&&ch| ch >= weights.len()) {
        return Err(FeatureError::mismatch("plot channels", "channel index out of range", format!("< {}", weights.len()), bad));
    }

    let theta: Vec<f64> = plot_channels.iter().map(|&ch| theta_deg[ch]).collect();
    let radius: Vec<f64> = plot_channels.iter().map(|&ch| rho[ch]).collect();
    let values: Vec<f64> = plot_channels.iter().map(|&ch| weights[ch]).collect();
    let (mut x, mut y) = pol2cart(&deg_to_rad(&theta), &radius);

    // Squeeze electrode positions into the RMAX disk
    let plot_radius = MAX_PLOT_RADIUS.min(radius.iter().copied().fold(f64::NEG_INFINITY, f64::max) * PLOT_RADIUS_FACTOR);
    let squeeze = if plot_radius > 0.0 && plot_radius.is_finite() {
        RMAX / plot_radius
    } else {
        1.0
    };
    x.iter_mut().for_each(|v| *v *= squeeze);
    y.iter_mut().for_each(|v| *v *= squeeze);

    let grid = linspace(-RMAX, RMAX, GRID_SCALE);
    let grid_y = Array2::from_shape_fn((GRID_SCALE, GRID_SCALE), |(_, j)| grid[j]);
    let grid_x = Array2::from_shape_fn((GRID_SCALE, GRID_SCALE), |(i, _)| grid[i]);

    // Coordinates are passed (y, x) so near-duplicate merging sorts along x
    let mut image = gdatav4(&y, &x, &values, grid_y.view(), grid_x.view())?;

    for ((i, j), cell) in image.indexed_iter_mut() {
        if grid[i].hypot(grid[j]) > RMAX {
            *cell = f64::NAN;
        }
    }

    Ok(image)
}

/// Replace masked cells with zero and scale into [-1, 1].
///
/// A map that is zero everywhere is returned as is.
pub fn normalize_topography(mut image: Array2<f64>) -> Array2<f64> {
    image.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
    let max_abs = image.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if max_abs > 0.0 && max_abs.is_finite() {
        image.mapv_inplace(|v| v / max_abs);
    } else {
        warn!("constant topography, leaving map at zero");
        image.fill(0.0);
    }
    image
}

/// Normalized topography for component `component` of `geometry`
pub fn render_topography(geometry: &MixingGeometry<'_>, component: usize, plot_channels: &[usize]) -> FeatureResult<Array2<f64>> {
    if component >= geometry.n_components() {
        return Err(FeatureError::mismatch(
            "component",
            "component index out of range",
            format!("< {}", geometry.n_components()),
            component,
        ));
    }
    let weights = geometry.inverse_mixing.column(component);
    let image = topoplot(weights, geometry.theta, geometry.rho, plot_channels)?;
    Ok(normalize_topography(image))
}
