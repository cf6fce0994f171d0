// src/processing/interpolation/biharmonic.rs
//! Biharmonic spline interpolation (MATLAB `griddata` "v4" method)
//!
//! Reference: D. T. Sandwell, "Biharmonic spline interpolation of GEOS-3 and
//! SEASAT altimeter data", Geophysical Research Letters 14(2), 1987.
//!
//! The surface is a sum of Green's functions `g(r) = r^2 (ln r - 1)` centred
//! on the samples. Weights come from the N x N system `G w = v`, solved by
//! SVD least squares so collinear or clustered electrodes do not abort the
//! render.

use super::merge::merge_points_2d;
use crate::config::constants::topography::COINCIDENT_DISTANCE;
use crate::error::{FeatureError, FeatureResult, ProcessingStage};
use crate::utils::validation::validate_equal_lengths;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, ArrayView2, Zip};
use rustfft::num_complex::Complex64;
use tracing::{trace, warn};

const SVD_MAX_ITERATIONS: usize = 10_000;

/// Biharmonic Green's function in two dimensions
#[inline]
pub fn green(distance: f64) -> f64 {
    distance * distance * (distance.ln() - 1.0)
}

/// A fitted biharmonic spline
#[derive(Debug, Clone)]
pub struct BiharmonicSpline {
    centers: Vec<Complex64>,
    weights: Vec<f64>,
}

impl BiharmonicSpline {
    /// Fit a spline through the (already merged) samples
    pub fn fit(x: &[f64], y: &[f64], v: &[f64]) -> FeatureResult<Self> {
        validate_equal_lengths("spline y", x.len(), y.len())?;
        validate_equal_lengths("spline values", x.len(), v.len())?;
        if x.is_empty() {
            return Err(FeatureError::invalid_input("spline samples", "at least one sample is required"));
        }
        if x.iter().chain(y).chain(v).any(|value| !value.is_finite()) {
            return Err(FeatureError::invalid_input("spline samples", "coordinates and values must be finite"));
        }

        let centers: Vec<Complex64> = x.iter().zip(y).map(|(&xi, &yi)| Complex64::new(xi, yi)).collect();
        let n = centers.len();

        let gram = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.0
            } else {
                green((centers[i] - centers[j]).norm())
            }
        });
        let rhs = DVector::from_column_slice(v);

        let svd = gram
            .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
            .ok_or_else(|| FeatureError::numerical(ProcessingStage::Interpolation, "SVD did not converge"))?;

        let sigma_max = svd.singular_values.max();
        let cutoff = sigma_max * f64::EPSILON * n as f64;
        let rank = svd.rank(cutoff);
        if rank < n {
            warn!(rank, samples = n, "rank-deficient spline system, using least-squares weights");
        }

        let weights = svd
            .solve(&rhs, cutoff)
            .map_err(|reason| FeatureError::numerical(ProcessingStage::Interpolation, reason))?;

        trace!(samples = n, rank, "fitted biharmonic spline");
        Ok(Self {
            centers,
            weights: weights.iter().copied().collect(),
        })
    }

    /// Evaluate the spline at one point
    pub fn evaluate(&self, xq: f64, yq: f64) -> f64 {
        let query = Complex64::new(xq, yq);
        self.centers
            .iter()
            .zip(&self.weights)
            .map(|(&center, &weight)| {
                let distance = (query - center).norm();
                // Green's function value at zero
                if distance <= COINCIDENT_DISTANCE {
                    0.0
                } else {
                    green(distance) * weight
                }
            })
            .sum()
    }

    /// Number of knots
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// True when fitted on no knots
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Solved Green's function weights, one per knot
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Merge near-duplicate samples, fit a biharmonic spline, and evaluate it on
/// the query grid. The result has the shape of `xq`.
pub fn gdatav4(
    x: &[f64],
    y: &[f64],
    v: &[f64],
    xq: ArrayView2<'_, f64>,
    yq: ArrayView2<'_, f64>,
) -> FeatureResult<Array2<f64>> {
    if xq.dim() != yq.dim() {
        return Err(FeatureError::mismatch(
            "query grid",
            "xq and yq shapes differ",
            format!("{:?}", xq.dim()),
            format!("{:?}", yq.dim()),
        ));
    }
    validate_equal_lengths("interpolation y", x.len(), y.len())?;
    validate_equal_lengths("interpolation values", x.len(), v.len())?;

    let (mx, my, mv) = merge_points_2d(x, y, v);
    let spline = BiharmonicSpline::fit(&mx, &my, &mv)?;

    let mut vq = Array2::<f64>::zeros(xq.dim());
    Zip::from(&mut vq)
        .and(&xq)
        .and(&yq)
        .for_each(|out, &qx, &qy| *out = spline.evaluate(qx, qy));
    Ok(vq)
}
