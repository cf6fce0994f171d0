// src/processing/interpolation/merge.rs
//! Merging of near-coincident scattered points
//!
//! Two electrodes projected onto (almost) the same scalp location would make
//! the spline system singular. Points whose coordinates agree within a
//! per-dimension tolerance are collapsed into one exemplar before fitting.

use crate::utils::conversion::spacing;
use ndarray::{Array2, ArrayView2, Axis};
use rustfft::num_complex::Complex64;

/// How a group of similar points is collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Per-dimension mean of the group
    #[default]
    Average,
    /// The group member that sorts first
    First,
}

/// Collapse rows of `data` that are within `tolerances` of each other.
///
/// Rows are sorted by their first column, then scanned once. Each row not yet
/// merged collects every remaining row whose absolute difference is strictly
/// below the tolerance in every dimension, and one exemplar is emitted per
/// group. Output rows are in discovery order. Dimensions without a tolerance
/// entry never block merging.
pub fn merge_similar_points(
    data: ArrayView2<'_, f64>,
    tolerances: &[f64],
    mode: MergeMode,
) -> Array2<f64> {
    let (n_points, n_dims) = data.dim();

    let mut order: Vec<usize> = (0..n_points).collect();
    order.sort_by(|&a, &b| data[[a, 0]].total_cmp(&data[[b, 0]]));
    let sorted = data.select(Axis(0), &order);

    let within = |a: usize, b: usize| {
        (0..n_dims).all(|d| {
            let tol = tolerances.get(d).copied().unwrap_or(f64::INFINITY);
            (sorted[[a, d]] - sorted[[b, d]]).abs() < tol
        })
    };

    let mut merged = vec![false; n_points];
    let mut exemplars: Vec<f64> = Vec::with_capacity(n_points * n_dims);
    let mut n_exemplars = 0;

    for anchor in 0..n_points {
        if merged[anchor] {
            continue;
        }

        let group: Vec<usize> = (0..n_points)
            .filter(|&q| q == anchor || (!merged[q] && within(anchor, q)))
            .collect();
        for &q in &group {
            merged[q] = true;
        }

        match mode {
            MergeMode::Average => {
                let count = group.len() as f64;
                for d in 0..n_dims {
                    let sum: f64 = group.iter().map(|&q| sorted[[q, d]]).sum();
                    exemplars.push(sum / count);
                }
            }
            MergeMode::First => {
                exemplars.extend(sorted.row(group[0]).iter().copied());
            }
        }
        n_exemplars += 1;
    }

    // Shape is consistent by construction
    Array2::from_shape_vec((n_exemplars, n_dims), exemplars)
        .unwrap_or_else(|_| Array2::zeros((0, n_dims)))
}

/// Spatial merge tolerance for one axis: `spacing(0.5 * range)^(1/3)`
pub fn merge_tolerance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    spacing(0.5 * (max - min)).powf(1.0 / 3.0)
}

/// Average the values of (x, y) points that coincide within tolerance
pub fn merge_points_2d(x: &[f64], y: &[f64], v: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = x.len().min(y.len()).min(v.len());
    let tolerances = [merge_tolerance(&y[..n]), merge_tolerance(&x[..n]), f64::INFINITY];

    let mut data = Array2::<f64>::zeros((n, 3));
    for i in 0..n {
        data[[i, 0]] = y[i];
        data[[i, 1]] = x[i];
        data[[i, 2]] = v[i];
    }

    let yxv = merge_similar_points(data.view(), &tolerances, MergeMode::Average);
    (
        yxv.column(1).to_vec(),
        yxv.column(0).to_vec(),
        yxv.column(2).to_vec(),
    )
}

/// Complex-valued variant: real and imaginary parts are merged as separate dimensions
pub fn merge_points_2d_complex(
    x: &[f64],
    y: &[f64],
    v: &[Complex64],
) -> (Vec<f64>, Vec<f64>, Vec<Complex64>) {
    let n = x.len().min(y.len()).min(v.len());
    let tolerances = [
        merge_tolerance(&y[..n]),
        merge_tolerance(&x[..n]),
        f64::INFINITY,
        f64::INFINITY,
    ];

    let mut data = Array2::<f64>::zeros((n, 4));
    for i in 0..n {
        data[[i, 0]] = y[i];
        data[[i, 1]] = x[i];
        data[[i, 2]] = v[i].re;
        data[[i, 3]] = v[i].im;
    }

    let yxv = merge_similar_points(data.view(), &tolerances, MergeMode::Average);
    let values = yxv
        .rows()
        .into_iter()
        .map(|row| Complex64::new(row[2], row[3]))
        .collect();
    (yxv.column(1).to_vec(), yxv.column(0).to_vec(), values)
}
