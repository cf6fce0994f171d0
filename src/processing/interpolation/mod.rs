//! Scattered-data interpolation for scalp maps

pub mod biharmonic;
pub mod merge;

pub use biharmonic::{gdatav4, green, BiharmonicSpline};
pub use merge::{merge_points_2d, merge_points_2d_complex, merge_similar_points, merge_tolerance, MergeMode};
