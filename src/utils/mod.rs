//! Common utility functions
//!
//! - Coordinate conversions and float helpers shared by the renderers
//! - Input contract validation used by the feature assembler

pub mod conversion;
pub mod validation;

pub use conversion::{deg_to_rad, linspace, pol2cart, spacing};

pub use validation::{
    validate_activation_shape,
    validate_equal_lengths,
    validate_pct_data,
    validate_sample_rate,
    validate_subset,
};
