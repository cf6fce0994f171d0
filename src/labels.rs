// src/labels.rs
//! ICLabel class names and prediction summaries
//!
//! The classifier itself runs outside this crate. Its (C, 7) probability
//! matrix is turned into one label per component here.

use crate::config::constants::labels::{METHOD_ICLABEL, N_CLASSES};
use crate::error::{FeatureError, FeatureResult};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ICLabel output classes, in model column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcLabelClass {
    /// Cortical source
    Brain,
    /// Muscle artifact
    MuscleArtifact,
    /// Eye blinks and movements
    EyeBlink,
    /// Cardiac artifact
    HeartBeat,
    /// Mains interference
    LineNoise,
    /// Single bad channel
    ChannelNoise,
    /// None of the above
    Other,
}

impl IcLabelClass {
    /// Every class, indexed by model column
    pub const ALL: [IcLabelClass; N_CLASSES] = [
        IcLabelClass::Brain,
        IcLabelClass::MuscleArtifact,
        IcLabelClass::EyeBlink,
        IcLabelClass::HeartBeat,
        IcLabelClass::LineNoise,
        IcLabelClass::ChannelNoise,
        IcLabelClass::Other,
    ];

    /// Class for a model output column
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Model output column of this class
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable class name
    pub fn as_str(self) -> &'static str {
        match self {
            IcLabelClass::Brain => "brain",
            IcLabelClass::MuscleArtifact => "muscle artifact",
            IcLabelClass::EyeBlink => "eye blink",
            IcLabelClass::HeartBeat => "heart beat",
            IcLabelClass::LineNoise => "line noise",
            IcLabelClass::ChannelNoise => "channel noise",
            IcLabelClass::Other => "other",
        }
    }
}

impl fmt::Display for IcLabelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component labeling method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelingMethod {
    /// The pretrained ICLabel network, parsed from `"iclabel"`
    IcLabel,
}

impl FromStr for LabelingMethod {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            METHOD_ICLABEL => Ok(LabelingMethod::IcLabel),
            other => Err(FeatureError::mismatch(
                "method",
                "unsupported labeling method",
                format!("'{}'", METHOD_ICLABEL),
                format!("'{}'", other),
            )),
        }
    }
}

/// Most probable class of one component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentLabel {
    /// Row index in the probability matrix
    pub component: usize,
    /// Most probable class
    pub label: IcLabelClass,
    /// Probability of `label`
    pub probability: f64,
}

/// Argmax label and its probability for every row of `proba`.
///
/// Ties go to the lowest class index.
pub fn summarize_predictions(proba: ArrayView2<'_, f64>, n_components: usize) -> FeatureResult<Vec<ComponentLabel>> {
    let (rows, cols) = proba.dim();
    if rows != n_components {
        return Err(FeatureError::mismatch("proba", "row count must equal component count", n_components, rows));
    }
    if cols != N_CLASSES {
        return Err(FeatureError::mismatch("proba", "one column per ICLabel class", N_CLASSES, cols));
    }
    if proba.iter().any(|p| !p.is_finite()) {
        return Err(FeatureError::invalid_input("proba", "probabilities must be finite"));
    }

    Ok(proba
        .outer_iter()
        .enumerate()
        .map(|(component, row)| {
            let (best, probability) = row
                .iter()
                .copied()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });
            ComponentLabel {
                component,
                label: IcLabelClass::ALL[best],
                probability,
            }
        })
        .collect())
}
