//! Diagnostic class labels and the positional order of model outputs.
//!
//! A classifier emits a bare vector of probabilities. The only thing that ties
//! position `i` of that vector to a disease name is the [`LabelOrder`] the
//! model was exported with, so the order is carried explicitly instead of
//! being derived from the enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of diagnostic classes the classifier distinguishes.
pub const NUM_CLASSES: usize = 4;

/// One of the four fundus diagnosis classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    Cataract,
    #[serde(rename = "Diabetic Retinopathy")]
    DiabeticRetinopathy,
    Glaucoma,
    Normal,
}

impl ClassLabel {
    /// All labels in training-time order.
    pub const ALL: [ClassLabel; NUM_CLASSES] = [
        Self::Cataract,
        Self::DiabeticRetinopathy,
        Self::Glaucoma,
        Self::Normal,
    ];

    /// Human-readable name, as used in the JSON contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cataract => "Cataract",
            Self::DiabeticRetinopathy => "Diabetic Retinopathy",
            Self::Glaucoma => "Glaucoma",
            Self::Normal => "Normal",
        }
    }

    /// URL-friendly name (`diabetic-retinopathy`).
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Cataract => "cataract",
            Self::DiabeticRetinopathy => "diabetic-retinopathy",
            Self::Glaucoma => "glaucoma",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = LabelError;

    /// Accepts the display name or the slug, case-insensitively. Underscores
    /// and spaces are treated like hyphens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '_' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL
            .into_iter()
            .find(|label| label.slug() == key)
            .ok_or_else(|| LabelError::Unknown(s.trim().to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("unknown class label: {0:?}")]
    Unknown(String),
    #[error("label order must name {expected} classes, got {got}")]
    WrongCount { expected: usize, got: usize },
    #[error("label {0} appears more than once in label order")]
    Duplicate(ClassLabel),
}

/// Positional alignment between a model's output vector and [`ClassLabel`]s.
///
/// Always a permutation of [`ClassLabel::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOrder([ClassLabel; NUM_CLASSES]);

impl Default for LabelOrder {
    fn default() -> Self {
        Self(ClassLabel::ALL)
    }
}

impl LabelOrder {
    /// Build an order from an explicit list of labels.
    pub fn new(labels: &[ClassLabel]) -> Result<Self, LabelError> {
        if labels.len() != NUM_CLASSES {
            return Err(LabelError::WrongCount {
                expected: NUM_CLASSES,
                got: labels.len(),
            });
        }
        let mut order = ClassLabel::ALL;
        for (i, &label) in labels.iter().enumerate() {
            if labels[..i].contains(&label) {
                return Err(LabelError::Duplicate(label));
            }
            order[i] = label;
        }
        Ok(Self(order))
    }

    /// Parse a comma-separated list such as
    /// `"Cataract,Diabetic Retinopathy,Glaucoma,Normal"`.
    pub fn parse(list: &str) -> Result<Self, LabelError> {
        let labels = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(ClassLabel::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&labels)
    }

    /// Label at output position `index`.
    pub fn get(&self, index: usize) -> Option<ClassLabel> {
        self.0.get(index).copied()
    }

    /// Output position of `label`.
    pub fn position(&self, label: ClassLabel) -> usize {
        // A LabelOrder is a permutation, so every label is present.
        self.0.iter().position(|&l| l == label).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = ClassLabel> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[ClassLabel] {
        &self.0
    }
}

impl FromStr for LabelOrder {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LabelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(label.as_str())?;
        }
        Ok(())
    }
}
