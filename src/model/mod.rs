//! The classifier capability and the model formats that implement it.
//!
//! Scoring depends only on [`Classifier`]; any model that can produce a
//! positive-class probability and a 0/1 label per row can be substituted.
//! The JSON artifact names its format in a `"kind"` field:
//!
//! - [`forest`]: a random forest of array-encoded decision trees.
//! - [`logistic`]: a logistic regression.

use serde::Deserialize;

use crate::error::ClassifierError;
use crate::features::matrix::FeatureMatrix;

pub mod forest;
pub mod logistic;

pub trait Classifier: Send + Sync {
    /// Number of columns every input matrix must have.
    fn n_features(&self) -> usize;

    /// Probability of the positive ("will churn") class, one per row.
    fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError>;

    /// Binary decision (0 = stay, 1 = churn), one per row.
    fn predict_label(&self, matrix: &FeatureMatrix) -> Result<Vec<u8>, ClassifierError>;

    /// Per-feature importance, aligned with the feature list, if the model has one.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Reject a matrix whose width differs from what the model was fitted on.
pub(crate) fn check_shape(expected: usize, matrix: &FeatureMatrix) -> Result<(), ClassifierError> {
    if matrix.n_cols() != expected {
        return Err(ClassifierError::ShapeMismatch {
            expected,
            actual: matrix.n_cols(),
        });
    }
    Ok(())
}

/// The on-disk model artifact.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(forest::RandomForest),
    LogisticRegression(logistic::LogisticRegression),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::RandomForest(_) => "random_forest",
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
        }
    }

    /// Validate the model's structure and hand it out as a [`Classifier`].
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, String> {
        match self {
            ModelArtifact::RandomForest(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            ModelArtifact::LogisticRegression(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}
