use serde::Deserialize;

use crate::error::ClassifierError;
use crate::features::matrix::FeatureMatrix;
use crate::model::{check_shape, Classifier};

/// `p = 1 / (1 + e^-(w·x + b))`
#[derive(Debug, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("model has no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err("model has non-finite coefficients".to_string());
        }
        Ok(())
    }

    fn margin(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError> {
        check_shape(self.coefficients.len(), matrix)?;
        Ok(matrix
            .rows()
            .map(|row| 1.0 / (1.0 + (-self.margin(row)).exp()))
            .collect())
    }

    fn predict_label(&self, matrix: &FeatureMatrix) -> Result<Vec<u8>, ClassifierError> {
        check_shape(self.coefficients.len(), matrix)?;
        Ok(matrix.rows().map(|row| u8::from(self.margin(row) > 0.0)).collect())
    }

    /// Absolute coefficients scaled to sum 1.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        let total: f64 = self.coefficients.iter().map(|w| w.abs()).sum();
        if total == 0.0 {
            return None;
        }
        Some(self.coefficients.iter().map(|w| w.abs() / total).collect())
    }
}
