//! Probability → risk tier, and the whole-batch scoring call.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ScoreError};
use crate::features::matrix::FeatureMatrix;
use crate::model::Classifier;
use crate::models::{ChurnLabel, PredictionResult, RiskTier};

/// Tier cut-offs: `p < medium` is Low, `p < high` is Medium, otherwise High.
///
/// A business policy, not a property of the model; defaults are 0.30 / 0.60.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_high")]
    pub high: f64,
}

fn default_medium() -> f64 {
    0.30
}

fn default_high() -> f64 {
    0.60
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: default_medium(),
            high: default_high(),
        }
    }
}

impl RiskThresholds {
    pub fn new(medium: f64, high: f64) -> Result<Self, ConfigError> {
        let t = Self { medium, high };
        t.validate()?;
        Ok(t)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.medium.is_finite()
            && self.high.is_finite()
            && 0.0 <= self.medium
            && self.medium <= self.high
            && self.high <= 1.0;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidThresholds {
                medium: self.medium,
                high: self.high,
            })
        }
    }

    pub fn tier(&self, probability: f64) -> RiskTier {
        if probability < self.medium {
            RiskTier::Low
        } else if probability < self.high {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }
}

/// Score every row of `matrix`. Fails as a whole: a classifier error or a
/// malformed classifier output yields no results at all.
pub fn score(
    matrix: &FeatureMatrix,
    classifier: &dyn Classifier,
    thresholds: &RiskThresholds,
) -> Result<Vec<PredictionResult>, ScoreError> {
    let rows = matrix.n_rows();
    if rows == 0 {
        return Ok(Vec::new());
    }

    let labels = classifier.predict_label(matrix)?;
    let probabilities = classifier.predict_probability(matrix)?;

    if labels.len() != rows {
        return Err(ScoreError::LengthMismatch { what: "labels", expected: rows, actual: labels.len() });
    }
    if probabilities.len() != rows {
        return Err(ScoreError::LengthMismatch {
            what: "probabilities",
            expected: rows,
            actual: probabilities.len(),
        });
    }

    let results = labels
        .iter()
        .zip(&probabilities)
        .enumerate()
        .map(|(row, (&code, &p))| {
            if !(0.0..=1.0).contains(&p) {
                return Err(ScoreError::InvalidProbability { row, value: p });
            }
            let label = ChurnLabel::from_code(code).ok_or(ScoreError::InvalidLabel { row, value: code })?;
            Ok(PredictionResult {
                label,
                probability: p,
                tier: thresholds.tier(p),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows, "scored batch");
    Ok(results)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use crate::model::check_shape;

    /// Returns fixed outputs, ignoring the matrix contents.
    pub(crate) struct FixedClassifier {
        pub n_features: usize,
        pub probabilities: Vec<f64>,
        pub labels: Vec<u8>,
    }

    impl Classifier for FixedClassifier {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError> {
            check_shape(self.n_features, matrix)?;
            Ok(self.probabilities.clone())
        }

        fn predict_label(&self, matrix: &FeatureMatrix) -> Result<Vec<u8>, ClassifierError> {
            check_shape(self.n_features, matrix)?;
            Ok(self.labels.clone())
        }
    }

    fn matrix(rows: usize) -> FeatureMatrix {
        FeatureMatrix::from_rows(1, &vec![vec![0.0]; rows]).unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(t.tier(0.0), RiskTier::Low);
        assert_eq!(t.tier(0.2999), RiskTier::Low);
        assert_eq!(t.tier(0.30), RiskTier::Medium);
        assert_eq!(t.tier(0.5999), RiskTier::Medium);
        assert_eq!(t.tier(0.60), RiskTier::High);
        assert_eq!(t.tier(1.0), RiskTier::High);
    }

    #[test]
    fn test_overridden_thresholds() {
        let t = RiskThresholds::new(0.2, 0.8).unwrap();
        assert_eq!(t.tier(0.25), RiskTier::Medium);
        assert_eq!(t.tier(0.75), RiskTier::Medium);
        assert_eq!(t.tier(0.8), RiskTier::High);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(RiskThresholds::new(0.7, 0.6).is_err());
        assert!(RiskThresholds::new(-0.1, 0.6).is_err());
        assert!(RiskThresholds::new(0.3, 1.5).is_err());
        assert!(RiskThresholds::new(f64::NAN, 0.6).is_err());
        assert!(RiskThresholds::new(0.5, 0.5).is_ok());
    }

    #[test]
    fn test_label_and_tier_are_independent() {
        let clf = FixedClassifier {
            n_features: 1,
            probabilities: vec![0.10, 0.45, 0.45, 0.85],
            labels: vec![0, 0, 1, 1],
        };
        let out = score(&matrix(4), &clf, &RiskThresholds::default()).unwrap();
        let got: Vec<(ChurnLabel, RiskTier)> = out.iter().map(|r| (r.label, r.tier)).collect();
        assert_eq!(
            got,
            vec![
                (ChurnLabel::Stay, RiskTier::Low),
                (ChurnLabel::Stay, RiskTier::Medium),
                (ChurnLabel::Churn, RiskTier::Medium),
                (ChurnLabel::Churn, RiskTier::High),
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let clf = FixedClassifier { n_features: 1, probabilities: vec![0.42], labels: vec![0] };
        let t = RiskThresholds::default();
        assert_eq!(score(&matrix(1), &clf, &t).unwrap(), score(&matrix(1), &clf, &t).unwrap());
    }

    #[test]
    fn test_empty_matrix_skips_classifier() {
        // Would fail the shape check if it were called.
        let clf = FixedClassifier { n_features: 9, probabilities: vec![], labels: vec![] };
        let out = score(&FeatureMatrix::with_columns(1), &clf, &RiskThresholds::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_shape_failure_fails_whole_call() {
        let clf = FixedClassifier { n_features: 3, probabilities: vec![0.1, 0.2], labels: vec![0, 0] };
        let err = score(&matrix(2), &clf, &RiskThresholds::default()).unwrap_err();
        assert_eq!(
            err,
            ScoreError::Classifier(ClassifierError::ShapeMismatch { expected: 3, actual: 1 })
        );
    }

    #[test]
    fn test_malformed_outputs_fail_whole_call() {
        let t = RiskThresholds::default();
        let short = FixedClassifier { n_features: 1, probabilities: vec![0.1], labels: vec![0, 0] };
        assert!(matches!(score(&matrix(2), &short, &t), Err(ScoreError::LengthMismatch { .. })));

        let nan = FixedClassifier { n_features: 1, probabilities: vec![0.1, f64::NAN], labels: vec![0, 0] };
        assert!(matches!(score(&matrix(2), &nan, &t), Err(ScoreError::InvalidProbability { row: 1, .. })));

        let label = FixedClassifier { n_features: 1, probabilities: vec![0.1, 0.2], labels: vec![0, 2] };
        assert!(matches!(score(&matrix(2), &label, &t), Err(ScoreError::InvalidLabel { row: 1, value: 2 })));
    }
}
