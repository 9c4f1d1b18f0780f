//! Error taxonomy for artifact loading, input parsing, and scoring.
//!
//! Category- and field-level anomalies are not errors; they surface as
//! [`NormalizeWarning`](crate::features::normalizer::NormalizeWarning)s.

use std::path::PathBuf;

use thiserror::Error;

/// Which of the three trained-model artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Classifier,
    Encoders,
    FeatureSpec,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Classifier => write!(f, "classifier"),
            ArtifactKind::Encoders => write!(f, "encoders"),
            ArtifactKind::FeatureSpec => write!(f, "feature names"),
        }
    }
}

/// Startup-fatal artifact failures. Neither variant is retryable.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{artifact} artifact not found: {}", .path.display())]
    Missing { artifact: ArtifactKind, path: PathBuf },

    #[error("{artifact} artifact at {} is unreadable: {reason}", .path.display())]
    Corrupt {
        artifact: ArtifactKind,
        path: PathBuf,
        reason: String,
    },
}

impl ArtifactError {
    pub fn corrupt(artifact: ArtifactKind, path: &std::path::Path, reason: impl Into<String>) -> Self {
        ArtifactError::Corrupt {
            artifact,
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Failures raised by a [`Classifier`](crate::model::Classifier) implementation.
#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("feature matrix has {actual} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// A whole prediction call failed. Never partially applied.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("classifier returned {actual} {what} for {expected} rows")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("classifier returned probability {value} for row {row}, expected a value in [0, 1]")]
    InvalidProbability { row: usize, value: f64 },

    #[error("classifier returned label {value} for row {row}, expected 0 or 1")]
    InvalidLabel { row: usize, value: u8 },
}

/// Tabular or form input could not be turned into records.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Parse(String),

    #[error("duplicate column '{0}' in CSV header")]
    DuplicateColumn(String),

    #[error("expected FIELD=VALUE, got '{0}'")]
    MalformedField(String),

    #[error("'{0}' is not a model feature")]
    UnknownField(String),

    #[error("'{value}' is not a valid {field}; choose one of: {}", .options.join(", "))]
    UnknownOption {
        field: String,
        value: String,
        options: Vec<String>,
    },

    #[error("{field} must be a number, got '{value}'")]
    NotNumeric { field: String, value: String },

    #[error("{field} = {value} is outside the accepted range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl From<csv::Error> for InputError {
    fn from(err: csv::Error) -> Self {
        InputError::Parse(err.to_string())
    }
}

/// Feature importances could not be paired with the feature list.
#[derive(Debug, Error, PartialEq)]
pub enum InsightError {
    #[error("model reports {importances} importances for {features} features")]
    LengthMismatch { features: usize, importances: usize },
}

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("risk thresholds must satisfy 0 <= medium <= high <= 1 (got medium={medium}, high={high})")]
    InvalidThresholds { medium: f64, high: f64 },

    #[error("form bounds for {field} are inverted: min {min} > max {max}")]
    InvalidBounds { field: String, min: f64, max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_message_names_artifact_and_path() {
        let err = ArtifactError::Missing {
            artifact: ArtifactKind::Encoders,
            path: PathBuf::from("models/encoders.json"),
        };
        assert_eq!(
            err.to_string(),
            "encoders artifact not found: models/encoders.json"
        );
    }

    #[test]
    fn test_unknown_option_lists_choices() {
        let err = InputError::UnknownOption {
            field: "Contract".into(),
            value: "Monthly".into(),
            options: vec!["Month-to-month".into(), "One year".into()],
        };
        assert!(err.to_string().contains("Month-to-month, One year"));
    }

    #[test]
    fn test_score_error_wraps_shape_mismatch() {
        let err: ScoreError = ClassifierError::ShapeMismatch { expected: 3, actual: 2 }.into();
        assert_eq!(
            err.to_string(),
            "classifier failed: feature matrix has 2 columns, model expects 3"
        );
    }
}
