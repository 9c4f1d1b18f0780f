use serde::Serialize;
use tracing::{debug, warn};

use crate::features::encoder::EncoderTable;
use crate::features::matrix::{FeatureMatrix, FeatureSpec};
use crate::models::{Numeric, RawRecord, RawValue};

/// Distinct offending values kept per warning.
const MAX_SAMPLES: usize = 5;

/// A recoverable per-feature anomaly. At most one per feature and kind per batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeWarning {
    /// Values the feature's encoder does not know; encoded as 0.
    UnknownCategory {
        feature: String,
        rows: usize,
        samples: Vec<String>,
    },
    /// Text in a numeric feature that is not a number; read as 0.0.
    NonNumeric {
        feature: String,
        rows: usize,
        samples: Vec<String>,
    },
}

impl std::fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeWarning::UnknownCategory { feature, rows, samples } => write!(
                f,
                "Found unknown values in '{}' ({} row{}: {}). Using default encoding.",
                feature,
                rows,
                if *rows == 1 { "" } else { "s" },
                samples.join(", ")
            ),
            NormalizeWarning::NonNumeric { feature, rows, samples } => write!(
                f,
                "Found non-numeric values in '{}' ({} row{}: {}). Using 0.",
                feature,
                rows,
                if *rows == 1 { "" } else { "s" },
                samples.join(", ")
            ),
        }
    }
}

#[derive(Debug)]
pub struct Normalized {
    pub matrix: FeatureMatrix,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Default)]
struct Tally {
    rows: usize,
    samples: Vec<String>,
}

impl Tally {
    fn record(&mut self, value: String) {
        self.rows += 1;
        if self.samples.len() < MAX_SAMPLES && !self.samples.contains(&value) {
            self.samples.push(value);
        }
    }
}

/// Map `records` into a matrix whose columns follow `spec` exactly.
///
/// Absent columns and empty numeric cells become 0.0 without a warning.
/// Unknown categories become code 0 and non-numeric text becomes 0.0; each
/// produces one warning per feature for the whole batch. A bad value in
/// one feature never affects another feature or another row.
pub fn normalize(records: &[RawRecord], spec: &FeatureSpec, encoders: &EncoderTable) -> Normalized {
    let n = spec.len();
    let mut matrix = FeatureMatrix::with_columns(n);
    let mut unknown: Vec<Tally> = (0..n).map(|_| Tally::default()).collect();
    let mut non_numeric: Vec<Tally> = (0..n).map(|_| Tally::default()).collect();
    let mut row = vec![0.0; n];

    for record in records {
        for (col, feature) in spec.names().iter().enumerate() {
            row[col] = match record.get(feature) {
                None => 0.0,
                Some(value) => match encoders.get(feature) {
                    Some(encoder) => match value.label() {
                        Some(label) => match encoder.encode(&label) {
                            Some(code) => code as f64,
                            None => {
                                unknown[col].record(label);
                                0.0
                            }
                        },
                        None => {
                            unknown[col].record("<empty>".to_string());
                            0.0
                        }
                    },
                    None => numeric_cell(value, &mut non_numeric[col]),
                },
            };
        }
        matrix.push_row(&row);
    }

    let mut warnings = Vec::new();
    for (col, feature) in spec.names().iter().enumerate() {
        let tally = std::mem::take(&mut unknown[col]);
        if tally.rows > 0 {
            warn!(feature = %feature, rows = tally.rows, "unknown category values encoded as 0");
            warnings.push(NormalizeWarning::UnknownCategory {
                feature: feature.clone(),
                rows: tally.rows,
                samples: tally.samples,
            });
        }
        let tally = std::mem::take(&mut non_numeric[col]);
        if tally.rows > 0 {
            warn!(feature = %feature, rows = tally.rows, "non-numeric values read as 0");
            warnings.push(NormalizeWarning::NonNumeric {
                feature: feature.clone(),
                rows: tally.rows,
                samples: tally.samples,
            });
        }
    }

    debug!(rows = matrix.n_rows(), cols = n, warnings = warnings.len(), "normalized records");
    Normalized { matrix, warnings }
}

fn numeric_cell(value: &RawValue, tally: &mut Tally) -> f64 {
    match value.to_numeric() {
        Numeric::Value(x) => x,
        Numeric::Missing => 0.0,
        Numeric::Invalid => {
            tally.record(value.to_string());
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::encoder::LabelEncoder;

    fn spec() -> FeatureSpec {
        FeatureSpec::new(vec![
            "gender".into(),
            "tenure".into(),
            "Contract".into(),
            "MonthlyCharges".into(),
        ])
        .unwrap()
    }

    fn encoders() -> EncoderTable {
        let mut table = EncoderTable::new();
        table.insert("gender", LabelEncoder::new(vec!["Female".into(), "Male".into()]));
        table.insert(
            "Contract",
            LabelEncoder::new(vec![
                "Month-to-month".into(),
                "One year".into(),
                "Two year".into(),
            ]),
        );
        table
    }

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_columns_follow_spec_order_and_extras_dropped() {
        let rec = RawRecord::new()
            .with("MonthlyCharges", text("70.35"))
            .with("customerID", text("3668-QPYBK"))
            .with("Contract", text("Two year"))
            .with("tenure", text("34"))
            .with("gender", text("Male"));

        let out = normalize(&[rec], &spec(), &encoders());
        assert_eq!(out.matrix.n_cols(), 4);
        assert_eq!(out.matrix.row(0), &[1.0, 34.0, 2.0, 70.35]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_missing_columns_default_to_zero_silently() {
        let rec = RawRecord::new().with("tenure", RawValue::Number(5.0));
        let out = normalize(&[rec], &spec(), &encoders());
        assert_eq!(out.matrix.row(0), &[0.0, 5.0, 0.0, 0.0]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_empty_numeric_cell_is_silent_zero() {
        let rec = RawRecord::new()
            .with("tenure", RawValue::Missing)
            .with("MonthlyCharges", text(" "));
        let out = normalize(&[rec], &spec(), &encoders());
        assert_eq!(out.matrix.row(0), &[0.0, 0.0, 0.0, 0.0]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unknown_category_warns_once_per_feature() {
        let records: Vec<RawRecord> = ["Month to month", "Two year", "Monthly", "Month to month"]
            .iter()
            .map(|c| RawRecord::new().with("Contract", text(c)).with("tenure", text("3")))
            .collect();

        let out = normalize(&records, &spec(), &encoders());
        assert_eq!(out.matrix.n_rows(), 4);
        assert_eq!(out.matrix.row(0)[2], 0.0);
        assert_eq!(out.matrix.row(1)[2], 2.0);
        assert_eq!(out.matrix.row(2)[2], 0.0);
        assert_eq!(
            out.warnings,
            vec![NormalizeWarning::UnknownCategory {
                feature: "Contract".into(),
                rows: 3,
                samples: vec!["Month to month".into(), "Monthly".into()],
            }]
        );
    }

    #[test]
    fn test_bad_feature_does_not_disturb_others() {
        let rec = RawRecord::new()
            .with("gender", text("Unknown"))
            .with("tenure", text("twelve"))
            .with("Contract", text("One year"))
            .with("MonthlyCharges", text("20.5"));

        let out = normalize(&[rec], &spec(), &encoders());
        assert_eq!(out.matrix.row(0), &[0.0, 0.0, 1.0, 20.5]);
        assert_eq!(out.warnings.len(), 2);
        assert!(matches!(
            &out.warnings[0],
            NormalizeWarning::UnknownCategory { feature, .. } if feature == "gender"
        ));
        assert!(matches!(
            &out.warnings[1],
            NormalizeWarning::NonNumeric { feature, rows: 1, .. } if feature == "tenure"
        ));
    }

    #[test]
    fn test_empty_categorical_cell_counts_as_unknown() {
        let rec = RawRecord::new().with("gender", RawValue::Missing);
        let out = normalize(&[rec], &spec(), &encoders());
        assert_eq!(out.matrix.row(0)[0], 0.0);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_numeric_values_are_not_bounded() {
        let rec = RawRecord::new()
            .with("tenure", RawValue::Number(-4.0))
            .with("MonthlyCharges", RawValue::Number(12_345.0));
        let out = normalize(&[rec], &spec(), &encoders());
        assert_eq!(out.matrix.row(0), &[0.0, -4.0, 0.0, 12_345.0]);
    }

    #[test]
    fn test_numeric_category_matches_its_string_form() {
        let mut table = EncoderTable::new();
        table.insert("SeniorCitizen", LabelEncoder::new(vec!["0".into(), "1".into()]));
        let spec = FeatureSpec::new(vec!["SeniorCitizen".into()]).unwrap();
        let rec = RawRecord::new().with("SeniorCitizen", RawValue::Number(1.0));
        let out = normalize(&[rec], &spec, &table);
        assert_eq!(out.matrix.row(0), &[1.0]);
    }

    #[test]
    fn test_no_records_gives_empty_matrix() {
        let out = normalize(&[], &spec(), &encoders());
        assert!(out.matrix.is_empty());
        assert_eq!(out.matrix.n_cols(), 4);
        assert!(out.warnings.is_empty());
    }
}
