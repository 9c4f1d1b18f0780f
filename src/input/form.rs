use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::features::encoder::EncoderTable;
use crate::features::matrix::FeatureSpec;
use crate::models::{parse_flag, RawRecord, RawValue};

/// Accepted range and starting value for one numeric form field.
///
/// Only single-record entry checks these; batch input is never bounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FieldBounds {
    /// Used for numeric features without configured bounds.
    pub const NON_NEGATIVE: FieldBounds = FieldBounds {
        min: 0.0,
        max: f64::INFINITY,
        default: 0.0,
    };

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

pub fn default_bounds() -> BTreeMap<String, FieldBounds> {
    let mut m = BTreeMap::new();
    m.insert("tenure".to_string(), FieldBounds { min: 0.0, max: 100.0, default: 12.0 });
    m.insert("MonthlyCharges".to_string(), FieldBounds { min: 0.0, max: 200.0, default: 50.0 });
    m.insert("TotalCharges".to_string(), FieldBounds { min: 0.0, max: 10000.0, default: 600.0 });
    m
}

/// Split `FIELD=VALUE` at the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), InputError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(InputError::MalformedField(raw.to_string())),
    }
}

/// Builds one validated record from `FIELD=VALUE` pairs, filling in every
/// feature the user left out.
pub struct FormInput<'a> {
    spec: &'a FeatureSpec,
    encoders: &'a EncoderTable,
    bounds: &'a BTreeMap<String, FieldBounds>,
}

impl<'a> FormInput<'a> {
    pub fn new(
        spec: &'a FeatureSpec,
        encoders: &'a EncoderTable,
        bounds: &'a BTreeMap<String, FieldBounds>,
    ) -> Self {
        Self { spec, encoders, bounds }
    }

    fn bounds_for(&self, feature: &str) -> FieldBounds {
        self.bounds.get(feature).copied().unwrap_or(FieldBounds::NON_NEGATIVE)
    }

    pub fn build<S: AsRef<str>>(&self, assignments: &[S]) -> Result<RawRecord, InputError> {
        let mut supplied: BTreeMap<String, String> = BTreeMap::new();
        let mut customer_id = None;
        for raw in assignments {
            let (name, value) = parse_assignment(raw.as_ref())?;
            if name == "customerID" {
                customer_id = Some(value);
            } else if self.spec.contains(&name) {
                supplied.insert(name, value);
            } else {
                return Err(InputError::UnknownField(name));
            }
        }

        let mut record = RawRecord::new();
        if let Some(id) = customer_id {
            record.insert("customerID", RawValue::Text(id));
        }
        for feature in self.spec.names() {
            let value = match self.encoders.get(feature) {
                Some(encoder) => {
                    let options = encoder.known_labels();
                    match supplied.get(feature.as_str()) {
                        Some(v) if encoder.encode(v).is_some() => RawValue::Text(v.clone()),
                        Some(v) => {
                            return Err(InputError::UnknownOption {
                                field: feature.clone(),
                                value: v.clone(),
                                options: options.iter().map(|o| o.to_string()).collect(),
                            })
                        }
                        None => match options.first() {
                            Some(first) => RawValue::Text(first.to_string()),
                            None => RawValue::Missing,
                        },
                    }
                }
                None => {
                    let bounds = self.bounds_for(feature);
                    match supplied.get(feature.as_str()) {
                        Some(v) => {
                            // yes/no answers are kept as flags and read as 1/0
                            let (x, value) = match parse_flag(v) {
                                Some(flag) => (if flag { 1.0 } else { 0.0 }, RawValue::Bool(flag)),
                                None => {
                                    let x = v.parse::<f64>().ok().filter(|x| x.is_finite()).ok_or_else(|| {
                                        InputError::NotNumeric {
                                            field: feature.clone(),
                                            value: v.clone(),
                                        }
                                    })?;
                                    (x, RawValue::Number(x))
                                }
                            };
                            if !bounds.contains(x) {
                                return Err(InputError::OutOfRange {
                                    field: feature.clone(),
                                    value: x,
                                    min: bounds.min,
                                    max: bounds.max,
                                });
                            }
                            value
                        }
                        None => RawValue::Number(bounds.default),
                    }
                }
            };
            record.insert(feature.clone(), value);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::encoder::LabelEncoder;
    use crate::models::Numeric;

    fn fixture() -> (FeatureSpec, EncoderTable, BTreeMap<String, FieldBounds>) {
        let spec = FeatureSpec::new(vec![
            "gender".into(),
            "SeniorCitizen".into(),
            "tenure".into(),
            "Contract".into(),
            "MonthlyCharges".into(),
        ])
        .unwrap();
        let mut encoders = EncoderTable::new();
        encoders.insert("gender", LabelEncoder::new(vec!["Female".into(), "Male".into()]));
        encoders.insert(
            "Contract",
            LabelEncoder::new(vec!["Month-to-month".into(), "One year".into(), "Two year".into()]),
        );
        (spec, encoders, default_bounds())
    }

    #[test]
    fn test_parse_assignment_splits_at_first_equals() {
        assert_eq!(
            parse_assignment("PaymentMethod=Bank transfer (a=b)").unwrap(),
            ("PaymentMethod".to_string(), "Bank transfer (a=b)".to_string())
        );
        assert!(matches!(parse_assignment("tenure"), Err(InputError::MalformedField(_))));
        assert!(matches!(parse_assignment("=5"), Err(InputError::MalformedField(_))));
    }

    #[test]
    fn test_defaults_fill_every_feature() {
        let (spec, encoders, bounds) = fixture();
        let empty: [&str; 0] = [];
        let record = FormInput::new(&spec, &encoders, &bounds).build(&empty).unwrap();

        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["gender", "SeniorCitizen", "tenure", "Contract", "MonthlyCharges"]);
        assert_eq!(record.get("gender"), Some(&RawValue::Text("Female".into())));
        assert_eq!(record.get("SeniorCitizen"), Some(&RawValue::Number(0.0)));
        assert_eq!(record.get("tenure"), Some(&RawValue::Number(12.0)));
        assert_eq!(record.get("Contract"), Some(&RawValue::Text("Month-to-month".into())));
        assert_eq!(record.get("MonthlyCharges"), Some(&RawValue::Number(50.0)));
    }

    #[test]
    fn test_supplied_values_and_customer_id() {
        let (spec, encoders, bounds) = fixture();
        let record = FormInput::new(&spec, &encoders, &bounds)
            .build(&["customerID=9237-HQITU", "Contract=Two year", "tenure=48"])
            .unwrap();
        assert_eq!(record.customer_id().as_deref(), Some("9237-HQITU"));
        assert_eq!(record.get("Contract"), Some(&RawValue::Text("Two year".into())));
        assert_eq!(record.get("tenure"), Some(&RawValue::Number(48.0)));
    }

    #[test]
    fn test_unknown_option_lists_choices() {
        let (spec, encoders, bounds) = fixture();
        match FormInput::new(&spec, &encoders, &bounds).build(&["Contract=Monthly"]) {
            Err(InputError::UnknownOption { field, options, .. }) => {
                assert_eq!(field, "Contract");
                assert_eq!(options, vec!["Month-to-month", "One year", "Two year"]);
            }
            other => panic!("expected UnknownOption, got {:?}", other),
        }
    }

    #[test]
    fn test_bounds_are_enforced() {
        let (spec, encoders, bounds) = fixture();
        let form = FormInput::new(&spec, &encoders, &bounds);
        assert!(matches!(form.build(&["tenure=101"]), Err(InputError::OutOfRange { .. })));
        assert!(matches!(form.build(&["MonthlyCharges=-1"]), Err(InputError::OutOfRange { .. })));
        assert!(matches!(form.build(&["SeniorCitizen=-1"]), Err(InputError::OutOfRange { .. })));
        assert!(form.build(&["tenure=100", "MonthlyCharges=0"]).is_ok());
    }

    #[test]
    fn test_yes_no_answers_become_flags() {
        let (spec, encoders, bounds) = fixture();
        let form = FormInput::new(&spec, &encoders, &bounds);
        let record = form.build(&["SeniorCitizen=Yes"]).unwrap();
        assert_eq!(record.get("SeniorCitizen"), Some(&RawValue::Bool(true)));
        let record = form.build(&["SeniorCitizen=false"]).unwrap();
        assert_eq!(record.get("SeniorCitizen"), Some(&RawValue::Bool(false)));
        assert_eq!(
            record.get("SeniorCitizen").map(RawValue::to_numeric),
            Some(Numeric::Value(0.0))
        );
    }

    #[test]
    fn test_non_numeric_and_unknown_field() {
        let (spec, encoders, bounds) = fixture();
        let form = FormInput::new(&spec, &encoders, &bounds);
        assert!(matches!(form.build(&["tenure=ten"]), Err(InputError::NotNumeric { .. })));
        assert!(matches!(form.build(&["tenure=NaN"]), Err(InputError::NotNumeric { .. })));
        assert!(matches!(form.build(&["Churn=Yes"]), Err(InputError::UnknownField(f)) if f == "Churn"));
    }
}
