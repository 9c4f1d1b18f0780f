use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One untyped input cell, as supplied by a form field or a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Missing,
}

/// Result of reading a [`RawValue`] as a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Value(f64),
    Missing,
    Invalid,
}

impl RawValue {
    /// The string form an encoder is matched against, or `None` for an
    /// empty cell.
    pub fn label(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            RawValue::Number(x) => {
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    Some(format!("{}", *x as i64))
                } else {
                    Some(x.to_string())
                }
            }
            RawValue::Bool(true) => Some("True".to_string()),
            RawValue::Bool(false) => Some("False".to_string()),
            RawValue::Missing => None,
        }
    }

    pub fn to_numeric(&self) -> Numeric {
        match self {
            RawValue::Number(x) if x.is_finite() => Numeric::Value(*x),
            RawValue::Number(_) => Numeric::Invalid,
            RawValue::Bool(b) => Numeric::Value(if *b { 1.0 } else { 0.0 }),
            RawValue::Missing => Numeric::Missing,
            RawValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    return Numeric::Missing;
                }
                if let Ok(x) = t.parse::<f64>() {
                    return if x.is_finite() { Numeric::Value(x) } else { Numeric::Invalid };
                }
                match parse_flag(t) {
                    Some(b) => Numeric::Value(if b { 1.0 } else { 0.0 }),
                    None => Numeric::Invalid,
                }
            }
        }
    }
}

/// `yes`/`true` and `no`/`false`, case-insensitive.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Missing => Ok(()),
            RawValue::Text(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.label().unwrap_or_default()),
        }
    }
}

/// One customer: field name → value, in the order the fields were supplied.
///
/// Columns that are not model features stay here so batch output can show
/// them next to the prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: RawValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    #[cfg(test)]
    pub fn with(mut self, name: impl Into<String>, value: RawValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Best-effort identifier for display: `customerID` when present.
    pub fn customer_id(&self) -> Option<String> {
        self.get("customerID").and_then(RawValue::label)
    }
}

impl Serialize for RawRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Column value used in exported results, e.g. `High Risk`.
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RiskTier::Low => "This customer is very likely to stay!",
            RiskTier::Medium => "Keep an eye on this customer",
            RiskTier::High => "This customer might leave soon!",
        }
    }

    pub fn recommended_actions(&self) -> &'static [&'static str] {
        match self {
            RiskTier::High => &[
                "Contact this customer personally within 48 hours",
                "Offer a retention discount or upgrade incentive",
                "Schedule a satisfaction call to understand concerns",
                "Review their service usage and suggest optimizations",
            ],
            RiskTier::Medium => &[
                "Send personalized offers or service updates",
                "Track usage patterns for changes",
                "Gather feedback through surveys",
                "Consider loyalty rewards",
            ],
            RiskTier::Low => &[
                "Consider upselling additional services",
                "Send thank-you messages for loyalty",
                "Invite them to referral programs",
            ],
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Medium => write!(f, "Medium"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

/// The classifier's binary decision, independent of the risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChurnLabel {
    Stay,
    Churn,
}

impl ChurnLabel {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ChurnLabel::Stay),
            1 => Some(ChurnLabel::Churn),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChurnLabel::Stay => write!(f, "Likely to Stay"),
            ChurnLabel::Churn => write!(f, "Likely to Churn"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: ChurnLabel,
    pub probability: f64,
    pub tier: RiskTier,
}

/// A batch row: the record as supplied plus its prediction.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    pub record: RawRecord,
    pub result: PredictionResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_forms() {
        assert_eq!(RawValue::Text("  DSL ".into()).label().as_deref(), Some("DSL"));
        assert_eq!(RawValue::Number(1.0).label().as_deref(), Some("1"));
        assert_eq!(RawValue::Number(2.5).label().as_deref(), Some("2.5"));
        assert_eq!(RawValue::Bool(true).label().as_deref(), Some("True"));
        assert_eq!(RawValue::Text("   ".into()).label(), None);
        assert_eq!(RawValue::Missing.label(), None);
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(RawValue::Text("29.85".into()).to_numeric(), Numeric::Value(29.85));
        assert_eq!(RawValue::Text("Yes".into()).to_numeric(), Numeric::Value(1.0));
        assert_eq!(RawValue::Text("no".into()).to_numeric(), Numeric::Value(0.0));
        assert_eq!(RawValue::Text(" ".into()).to_numeric(), Numeric::Missing);
        assert_eq!(RawValue::Text("n/a".into()).to_numeric(), Numeric::Invalid);
        assert_eq!(RawValue::Text("NaN".into()).to_numeric(), Numeric::Invalid);
        assert_eq!(RawValue::Bool(false).to_numeric(), Numeric::Value(0.0));
    }

    #[test]
    fn test_record_insert_replaces_and_keeps_order() {
        let mut rec = RawRecord::new()
            .with("customerID", RawValue::Text("7590-VHVEG".into()))
            .with("tenure", RawValue::Number(1.0));
        rec.insert("customerID", RawValue::Text("0001".into()));

        let names: Vec<&str> = rec.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["customerID", "tenure"]);
        assert_eq!(rec.customer_id().as_deref(), Some("0001"));
    }

    #[test]
    fn test_record_serializes_in_insertion_order() {
        let rec = RawRecord::new()
            .with("z", RawValue::Number(1.0))
            .with("a", RawValue::Missing);
        assert_eq!(serde_json::to_string(&rec).unwrap(), r#"{"z":1.0,"a":null}"#);
    }

    #[test]
    fn test_label_display_is_independent_of_tier() {
        assert_eq!(ChurnLabel::from_code(1), Some(ChurnLabel::Churn));
        assert_eq!(ChurnLabel::from_code(2), None);
        assert_eq!(ChurnLabel::Stay.to_string(), "Likely to Stay");
        assert_eq!(RiskTier::Medium.label(), "Medium Risk");
    }
}
