use std::collections::HashMap;

/// Maps categorical labels to the integer codes the model was trained on.
pub trait Encoder: Send + Sync {
    /// Code for `label`, or `None` if the encoder never saw it.
    fn encode(&self, label: &str) -> Option<i64>;

    /// All known labels, in code order.
    fn known_labels(&self) -> Vec<&str>;
}

/// A fitted label encoder: a label's code is its position in `classes`.
///
/// Duplicate labels keep their first position.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        let mut codes = HashMap::with_capacity(classes.len());
        for (i, class) in classes.iter().enumerate() {
            codes.entry(class.clone()).or_insert(i as i64);
        }
        Self { classes, codes }
    }
}

impl Encoder for LabelEncoder {
    fn encode(&self, label: &str) -> Option<i64> {
        self.codes.get(label).copied()
    }

    fn known_labels(&self) -> Vec<&str> {
        self.classes.iter().map(String::as_str).collect()
    }
}

/// Feature name → encoder. Only features listed here are categorical.
#[derive(Default)]
pub struct EncoderTable {
    encoders: HashMap<String, Box<dyn Encoder>>,
}

impl EncoderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, encoder: impl Encoder + 'static) {
        self.encoders.insert(feature.into(), Box::new(encoder));
    }

    pub fn get(&self, feature: &str) -> Option<&dyn Encoder> {
        self.encoders.get(feature).map(|e| e.as_ref())
    }

    #[cfg(test)]
    pub fn is_categorical(&self, feature: &str) -> bool {
        self.encoders.contains_key(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }
}

impl std::fmt::Debug for EncoderTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.features().collect();
        names.sort_unstable();
        f.debug_struct("EncoderTable").field("features", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> LabelEncoder {
        LabelEncoder::new(vec![
            "Month-to-month".into(),
            "One year".into(),
            "Two year".into(),
        ])
    }

    #[test]
    fn test_code_is_class_position() {
        let enc = contract();
        assert_eq!(enc.encode("Month-to-month"), Some(0));
        assert_eq!(enc.encode("Two year"), Some(2));
        assert_eq!(enc.encode("two year"), None);
    }

    #[test]
    fn test_duplicate_label_keeps_first_code() {
        let enc = LabelEncoder::new(vec!["No".into(), "Yes".into(), "No".into()]);
        assert_eq!(enc.encode("No"), Some(0));
        assert_eq!(enc.known_labels(), vec!["No", "Yes", "No"]);
    }

    #[test]
    fn test_table_marks_only_listed_features_categorical() {
        let mut table = EncoderTable::new();
        table.insert("Contract", contract());
        assert!(table.is_categorical("Contract"));
        assert!(!table.is_categorical("tenure"));
        assert_eq!(table.get("Contract").map(|e| e.known_labels().len()), Some(3));
    }
}
