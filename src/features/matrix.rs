use std::collections::HashSet;

/// Ordered feature names the classifier expects. Fixed once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    names: Vec<String>,
}

impl FeatureSpec {
    /// Build a spec; rejects an empty list and duplicate names.
    pub fn new(names: Vec<String>) -> Result<Self, String> {
        if names.is_empty() {
            return Err("feature list is empty".to_string());
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(format!("feature '{}' is listed twice", name));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Row-major matrix of feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn with_columns(cols: usize) -> Self {
        Self { rows: 0, cols, values: Vec::new() }
    }

    /// Build from rows that all have the same width.
    #[cfg(test)]
    pub fn from_rows(cols: usize, rows: &[Vec<f64>]) -> Option<Self> {
        let mut matrix = Self::with_columns(cols);
        for row in rows {
            if row.len() != cols {
                return None;
            }
            matrix.push_row(row);
        }
        Some(matrix)
    }

    pub fn push_row(&mut self, row: &[f64]) {
        assert_eq!(row.len(), self.cols, "row width must match matrix columns");
        self.values.extend_from_slice(row);
        self.rows += 1;
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |i| self.row(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_rejects_empty_and_duplicates() {
        assert!(FeatureSpec::new(vec![]).is_err());
        assert!(FeatureSpec::new(vec!["tenure".into(), "tenure".into()]).is_err());
        let spec = FeatureSpec::new(vec!["tenure".into(), "Contract".into()]).unwrap();
        assert_eq!(spec.len(), 2);
        assert!(spec.contains("Contract"));
    }

    #[test]
    fn test_rows_round_trip() {
        let m = FeatureMatrix::from_rows(2, &[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.rows().count(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(FeatureMatrix::from_rows(2, &[vec![1.0, 2.0], vec![3.0]]).is_none());
    }

    #[test]
    fn test_zero_width_matrix_keeps_row_count() {
        let mut m = FeatureMatrix::with_columns(0);
        m.push_row(&[]);
        m.push_row(&[]);
        assert_eq!(m.n_rows(), 2);
        assert!(m.row(1).is_empty());
    }
}
