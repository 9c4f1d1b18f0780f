use serde::Deserialize;

use crate::error::ClassifierError;
use crate::features::matrix::FeatureMatrix;
use crate::model::{check_shape, Classifier};

const LEAF: i64 = -1;

/// A random forest: the positive-class probability is the mean of each
/// tree's leaf class distribution.
#[derive(Debug, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

/// One fitted tree in parallel-array form.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise rows with
/// `x[feature[i]] <= threshold[i]` go left. `value[i]` holds the class
/// weights `[stay, churn]` seen at the node.
#[derive(Debug, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!("tree arrays differ in length (expected {} nodes)", n));
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {} has a right child but no left child", i));
                }
                let weights = &self.value[i];
                if weights.len() != 2 {
                    return Err(format!(
                        "leaf {} has {} class weights, a binary model needs 2",
                        i,
                        weights.len()
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has invalid class weights", i));
                }
                continue;
            }

            // Children always come after their parent, so traversal cannot loop.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {} points to invalid child {}", i, child));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!(
                    "node {} splits on feature {} but the model has {}",
                    i, feature, n_features
                ));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {} has a non-finite threshold", i));
            }
        }
        Ok(())
    }

    /// Class weights of the leaf `row` falls into, normalized to sum 1.
    fn leaf_distribution(&self, row: &[f64]) -> (f64, f64) {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let f = self.feature[node] as usize;
            node = if row[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let w = &self.value[node];
        let total = w[0] + w[1];
        (w[0] / total, w[1] / total)
    }
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("model has no features".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.n_features {
                return Err(format!(
                    "{} feature importances for {} features",
                    importances.len(),
                    self.n_features
                ));
            }
        }
        Ok(())
    }

    /// Mean (stay, churn) distribution over all trees.
    fn distribution(&self, row: &[f64]) -> (f64, f64) {
        let (mut stay, mut churn) = (0.0, 0.0);
        for tree in &self.trees {
            let (s, c) = tree.leaf_distribution(row);
            stay += s;
            churn += c;
        }
        let n = self.trees.len() as f64;
        (stay / n, churn / n)
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError> {
        check_shape(self.n_features, matrix)?;
        Ok(matrix.rows().map(|row| self.distribution(row).1).collect())
    }

    fn predict_label(&self, matrix: &FeatureMatrix) -> Result<Vec<u8>, ClassifierError> {
        check_shape(self.n_features, matrix)?;
        Ok(matrix
            .rows()
            .map(|row| {
                let (stay, churn) = self.distribution(row);
                u8::from(churn > stay)
            })
            .collect())
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.feature_importances.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on feature 0 (tenure) at 12: short tenure leans churn.
    fn tenure_stump(short: [f64; 2], long: [f64; 2]) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![12.0, -2.0, -2.0],
            value: vec![vec![50.0, 50.0], short.to_vec(), long.to_vec()],
        }
    }

    fn forest() -> RandomForest {
        RandomForest {
            n_features: 2,
            trees: vec![
                tenure_stump([20.0, 80.0], [90.0, 10.0]),
                tenure_stump([40.0, 60.0], [70.0, 30.0]),
            ],
            feature_importances: Some(vec![0.8, 0.2]),
        }
    }

    #[test]
    fn test_probability_is_mean_of_leaf_distributions() {
        let model = forest();
        model.validate().unwrap();
        let m = FeatureMatrix::from_rows(2, &[vec![3.0, 0.0], vec![40.0, 0.0]]).unwrap();
        let p = model.predict_probability(&m).unwrap();
        assert!((p[0] - 0.7).abs() < 1e-12);
        assert!((p[1] - 0.2).abs() < 1e-12);
        assert_eq!(model.predict_label(&m).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_threshold_goes_left_when_equal() {
        let model = forest();
        let m = FeatureMatrix::from_rows(2, &[vec![12.0, 0.0]]).unwrap();
        assert!((model.predict_probability(&m).unwrap()[0] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_tie_predicts_stay() {
        let model = RandomForest {
            n_features: 2,
            trees: vec![tenure_stump([1.0, 1.0], [1.0, 1.0])],
            feature_importances: None,
        };
        let m = FeatureMatrix::from_rows(2, &[vec![0.0, 0.0]]).unwrap();
        assert_eq!(model.predict_label(&m).unwrap(), vec![0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let m = FeatureMatrix::from_rows(3, &[vec![1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(
            forest().predict_probability(&m),
            Err(ClassifierError::ShapeMismatch { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn test_validation_rejects_backward_child() {
        let mut tree = tenure_stump([1.0, 1.0], [1.0, 1.0]);
        tree.children_left[0] = 0;
        let model = RandomForest { n_features: 2, trees: vec![tree], feature_importances: None };
        assert!(model.validate().unwrap_err().contains("invalid child"));
    }

    #[test]
    fn test_validation_rejects_out_of_range_feature() {
        let mut tree = tenure_stump([1.0, 1.0], [1.0, 1.0]);
        tree.feature[0] = 5;
        let model = RandomForest { n_features: 2, trees: vec![tree], feature_importances: None };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validation_requires_two_class_weights_per_leaf() {
        let mut tree = tenure_stump([1.0, 1.0], [1.0, 1.0]);
        tree.value[1] = vec![1.0, 1.0, 1.0];
        let model = RandomForest { n_features: 2, trees: vec![tree], feature_importances: None };
        assert!(model.validate().unwrap_err().contains("3 class weights"));
    }

    #[test]
    fn test_validation_rejects_importance_length() {
        let mut model = forest();
        model.feature_importances = Some(vec![1.0]);
        assert!(model.validate().is_err());
    }
}
