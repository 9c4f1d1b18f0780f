use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ArtifactError, ArtifactKind};
use crate::features::encoder::{EncoderTable, LabelEncoder};
use crate::features::matrix::FeatureSpec;
use crate::model::{Classifier, ModelArtifact};

pub const DEFAULT_MODEL_FILE: &str = "churn_model.json";
pub const DEFAULT_ENCODERS_FILE: &str = "encoders.json";
pub const DEFAULT_FEATURES_FILE: &str = "feature_names.json";

/// Where the three trained-model artifacts live.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoders: PathBuf,
    pub features: PathBuf,
}

impl ArtifactPaths {
    /// The default file names inside `dir`.
    #[cfg(test)]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(DEFAULT_MODEL_FILE),
            encoders: dir.join(DEFAULT_ENCODERS_FILE),
            features: dir.join(DEFAULT_FEATURES_FILE),
        }
    }

    fn iter(&self) -> [(ArtifactKind, &Path); 3] {
        [
            (ArtifactKind::Classifier, self.model.as_path()),
            (ArtifactKind::Encoders, self.encoders.as_path()),
            (ArtifactKind::FeatureSpec, self.features.as_path()),
        ]
    }
}

/// Everything a prediction needs, loaded once and then only read.
pub struct Artifacts {
    pub classifier: Box<dyn Classifier>,
    pub encoders: EncoderTable,
    pub spec: FeatureSpec,
    pub model_kind: &'static str,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("model_kind", &self.model_kind)
            .field("features", &self.spec.len())
            .field("encoders", &self.encoders)
            .finish()
    }
}

/// Every artifact file that does not exist, so they can be reported together.
pub fn missing_artifacts(paths: &ArtifactPaths) -> Vec<(ArtifactKind, PathBuf)> {
    paths
        .iter()
        .into_iter()
        .filter(|(_, p)| !p.exists())
        .map(|(kind, p)| (kind, p.to_path_buf()))
        .collect()
}

/// Load and cross-check the classifier, encoders and feature list.
pub fn load(paths: &ArtifactPaths) -> Result<Artifacts, ArtifactError> {
    let names: Vec<String> = read_json(ArtifactKind::FeatureSpec, &paths.features)?;
    let spec = FeatureSpec::new(names)
        .map_err(|e| ArtifactError::corrupt(ArtifactKind::FeatureSpec, &paths.features, e))?;

    let raw_encoders: HashMap<String, Vec<ClassLabel>> = read_json(ArtifactKind::Encoders, &paths.encoders)?;
    let mut encoders = EncoderTable::new();
    for (feature, classes) in raw_encoders {
        if classes.is_empty() {
            return Err(ArtifactError::corrupt(
                ArtifactKind::Encoders,
                &paths.encoders,
                format!("encoder for '{}' has no classes", feature),
            ));
        }
        if !spec.contains(&feature) {
            debug!(feature = %feature, "encoder for a feature the model does not use");
        }
        let classes = classes.into_iter().map(ClassLabel::into_label).collect();
        encoders.insert(feature, LabelEncoder::new(classes));
    }

    let artifact: ModelArtifact = read_json(ArtifactKind::Classifier, &paths.model)?;
    let model_kind = artifact.kind();
    let classifier = artifact
        .into_classifier()
        .map_err(|e| ArtifactError::corrupt(ArtifactKind::Classifier, &paths.model, e))?;

    if classifier.n_features() != spec.len() {
        return Err(ArtifactError::corrupt(
            ArtifactKind::Classifier,
            &paths.model,
            format!(
                "model expects {} features but the feature list has {}",
                classifier.n_features(),
                spec.len()
            ),
        ));
    }

    info!(
        model = model_kind,
        features = spec.len(),
        categorical = encoders.len(),
        "loaded model artifacts"
    );

    Ok(Artifacts {
        classifier,
        encoders,
        spec,
        model_kind,
    })
}

fn read_json<T: DeserializeOwned>(artifact: ArtifactKind, path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing {
            artifact,
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ArtifactError::corrupt(artifact, path, e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ArtifactError::corrupt(artifact, path, e.to_string()))
}

/// Encoder classes may be stored as strings, numbers or booleans.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassLabel {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ClassLabel {
    /// Same string form [`RawValue::label`](crate::models::RawValue::label) produces.
    fn into_label(self) -> String {
        match self {
            ClassLabel::Text(s) => s,
            ClassLabel::Int(i) => i.to_string(),
            ClassLabel::Float(x) => crate::models::RawValue::Number(x).label().unwrap_or_default(),
            ClassLabel::Bool(true) => "True".to_string(),
            ClassLabel::Bool(false) => "False".to_string(),
        }
    }
}
