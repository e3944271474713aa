use std::{fs, path::Path, sync::Arc};

use serde::Deserialize;

use crate::{
    config::AppConfig,
    error::ArtifactError,
    model::{
        ModelSelector,
        classifier::{Classifier, DecisionTree, RandomForest, Tree},
        types::FEATURE_COLUMNS,
    },
};

/// On-disk layout of an exported model.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelArtifact {
    DecisionTree {
        feature_names: Vec<String>,
        classes: Vec<String>,
        tree: Tree,
    },
    RandomForest {
        feature_names: Vec<String>,
        classes: Vec<String>,
        trees: Vec<Tree>,
    },
}

impl ModelArtifact {
    fn selector(&self) -> ModelSelector {
        match self {
            ModelArtifact::DecisionTree { .. } => ModelSelector::DecisionTree,
            ModelArtifact::RandomForest { .. } => ModelSelector::RandomForest,
        }
    }

    fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::DecisionTree { feature_names, .. }
            | ModelArtifact::RandomForest { feature_names, .. } => feature_names,
        }
    }

    fn into_classifier(self) -> Result<Arc<dyn Classifier>, String> {
        let classifier: Arc<dyn Classifier> = match self {
            ModelArtifact::DecisionTree { classes, tree, .. } => {
                Arc::new(DecisionTree::new(classes, tree)?)
            }
            ModelArtifact::RandomForest { classes, trees, .. } => {
                Arc::new(RandomForest::new(classes, trees)?)
            }
        };
        Ok(classifier)
    }
}

/// Both classifiers, loaded together.
pub struct ModelArtifacts {
    pub decision_tree: Arc<dyn Classifier>,
    pub random_forest: Arc<dyn Classifier>,
}

impl ModelArtifacts {
    pub fn load(config: &AppConfig) -> Result<Self, ArtifactError> {
        let decision_tree =
            load_classifier(&config.decision_tree_path, ModelSelector::DecisionTree)?;
        let random_forest =
            load_classifier(&config.random_forest_path, ModelSelector::RandomForest)?;

        Ok(Self {
            decision_tree,
            random_forest,
        })
    }
}

pub fn load_classifier(
    path: &Path,
    expected: ModelSelector,
) -> Result<Arc<dyn Classifier>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ModelArtifact =
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let invalid = |reason: String| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    };

    if artifact.selector() != expected {
        return Err(invalid(format!(
            "expected a {expected} model, found {}",
            artifact.selector()
        )));
    }

    let expected_columns: Vec<&str> = FEATURE_COLUMNS.iter().map(|(name, _)| *name).collect();
    if artifact.feature_names() != expected_columns.as_slice() {
        return Err(invalid(format!(
            "feature names {:?} do not match {:?}",
            artifact.feature_names(),
            expected_columns
        )));
    }

    let classifier = artifact.into_classifier().map_err(invalid)?;
    tracing::debug!(path = %path.display(), model = classifier.name(), "model artifact loaded");
    Ok(classifier)
}
