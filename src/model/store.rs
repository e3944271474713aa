use std::sync::Arc;

use tracing::{error, info};

use crate::{
    config::AppConfig,
    model::{Classifier, ModelArtifacts, ModelSelector},
};

/// Owns the two classifiers for the lifetime of the process. Populated once
/// at startup and never written afterwards.
#[derive(Clone, Default)]
pub struct ModelStore {
    decision_tree: Option<Arc<dyn Classifier>>,
    random_forest: Option<Arc<dyn Classifier>>,
}

impl ModelStore {
    /// Loads both artifacts. A failure leaves the store empty instead of
    /// aborting startup, so the service stays reachable in a degraded state.
    pub fn initialize(config: &AppConfig) -> Self {
        info!(
            decision_tree = %config.decision_tree_path.display(),
            random_forest = %config.random_forest_path.display(),
            "loading model artifacts"
        );

        match ModelArtifacts::load(config) {
            Ok(artifacts) => {
                info!("model artifacts loaded");
                Self::from_artifacts(artifacts)
            }
            Err(err) => {
                error!(error = %err, "failed to load model artifacts, serving degraded");
                Self::empty()
            }
        }
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self {
            decision_tree: Some(artifacts.decision_tree),
            random_forest: Some(artifacts.random_forest),
        }
    }

    pub fn from_handles(
        decision_tree: Option<Arc<dyn Classifier>>,
        random_forest: Option<Arc<dyn Classifier>>,
    ) -> Self {
        Self {
            decision_tree,
            random_forest,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn handle(&self, selector: ModelSelector) -> Option<&Arc<dyn Classifier>> {
        match selector {
            ModelSelector::DecisionTree => self.decision_tree.as_ref(),
            ModelSelector::RandomForest => self.random_forest.as_ref(),
        }
    }

    /// Looks a handle up by its wire tag; unknown tags yield nothing.
    pub fn handle_by_tag(&self, tag: &str) -> Option<&Arc<dyn Classifier>> {
        ModelSelector::parse(tag).and_then(|selector| self.handle(selector))
    }

    pub fn is_ready(&self) -> bool {
        self.decision_tree.is_some() && self.random_forest.is_some()
    }
}
