pub mod classifier;
mod loader;
mod store;
mod types;

pub use classifier::{Classifier, DecisionTree, RandomForest};
pub use loader::{ModelArtifacts, load_classifier};
pub use store::ModelStore;
pub use types::{
    ColumnKind, FEATURE_COLUMNS, FeatureRow, FeatureValue, ModelSelector, PenguinFeatures,
    PredictionResponse,
};
