pub mod config;
pub mod error;
pub mod model;
pub mod prediction;
pub mod server;

pub use config::AppConfig;
pub use error::{ArtifactError, InferenceError, ServiceError};
pub use model::{ModelStore, PenguinFeatures, PredictionResponse};
pub use server::build_router;
