use tracing::debug;

use crate::{
    error::ServiceError,
    model::{FeatureRow, ModelSelector, ModelStore, PenguinFeatures, PredictionResponse},
};

/// Classifies one record with the model it names.
///
/// Availability is checked before anything else, so a degraded store answers
/// every request with [`ServiceError::ModelsUnavailable`]. An unknown selector
/// is rejected before any handle is touched.
pub fn predict(
    store: &ModelStore,
    features: PenguinFeatures,
) -> Result<PredictionResponse, ServiceError> {
    if !store.is_ready() {
        return Err(ServiceError::ModelsUnavailable);
    }

    let selector = ModelSelector::parse(&features.model).ok_or_else(|| {
        ServiceError::InvalidInput(format!(
            "invalid model '{}', use 'DT' or 'RF'",
            features.model
        ))
    })?;
    let handle = store
        .handle(selector)
        .ok_or(ServiceError::ModelsUnavailable)?;

    let row = FeatureRow::from_features(&features);
    let species = handle.predict(&row)?;
    debug!(model = %selector, %species, "prediction served");

    Ok(PredictionResponse {
        model: features.model,
        species,
    })
}
