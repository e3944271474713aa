use std::sync::Arc;

use axum::{
    Json, Router, async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    routing::{get, post},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::{
    error::ServiceError,
    model::{ModelStore, PenguinFeatures, PredictionResponse},
    prediction,
};

pub const SERVICE_NAME: &str = "Penguins Species API";
pub const SERVICE_DESCRIPTION: &str = "Penguin species prediction with DT and RF models.";
pub const SERVICE_VERSION: &str = "3.0.0";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ModelStore>,
}

/// JSON body extractor. The body is parsed whatever its `Content-Type`, and
/// every rejection renders through [`ServiceError`] as 422.
struct ApiJson<T>(T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ServiceError::InvalidInput(rejection.body_text()))?;
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    models_loaded: bool,
}

pub fn build_router(store: Arc<ModelStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/", get(root))
        .route("/docs", get(docs))
        .route("/health", get(health))
        .route("/pred", post(predict))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "docs": "/docs",
        "endpoints": {"POST /pred": "predict the penguin species"},
    }))
}

async fn docs() -> Json<Value> {
    Json(json!({
        "title": SERVICE_NAME,
        "description": SERVICE_DESCRIPTION,
        "version": SERVICE_VERSION,
        "endpoints": {
            "GET /": "service information",
            "GET /health": "model availability",
            "POST /pred": {
                "request": {
                    "island": {"type": "string", "description": "Island: Torgersen, Biscoe or Dream"},
                    "bill_length_mm": {"type": "number", "description": "Bill length in mm"},
                    "bill_depth_mm": {"type": "number", "description": "Bill depth in mm"},
                    "flipper_length_mm": {"type": "number", "description": "Flipper length in mm"},
                    "body_mass_g": {"type": "number", "description": "Body mass in grams"},
                    "sex": {"type": "string", "description": "Sex: male or female"},
                    "year": {"type": "integer", "description": "Observation year, e.g. 2007"},
                    "model": {"type": "string", "enum": ["DT", "RF"], "description": "Model used for the prediction"},
                },
                "response": {"model": "string", "species": "string"},
                "errors": {
                    "422": "invalid model or input",
                    "503": "models not loaded",
                },
            },
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let models_loaded = state.store.is_ready();
    Json(HealthResponse {
        status: if models_loaded { "ok" } else { "degraded" },
        models_loaded,
    })
}

async fn predict(
    State(state): State<AppState>,
    ApiJson(features): ApiJson<PenguinFeatures>,
) -> Result<Json<PredictionResponse>, ServiceError> {
    let response = prediction::predict(&state.store, features)?;
    Ok(Json(response))
}
