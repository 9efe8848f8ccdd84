use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub mod config;
pub mod features;
pub mod model;
pub mod v1;

use model::ChurnModel;

/// Shared, read-only handler state. The model is resolved once before the
/// server starts and is `None` when loading failed.
#[derive(Clone, Default)]
pub struct AppState {
    pub model: Option<Arc<dyn ChurnModel>>,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn ChurnModel>>) -> Self {
        Self { model }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(v1::read_root))
        .route("/predict", post(v1::predict_churn))
        .route("/openapi.json", get(v1::openapi_json))
        .route("/docs", get(v1::swagger_ui))
        .with_state(state)
}
