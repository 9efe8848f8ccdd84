use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str =
    "Bienvenido a la API de Predicción de Churn. Usa el endpoint /docs para ver la documentación.";

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

pub async fn read_root() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(WelcomeResponse {
            message: WELCOME_MESSAGE.to_string(),
        }),
    )
}
