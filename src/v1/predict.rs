use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::features::CustomerFeatures;
use crate::model::{ChurnModel, ModelError};
use crate::AppState;

pub const MODEL_NOT_LOADED: &str = "Modelo no cargado. Revisa los logs del servidor.";

/// Class-1 probabilities strictly above this are labelled `Churn`.
pub const CHURN_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLabel {
    Churn,
    Active,
}

impl ChurnLabel {
    pub fn from_probability(churn_probability: f64) -> Self {
        if churn_probability > CHURN_THRESHOLD {
            ChurnLabel::Churn
        } else {
            ChurnLabel::Active
        }
    }
}

/// Body of every `POST /predict` answer that got past validation.
///
/// Failures are reported in the body with a 200 status, not through the
/// status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Prediction {
        churn_probability: f64,
        prediction: ChurnLabel,
    },
    Error {
        error: String,
    },
}

impl PredictResponse {
    pub fn from_probability(churn_probability: f64) -> Self {
        PredictResponse::Prediction {
            churn_probability: round_to_4dp(churn_probability),
            prediction: ChurnLabel::from_probability(churn_probability),
        }
    }

    pub fn model_not_loaded() -> Self {
        PredictResponse::Error {
            error: MODEL_NOT_LOADED.to_string(),
        }
    }

    pub fn inference_failed(err: &ModelError) -> Self {
        PredictResponse::Error {
            error: format!("Error durante la predicción: {}", err),
        }
    }
}

/// Rounds the exact decimal value of `value`, not `value * 10^4`, so 0.00035
/// (stored just below the midpoint) becomes 0.0003.
fn round_to_4dp(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

fn churn_probability(
    model: &dyn ChurnModel,
    features: CustomerFeatures,
) -> Result<f64, ModelError> {
    let probs = model.predict_proba(std::slice::from_ref(&features))?;
    let [_, churn] = probs
        .first()
        .copied()
        .ok_or(ModelError::OutputShape { expected: 1, got: 0 })?;
    Ok(churn)
}

pub async fn predict_churn(
    State(state): State<AppState>,
    Json(features): Json<CustomerFeatures>,
) -> impl IntoResponse {
    let Some(model) = state.model.clone() else {
        warn!("Prediction requested but no model is loaded");
        return (StatusCode::OK, Json(PredictResponse::model_not_loaded()));
    };

    // A panic inside the model comes back as a JoinError instead of tearing
    // down the connection task.
    let outcome =
        tokio::task::spawn_blocking(move || churn_probability(model.as_ref(), features))
            .await
            .map_err(|e| ModelError::Worker(e.to_string()))
            .and_then(|r| r);

    let response = match outcome {
        Ok(p) => {
            debug!("churn probability {:.6}", p);
            PredictResponse::from_probability(p)
        }
        Err(e) => {
            warn!("Inference failed: {}", e);
            PredictResponse::inference_failed(&e)
        }
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedModel(f64);

    impl ChurnModel for FixedModel {
        fn predict_proba(&self, rows: &[CustomerFeatures]) -> Result<Vec<[f64; 2]>, ModelError> {
            Ok(rows.iter().map(|_| [1.0 - self.0, self.0]).collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingModel;

    impl ChurnModel for FailingModel {
        fn predict_proba(&self, rows: &[CustomerFeatures]) -> Result<Vec<[f64; 2]>, ModelError> {
            Err(ModelError::UnknownCategory(rows[0].main_category.clone()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingModel;

    impl ChurnModel for PanickingModel {
        fn predict_proba(&self, _rows: &[CustomerFeatures]) -> Result<Vec<[f64; 2]>, ModelError> {
            panic!("boom")
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    struct EmptyModel;

    impl ChurnModel for EmptyModel {
        fn predict_proba(&self, _rows: &[CustomerFeatures]) -> Result<Vec<[f64; 2]>, ModelError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    fn router_with(model: Option<Arc<dyn ChurnModel>>) -> Router {
        app(AppState::new(model))
    }

    fn router_serving(model: impl ChurnModel + 'static) -> Router {
        router_with(Some(Arc::new(model)))
    }

    fn example_body() -> Value {
        json!({
            "frequency": 1,
            "monetary": 59.90,
            "avg_payment_value": 59.90,
            "avg_items_per_order": 1.0,
            "avg_freight_value": 15.50,
            "n_unique_categories": 1,
            "main_category": "sports_leisure"
        })
    }

    async fn post_predict(router: Router, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[test]
    fn label_threshold_is_strict() {
        assert_eq!(ChurnLabel::from_probability(0.5), ChurnLabel::Active);
        assert_eq!(ChurnLabel::from_probability(0.500001), ChurnLabel::Churn);
        assert_eq!(ChurnLabel::from_probability(0.0), ChurnLabel::Active);
        assert_eq!(ChurnLabel::from_probability(1.0), ChurnLabel::Churn);
    }

    #[test]
    fn label_uses_raw_probability() {
        // Rounds to 0.5 but is still above the threshold.
        let response = PredictResponse::from_probability(0.50001);
        assert_eq!(
            response,
            PredictResponse::Prediction {
                churn_probability: 0.5,
                prediction: ChurnLabel::Churn,
            }
        );
    }

    #[test]
    fn probability_is_rounded_to_four_places() {
        assert_eq!(round_to_4dp(0.123456), 0.1235);
        assert_eq!(round_to_4dp(0.98764), 0.9876);
        assert_eq!(round_to_4dp(1.0), 1.0);
    }

    #[test]
    fn rounding_follows_the_exact_decimal_value() {
        // Each literal sits just below a midpoint once stored as f64.
        assert_eq!(round_to_4dp(0.00035), 0.0003);
        assert_eq!(round_to_4dp(0.00045), 0.0004);
        assert_eq!(round_to_4dp(0.50005), 0.5);
        assert_eq!(round_to_4dp(0.0), 0.0);
    }

    #[tokio::test]
    async fn near_midpoint_probability_rounds_down() {
        let router = router_serving(FixedModel(0.50005));
        let (status, body) = post_predict(router, &example_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"churn_probability": 0.5, "prediction": "Churn"}));
    }

    #[tokio::test]
    async fn example_payload_is_active() {
        let router = router_serving(FixedModel(0.1234));
        let (status, body) = post_predict(router, &example_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"churn_probability": 0.1234, "prediction": "Active"}));
    }

    #[tokio::test]
    async fn high_probability_is_churn() {
        let router = router_serving(FixedModel(0.87654));
        let (status, body) = post_predict(router, &example_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"churn_probability": 0.8765, "prediction": "Churn"}));
    }

    #[tokio::test]
    async fn exactly_half_is_active() {
        let (_, body) = post_predict(router_serving(FixedModel(0.5)), &example_body()).await;
        assert_eq!(body, json!({"churn_probability": 0.5, "prediction": "Active"}));
    }

    #[tokio::test]
    async fn missing_model_reports_error_in_body() {
        let (status, body) = post_predict(router_with(None), &example_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": MODEL_NOT_LOADED}));
    }

    #[tokio::test]
    async fn inference_error_reports_error_in_body() {
        let (status, body) = post_predict(router_serving(FailingModel), &example_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"error": "Error durante la predicción: unknown main_category 'sports_leisure'"})
        );
    }

    #[tokio::test]
    async fn empty_model_output_reports_error_in_body() {
        let (status, body) = post_predict(router_serving(EmptyModel), &example_body()).await;
        assert_eq!(status, StatusCode::OK);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Error durante la predicción: "));
    }

    #[tokio::test]
    async fn panicking_model_does_not_take_down_the_service() {
        let router = router_serving(PanickingModel);

        let (status, body) = post_predict(router.clone(), &example_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].as_str().unwrap().starts_with("Error durante la predicción: "));

        let (status, _) = post_predict(router, &example_body()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_payloads_are_rejected_before_the_model() {
        let router = router_serving(PanickingModel);

        let mut wrong_type = example_body();
        wrong_type["frequency"] = json!("1");
        let mut missing = example_body();
        missing.as_object_mut().unwrap().remove("main_category");

        for body in [wrong_type, missing] {
            let (status, _) = post_predict(router.clone(), &body).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_even_without_model() {
        let mut body = example_body();
        body["monetary"] = json!("a lot");
        let (status, _) = post_predict(router_with(None), &body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .body(Body::from(example_body().to_string()))
            .unwrap();
        let response = router_serving(PanickingModel).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn whole_float_count_reaches_the_model() {
        let mut body = example_body();
        body["frequency"] = json!(1.0);
        let (status, body) = post_predict(router_serving(FixedModel(0.1234)), &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "Active");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"frequency\": 1,"))
            .unwrap();
        let response = router_with(None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
