use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::{json, Value};

use crate::features::CustomerFeatures;

pub const API_TITLE: &str = "API de Predicción de Churn";
pub const API_VERSION: &str = "1.0";

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>API de Predicción de Churn - Docs</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

/// OpenAPI 3 description of the public routes.
pub fn openapi_spec() -> Value {
    let example = serde_json::to_value(CustomerFeatures::example()).unwrap_or(Value::Null);

    json!({
        "openapi": "3.0.3",
        "info": { "title": API_TITLE, "version": API_VERSION },
        "paths": {
            "/": {
                "get": {
                    "summary": "Read Root",
                    "responses": {
                        "200": {
                            "description": "Welcome message",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "message": { "type": "string" } }
                            }}}
                        }
                    }
                }
            },
            "/predict": {
                "post": {
                    "summary": "Predict Churn",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": {
                            "schema": { "$ref": "#/components/schemas/CustomerFeatures" }
                        }}
                    },
                    "responses": {
                        "200": {
                            "description": "Churn probability and label, or an error message",
                            "content": { "application/json": { "schema": {
                                "$ref": "#/components/schemas/PredictResponse"
                            }}}
                        },
                        "400": { "description": "Malformed JSON body" },
                        "415": { "description": "Missing JSON content type" },
                        "422": { "description": "Validation Error" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "CustomerFeatures": {
                    "title": "CustomerFeatures",
                    "type": "object",
                    "required": [
                        "frequency",
                        "monetary",
                        "avg_payment_value",
                        "avg_items_per_order",
                        "avg_freight_value",
                        "n_unique_categories",
                        "main_category"
                    ],
                    "properties": {
                        "frequency": { "type": "integer", "minimum": 0 },
                        "monetary": { "type": "number" },
                        "avg_payment_value": { "type": "number" },
                        "avg_items_per_order": { "type": "number" },
                        "avg_freight_value": { "type": "number" },
                        "n_unique_categories": { "type": "integer", "minimum": 0 },
                        "main_category": { "type": "string" }
                    },
                    "example": example
                },
                "PredictResponse": {
                    "oneOf": [
                        {
                            "type": "object",
                            "required": ["churn_probability", "prediction"],
                            "properties": {
                                "churn_probability": { "type": "number", "minimum": 0, "maximum": 1 },
                                "prediction": { "type": "string", "enum": ["Churn", "Active"] }
                            }
                        },
                        {
                            "type": "object",
                            "required": ["error"],
                            "properties": { "error": { "type": "string" } }
                        }
                    ]
                }
            }
        }
    })
}

pub async fn openapi_json() -> impl IntoResponse {
    (StatusCode::OK, Json(openapi_spec()))
}

pub async fn swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
