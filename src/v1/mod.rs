pub mod docs;
pub mod predict;
pub mod root;

pub use docs::{openapi_json, openapi_spec, swagger_ui};
pub use predict::{predict_churn, ChurnLabel, PredictResponse, MODEL_NOT_LOADED};
pub use root::{read_root, WelcomeResponse, WELCOME_MESSAGE};
