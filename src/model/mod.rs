pub mod forest;
pub mod loader;

use std::path::PathBuf;

use crate::features::CustomerFeatures;

pub use forest::ChurnForest;
pub use loader::{
    default_model_path, load_default_model, load_model, read_model, MODEL_DIR, MODEL_FILE,
};

/// A binary churn classifier.
///
/// For every input row the model returns `[p_active, p_churn]`, the
/// probabilities of class 0 and class 1.
pub trait ChurnModel: Send + Sync {
    fn predict_proba(&self, rows: &[CustomerFeatures]) -> Result<Vec<[f64; 2]>, ModelError>;

    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown main_category '{0}'")]
    UnknownCategory(String),
    #[error("matrix creation failed: {0}")]
    Matrix(String),
    #[error("prediction failed: {0}")]
    Backend(String),
    #[error("model returned {got} predictions for {expected} rows")]
    OutputShape { expected: usize, got: usize },
    #[error("inference worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not resolve the executable location: {0}")]
    ExecutablePath(#[source] std::io::Error),
    #[error("model file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to deserialize model: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}
