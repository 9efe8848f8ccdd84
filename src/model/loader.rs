use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use super::{ChurnForest, ChurnModel, LoadError};

pub const MODEL_DIR: &str = "models";
pub const MODEL_FILE: &str = "rf_churn_model.json";

/// `models/rf_churn_model.json` next to the running executable.
pub fn default_model_path() -> Result<PathBuf, LoadError> {
    let exe = std::env::current_exe().map_err(LoadError::ExecutablePath)?;
    let base = exe.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(base.join(MODEL_DIR).join(MODEL_FILE))
}

pub fn read_model(path: &Path) -> Result<ChurnForest, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ChurnForest::from_json(&bytes)
}

/// Operator-facing diagnostic for a load failure.
pub fn describe_failure(err: &LoadError) -> Vec<String> {
    match err {
        LoadError::NotFound(path) => vec![
            format!(
                "Error: No se encontró el archivo del modelo en {}",
                path.display()
            ),
            format!(
                "Asegúrate de colocar '{}' en una carpeta llamada '{}/' junto al ejecutable.",
                MODEL_FILE, MODEL_DIR
            ),
        ],
        other => vec![format!("Error al cargar el modelo: {}", other)],
    }
}

/// Loads the model once at startup. Never fails: problems are logged and the
/// service keeps running without a model.
pub fn load_model(path: &Path) -> Option<Arc<dyn ChurnModel>> {
    info!("Buscando modelo en: {}", path.display());

    match read_model(path) {
        Ok(model) => {
            info!(
                "Modelo cargado: {} ({} categorías, {} columnas, versión {})",
                model.name(),
                model.categories().len(),
                model.n_columns(),
                model.version().unwrap_or("sin versión")
            );
            Some(Arc::new(model))
        }
        Err(e) => {
            log_failure(&e);
            None
        }
    }
}

fn log_failure(err: &LoadError) {
    for line in describe_failure(err) {
        error!("{}", line);
    }
}

/// Resolves the default path and loads from it.
pub fn load_default_model() -> Option<Arc<dyn ChurnModel>> {
    match default_model_path() {
        Ok(path) => load_model(&path),
        Err(e) => {
            log_failure(&e);
            None
        }
    }
}
