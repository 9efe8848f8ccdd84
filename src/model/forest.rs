use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::{ChurnModel, LoadError, ModelError};
use crate::features::{CustomerFeatures, NUMERIC_COLUMNS};

pub type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random forest fitted on 0/1 churn labels.
///
/// The averaged leaf value is the share of churners that fell into the same
/// leaves, which is read as the class-1 probability. `main_category` is
/// one-hot encoded against `categories` after the numeric columns.
#[derive(Serialize, Deserialize)]
pub struct ChurnForest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    categories: Vec<String>,
    forest: Forest,
}

impl ChurnForest {
    pub fn new(categories: Vec<String>, forest: Forest) -> Result<Self, LoadError> {
        let model = Self {
            version: None,
            categories,
            forest,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, LoadError> {
        let model: Self = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn n_columns(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.categories.len()
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.categories.is_empty() {
            return Err(LoadError::Invalid("category vocabulary is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.as_str()) {
                return Err(LoadError::Invalid(format!(
                    "duplicate category '{}'",
                    category
                )));
            }
        }
        Ok(())
    }

    pub fn encode(&self, features: &CustomerFeatures) -> Result<Vec<f64>, ModelError> {
        encode_row(&self.categories, features)
    }
}

/// Numeric columns in schema order followed by the one-hot `main_category`.
pub fn encode_row(
    categories: &[String],
    features: &CustomerFeatures,
) -> Result<Vec<f64>, ModelError> {
    let hot = categories
        .iter()
        .position(|c| *c == features.main_category)
        .ok_or_else(|| ModelError::UnknownCategory(features.main_category.clone()))?;

    let mut row = Vec::with_capacity(NUMERIC_COLUMNS.len() + categories.len());
    row.extend_from_slice(&features.numeric_values());
    row.extend((0..categories.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
    Ok(row)
}

impl ChurnModel for ChurnForest {
    fn predict_proba(&self, rows: &[CustomerFeatures]) -> Result<Vec<[f64; 2]>, ModelError> {
        let encoded = rows
            .iter()
            .map(|r| self.encode(r))
            .collect::<Result<Vec<_>, _>>()?;

        let matrix =
            DenseMatrix::from_2d_vec(&encoded).map_err(|e| ModelError::Matrix(e.to_string()))?;

        let scores = self
            .forest
            .predict(&matrix)
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        if scores.len() != rows.len() {
            return Err(ModelError::OutputShape {
                expected: rows.len(),
                got: scores.len(),
            });
        }

        Ok(scores
            .into_iter()
            .map(|s| {
                let churn = s.clamp(0.0, 1.0);
                [1.0 - churn, churn]
            })
            .collect())
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}
