//! Standard scaling `(x - mean) / scale`, parameters exported from the training pipeline as JSON.

use super::ModelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        if mean.len() != scale.len() {
            return Err(ModelError::Dimension {
                expected: mean.len(),
                got: scale.len(),
            });
        }
        Ok(Self { mean, scale })
    }

    /// Pass-through scaler of the given width.
    pub fn identity(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            scale: vec![1.0; dim],
        }
    }

    /// Read `{"mean": [...], "scale": [...]}`.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let data = std::fs::read_to_string(path).map_err(|source| ModelError::Artifact {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: StandardScaler = serde_json::from_str(&data)?;
        Self::new(raw.mean, raw.scale)
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.dim() {
            return Err(ModelError::Dimension {
                expected: self.dim(),
                got: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                // zero-variance columns are left unscaled
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect())
    }
}
