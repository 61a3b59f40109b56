//! Pre-trained classifier: feature scaling plus a binary estimator.
//!
//! Both parts are loaded once at startup and shared read-only through an `Arc<ClassifierModel>`.

mod onnx;
mod scaler;

pub use onnx::OnnxClassifier;
pub use scaler::StandardScaler;

use crate::config::ModelConfig;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model artifact {path} not readable: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scaler artifact is not valid JSON: {0}")]
    ScalerFormat(#[from] serde_json::Error),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },

    #[error("inference failed: {0}")]
    Inference(#[from] ort::Error),

    #[error("model produced no class label")]
    EmptyOutput,
}

/// Produces an integer class code from a scaled feature row.
pub trait Estimator: Send + Sync {
    fn predict(&self, scaled: &[f64]) -> Result<i64, ModelError>;
}

pub struct ClassifierModel {
    scaler: StandardScaler,
    estimator: Box<dyn Estimator>,
}

impl ClassifierModel {
    pub fn new(scaler: StandardScaler, estimator: Box<dyn Estimator>) -> Self {
        Self { scaler, estimator }
    }

    /// Load the scaler JSON and the ONNX classifier named in `config`.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let scaler = StandardScaler::load(&config.scaler_path)?;
        let estimator = OnnxClassifier::load(&config.model_path)?;
        tracing::info!(
            model = %config.model_path.display(),
            scaler = %config.scaler_path.display(),
            dim = scaler.dim(),
            "classifier loaded"
        );
        Ok(Self::new(scaler, Box::new(estimator)))
    }

    pub fn scale(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.scaler.transform(row)
    }

    pub fn predict(&self, scaled: &[f64]) -> Result<i64, ModelError> {
        self.estimator.predict(scaled)
    }
}
