//! ONNX Runtime inference for the binary classifier. Input: [1, feature_dim] f32, Output: class label.
//! Uses `ort`; expects a converted scikit-learn style model whose first output is the label tensor.

use super::{Estimator, ModelError};
use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::Artifact {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let session = Session::builder()?.commit_from_file(path)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "label".to_string());

        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }
}

impl Estimator for OnnxClassifier {
    fn predict(&self, scaled: &[f64]) -> Result<i64, ModelError> {
        let row: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        let dim = row.len();
        let arr = Array2::from_shape_vec((1, dim), row).map_err(|_| ModelError::Dimension {
            expected: dim,
            got: scaled.len(),
        })?;
        let input = Tensor::from_array(arr)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input]?)?;
        let labels = outputs[self.output_name.as_str()].try_extract_tensor::<i64>()?;
        labels.iter().next().copied().ok_or(ModelError::EmptyOutput)
    }
}
