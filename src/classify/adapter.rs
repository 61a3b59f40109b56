use super::{ClassifyError, Prediction};
use crate::features::FeatureVector;
use crate::model::ClassifierModel;
use std::sync::Arc;
use tracing::trace;

/// Orders features canonically, scales, predicts and labels. Failures are returned, never hidden.
#[derive(Clone)]
pub struct ClassificationAdapter {
    model: Arc<ClassifierModel>,
}

impl ClassificationAdapter {
    pub fn new(model: Arc<ClassifierModel>) -> Self {
        Self { model }
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<Prediction, ClassifyError> {
        let row = features
            .to_ordered()
            .map_err(|missing| ClassifyError::Schema { missing })?;
        let scaled = self.model.scale(&row)?;
        let code = self.model.predict(&scaled)?;
        trace!(code, "classifier output");
        Prediction::from_code(code)
    }
}
