//! Maps a sanitized feature vector to a benign/attack verdict via the injected classifier model.

mod adapter;

pub use adapter::ClassificationAdapter;

use crate::features::Feature;
use crate::model::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    Benign,
    Attack,
}

impl Prediction {
    pub fn from_code(code: i64) -> Result<Self, ClassifyError> {
        match code {
            0 => Ok(Prediction::Benign),
            1 => Ok(Prediction::Attack),
            other => Err(ClassifyError::ModelOutput { code: other }),
        }
    }

    pub fn is_attack(self) -> bool {
        self == Prediction::Attack
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Benign => f.write_str("BENIGN"),
            Prediction::Attack => f.write_str("DDoS"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("feature vector is missing '{missing}'")]
    Schema { missing: Feature },

    #[error("classifier returned unexpected class code {code}")]
    ModelOutput { code: i64 },

    #[error(transparent)]
    Model(#[from] ModelError),
}
