//! Feature extraction pipeline: packet batch → flow stats → sanitized vector.

use super::{aggregate, sanitize, FeatureVector};
use crate::capture::RawPacket;

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate the batch and sanitize the result. Every value returned is finite.
    pub fn extract(&self, batch: &[RawPacket]) -> FeatureVector {
        sanitize(&aggregate(batch))
    }
}
