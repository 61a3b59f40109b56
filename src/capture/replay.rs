//! Replays pre-recorded capture results, one per batch. Used for offline runs and tests.

use super::{CaptureError, PacketSource, RawPacket};
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct ReplaySource {
    script: VecDeque<Result<Vec<RawPacket>, CaptureError>>,
    /// Served once the script runs out.
    fallback: Vec<RawPacket>,
    served: usize,
}

impl ReplaySource {
    pub fn new(batches: impl IntoIterator<Item = Vec<RawPacket>>) -> Self {
        Self::from_results(batches.into_iter().map(Ok))
    }

    /// Script that may include capture failures.
    pub fn from_results(results: impl IntoIterator<Item = Result<Vec<RawPacket>, CaptureError>>) -> Self {
        Self {
            script: results.into_iter().collect(),
            fallback: Vec::new(),
            served: 0,
        }
    }

    /// Batch repeated after the script is exhausted (empty by default).
    pub fn with_fallback(mut self, batch: Vec<RawPacket>) -> Self {
        self.fallback = batch;
        self
    }

    /// Number of `next_batch` calls answered so far.
    pub fn served(&self) -> usize {
        self.served
    }
}

impl PacketSource for ReplaySource {
    fn next_batch(&mut self, count: usize) -> Result<Vec<RawPacket>, CaptureError> {
        self.served += 1;
        let mut batch = match self.script.pop_front() {
            Some(result) => result?,
            None => self.fallback.clone(),
        };
        batch.truncate(count);
        Ok(batch)
    }
}
