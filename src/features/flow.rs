//! Running flow statistics over one captured batch.
//!
//! Every accepted packet is counted as forward traffic; responses are not separated within a
//! single capture. Backward, inter-arrival and idle fields are part of the schema but stay 0.

use super::{Feature, FeatureVector};
use crate::capture::{PacketFields, RawPacket};
use tracing::{debug, trace, warn};

const MICROS_PER_SEC: f64 = 1e6;

/// Accumulators for one batch. Dropped when the batch is finished.
#[derive(Debug, Clone)]
pub struct FlowAccumulator {
    first_ts: Option<f64>,
    last_ts: Option<f64>,
    destination_port: u16,
    fwd_lengths: Vec<f64>,
    bwd_lengths: Vec<f64>,
    fwd_total: f64,
    bwd_total: f64,
    fwd_max: f64,
    fwd_min: f64,
    bwd_max: f64,
    bwd_min: f64,
    /// Packets without IP or TCP.
    pub filtered: usize,
    pub malformed: usize,
}

impl Default for FlowAccumulator {
    fn default() -> Self {
        Self {
            first_ts: None,
            last_ts: None,
            destination_port: 0,
            fwd_lengths: Vec::new(),
            bwd_lengths: Vec::new(),
            fwd_total: 0.0,
            bwd_total: 0.0,
            fwd_max: 0.0,
            // no observation yet
            fwd_min: f64::INFINITY,
            bwd_max: 0.0,
            bwd_min: f64::INFINITY,
            filtered: 0,
            malformed: 0,
        }
    }
}

impl FlowAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> usize {
        self.fwd_lengths.len() + self.bwd_lengths.len()
    }

    /// Feed one packet. Non-TCP packets are filtered and malformed ones skipped.
    pub fn push(&mut self, packet: &RawPacket) {
        if !packet.has_ip || !packet.has_tcp {
            self.filtered += 1;
            trace!(len = packet.wire_len, "packet without ip/tcp filtered");
            return;
        }
        match packet.flow_fields() {
            Ok(fields) => self.observe(fields),
            Err(e) => {
                self.malformed += 1;
                warn!(error = %e, "skipping malformed packet");
            }
        }
    }

    fn observe(&mut self, p: PacketFields) {
        if self.first_ts.is_none() {
            self.first_ts = Some(p.timestamp);
        }
        self.last_ts = Some(p.timestamp);

        let len = f64::from(p.wire_len);
        self.fwd_total += len;
        self.fwd_lengths.push(len);
        self.fwd_max = self.fwd_max.max(len);
        self.fwd_min = self.fwd_min.min(len);
        self.destination_port = p.dst_port;
    }

    /// Finalize into an unsanitized vector. Empty min fields are still `+inf` here.
    pub fn finish(self) -> FeatureVector {
        let mut fv = FeatureVector::zeroed();

        let duration_us = match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) => (last - first) * MICROS_PER_SEC,
            _ => 0.0,
        };

        fv.set(Feature::DestinationPort, f64::from(self.destination_port));
        fv.set(Feature::FlowDuration, duration_us);
        fv.set(Feature::TotalFwdPackets, self.fwd_lengths.len() as f64);
        fv.set(Feature::TotalBackwardPackets, self.bwd_lengths.len() as f64);
        fv.set(Feature::TotalLengthofFwdPackets, self.fwd_total);
        fv.set(Feature::TotalLengthofBwdPackets, self.bwd_total);
        fv.set(Feature::FwdPacketLengthMax, self.fwd_max);
        fv.set(Feature::FwdPacketLengthMin, self.fwd_min);
        fv.set(Feature::BwdPacketLengthMax, self.bwd_max);
        fv.set(Feature::BwdPacketLengthMin, self.bwd_min);

        if let Some((mean, std)) = mean_std(&self.fwd_lengths) {
            fv.set(Feature::FwdPacketLengthMean, mean);
            fv.set(Feature::FwdPacketLengthStd, std);
        }

        let all: Vec<f64> = self
            .fwd_lengths
            .iter()
            .chain(self.bwd_lengths.iter())
            .copied()
            .collect();
        if let Some((mean, std)) = mean_std(&all) {
            fv.set(Feature::PacketLengthMean, mean);
            fv.set(Feature::PacketLengthStd, std);
            fv.set(Feature::AveragePacketSize, mean);
        }

        if duration_us > 0.0 {
            let secs = duration_us / MICROS_PER_SEC;
            fv.set(Feature::FlowBytesPerSec, (self.fwd_total + self.bwd_total) / secs);
            fv.set(Feature::FlowPacketsPerSec, all.len() as f64 / secs);
        }

        fv
    }
}

/// Arithmetic mean and population standard deviation; `None` for an empty slice.
fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

/// Reduce a batch to one feature vector. The result is not sanitized.
pub fn aggregate(batch: &[RawPacket]) -> FeatureVector {
    let mut acc = FlowAccumulator::new();
    for packet in batch {
        acc.push(packet);
    }
    debug!(
        packets = batch.len(),
        accepted = acc.accepted(),
        filtered = acc.filtered,
        malformed = acc.malformed,
        "batch aggregated"
    );
    acc.finish()
}
