//! Flow-level feature extraction from captured packet batches.

mod flow;
mod pipeline;
mod sanitize;

pub use flow::{aggregate, FlowAccumulator};
pub use pipeline::FeatureExtractor;
pub use sanitize::{is_finite_vector, sanitize};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of features the classifier expects.
pub const FEATURE_DIM: usize = 22;

/// Feature names. Declaration order is the canonical order the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    DestinationPort,
    FlowDuration,
    TotalFwdPackets,
    TotalBackwardPackets,
    TotalLengthofFwdPackets,
    TotalLengthofBwdPackets,
    FwdPacketLengthMax,
    FwdPacketLengthMin,
    FwdPacketLengthMean,
    FwdPacketLengthStd,
    BwdPacketLengthMax,
    BwdPacketLengthMin,
    #[serde(rename = "FlowBytes/s")]
    FlowBytesPerSec,
    #[serde(rename = "FlowPackets/s")]
    FlowPacketsPerSec,
    #[serde(rename = "FwdIATMean")]
    FwdIatMean,
    #[serde(rename = "FwdIATStd")]
    FwdIatStd,
    FwdHeaderLength,
    PacketLengthMean,
    PacketLengthStd,
    AveragePacketSize,
    IdleMean,
    IdleStd,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_DIM] = [
        Feature::DestinationPort,
        Feature::FlowDuration,
        Feature::TotalFwdPackets,
        Feature::TotalBackwardPackets,
        Feature::TotalLengthofFwdPackets,
        Feature::TotalLengthofBwdPackets,
        Feature::FwdPacketLengthMax,
        Feature::FwdPacketLengthMin,
        Feature::FwdPacketLengthMean,
        Feature::FwdPacketLengthStd,
        Feature::BwdPacketLengthMax,
        Feature::BwdPacketLengthMin,
        Feature::FlowBytesPerSec,
        Feature::FlowPacketsPerSec,
        Feature::FwdIatMean,
        Feature::FwdIatStd,
        Feature::FwdHeaderLength,
        Feature::PacketLengthMean,
        Feature::PacketLengthStd,
        Feature::AveragePacketSize,
        Feature::IdleMean,
        Feature::IdleStd,
    ];

    /// Column name used by the training data set.
    pub fn name(self) -> &'static str {
        match self {
            Feature::DestinationPort => "DestinationPort",
            Feature::FlowDuration => "FlowDuration",
            Feature::TotalFwdPackets => "TotalFwdPackets",
            Feature::TotalBackwardPackets => "TotalBackwardPackets",
            Feature::TotalLengthofFwdPackets => "TotalLengthofFwdPackets",
            Feature::TotalLengthofBwdPackets => "TotalLengthofBwdPackets",
            Feature::FwdPacketLengthMax => "FwdPacketLengthMax",
            Feature::FwdPacketLengthMin => "FwdPacketLengthMin",
            Feature::FwdPacketLengthMean => "FwdPacketLengthMean",
            Feature::FwdPacketLengthStd => "FwdPacketLengthStd",
            Feature::BwdPacketLengthMax => "BwdPacketLengthMax",
            Feature::BwdPacketLengthMin => "BwdPacketLengthMin",
            Feature::FlowBytesPerSec => "FlowBytes/s",
            Feature::FlowPacketsPerSec => "FlowPackets/s",
            Feature::FwdIatMean => "FwdIATMean",
            Feature::FwdIatStd => "FwdIATStd",
            Feature::FwdHeaderLength => "FwdHeaderLength",
            Feature::PacketLengthMean => "PacketLengthMean",
            Feature::PacketLengthStd => "PacketLengthStd",
            Feature::AveragePacketSize => "AveragePacketSize",
            Feature::IdleMean => "IdleMean",
            Feature::IdleStd => "IdleStd",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Feature name → value. Keys may be missing; see [`FeatureVector::to_ordered`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<Feature, f64>,
}

impl FeatureVector {
    /// Every canonical feature present and set to 0.
    pub fn zeroed() -> Self {
        Self {
            values: Feature::ALL.iter().map(|&f| (f, 0.0)).collect(),
        }
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied()
    }

    /// Value of `feature`, or 0 when absent.
    pub fn value(&self, feature: Feature) -> f64 {
        self.get(feature).unwrap_or(0.0)
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values.insert(feature, value);
    }

    pub fn remove(&mut self, feature: Feature) -> Option<f64> {
        self.values.remove(&feature)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.values.iter().map(|(&f, &v)| (f, v))
    }

    /// Project into canonical order. Returns the first missing feature on failure.
    pub fn to_ordered(&self) -> Result<[f64; FEATURE_DIM], Feature> {
        let mut out = [0.0; FEATURE_DIM];
        for (slot, feature) in out.iter_mut().zip(Feature::ALL) {
            *slot = self.get(feature).ok_or(feature)?;
        }
        Ok(out)
    }
}

impl FromIterator<(Feature, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (Feature, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
