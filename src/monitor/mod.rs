//! Monitoring scheduler: drives capture → features → classification cycles and publishes results.
//!
//! The presentation layer only sees [`MonitorEvent`]s from [`Monitor::subscribe`] plus the
//! read-only accessors on [`Monitor`]; nothing here renders.

mod scheduler;

pub use scheduler::Monitor;

use crate::capture::CaptureError;
use crate::classify::{ClassifyError, Prediction};
use crate::features::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Idle,
    Monitoring,
    Stopped,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Idle => f.write_str("idle"),
            Lifecycle::Monitoring => f.write_str("monitoring"),
            Lifecycle::Stopped => f.write_str("stopped"),
        }
    }
}

/// Operator-visible status. `Error` carries the fault description of the last failed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Status {
    Idle,
    Monitoring,
    Stopped,
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("Idle"),
            Status::Monitoring => f.write_str("Monitoring..."),
            Status::Stopped => f.write_str("Stopped"),
            Status::Error(msg) => write!(f, "Error - {}", msg),
        }
    }
}

/// Result of one successful cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub session: Uuid,
    /// 1-based; restarts after a reset.
    pub cycle: u64,
    pub ts: DateTime<Utc>,
    pub features: FeatureVector,
    pub prediction: Prediction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    Status(Status),
    Cycle(CycleReport),
    /// Series and cycle counter were cleared.
    Reset,
}

#[derive(Error, Debug, PartialEq)]
pub enum LifecycleError {
    #[error("cannot {action} while {from}")]
    InvalidTransition { action: &'static str, from: Lifecycle },
}

/// Why a single cycle produced no report.
#[derive(Error, Debug)]
pub enum CycleFault {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("capture worker failed: {0}")]
    Worker(String),
}
