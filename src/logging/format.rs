//! JSON log lines: one JSON object per line (ndjson) for the operator console and log shipping.

use crate::classify::Prediction;
use crate::features::FeatureVector;
use crate::monitor::{CycleReport, Status};
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// One line of monitor output: either a cycle report or a status change.
#[derive(Serialize)]
pub struct ReportLine<'a> {
    pub ts: String,
    pub kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<&'a FeatureVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'a Status>,
}

impl<'a> ReportLine<'a> {
    pub fn cycle(report: &'a CycleReport) -> Self {
        Self {
            ts: report.ts.to_rfc3339(),
            kind: "cycle",
            cycle: Some(report.cycle),
            prediction: Some(report.prediction),
            features: Some(&report.features),
            status: None,
        }
    }

    pub fn status(status: &'a Status) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            kind: "status",
            cycle: None,
            prediction: None,
            features: None,
            status: Some(status),
        }
    }
}

/// Initialize tracing, JSON or plain
pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber on stderr, level from RUST_LOG or default. Stdout carries report lines.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    /// Emit a single structured line (e.g. a cycle report) without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(w, "{}", line);
        }
    }
}
