//! ddos-monitor: live flow-feature extraction and DDoS classification for one interface.
//!
//! Modular structure:
//! - [`capture`]: Raw packet view, live (pnet) and replay packet sources
//! - [`features`]: Flow metrics aggregation and sanitization
//! - [`model`]: Feature scaler and ONNX binary classifier
//! - [`classify`]: Classification adapter: feature vector → benign/attack
//! - [`monitor`]: Periodic monitoring scheduler and event stream
//! - [`logging`]: Tracing setup and ndjson report lines

pub mod config;
pub mod capture;
pub mod features;
pub mod model;
pub mod classify;
pub mod monitor;
pub mod logging;

pub use config::MonitorConfig;
pub use capture::{PacketSource, RawPacket};
pub use features::{Feature, FeatureVector, FeatureExtractor};
pub use model::ClassifierModel;
pub use classify::{ClassificationAdapter, Prediction};
pub use monitor::{Monitor, MonitorEvent, Status};
pub use logging::StructuredLogger;
