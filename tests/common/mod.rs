//! Shared fixtures: scripted estimators and frame builders.
#![allow(dead_code)]

use ddos_monitor::classify::ClassificationAdapter;
use ddos_monitor::features::FEATURE_DIM;
use ddos_monitor::model::{ClassifierModel, Estimator, ModelError, StandardScaler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Always answers `code`; counts calls and records the last scaled row.
pub struct FixedEstimator {
    pub code: i64,
    pub calls: Arc<AtomicUsize>,
    pub last_row: Arc<Mutex<Vec<f64>>>,
}

impl Estimator for FixedEstimator {
    fn predict(&self, scaled: &[f64]) -> Result<i64, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_row.lock().unwrap() = scaled.to_vec();
        Ok(self.code)
    }
}

pub struct Probe {
    pub calls: Arc<AtomicUsize>,
    pub last_row: Arc<Mutex<Vec<f64>>>,
}

pub fn adapter_with_scaler(code: i64, scaler: StandardScaler) -> (ClassificationAdapter, Probe) {
    let calls = Arc::new(AtomicUsize::new(0));
    let last_row = Arc::new(Mutex::new(Vec::new()));
    let estimator = FixedEstimator {
        code,
        calls: Arc::clone(&calls),
        last_row: Arc::clone(&last_row),
    };
    let model = ClassifierModel::new(scaler, Box::new(estimator));
    (
        ClassificationAdapter::new(Arc::new(model)),
        Probe { calls, last_row },
    )
}

pub fn adapter(code: i64) -> (ClassificationAdapter, Probe) {
    adapter_with_scaler(code, StandardScaler::identity(FEATURE_DIM))
}

/// Ethernet + IPv4 header followed by `l4_len` bytes of a transport header.
pub fn ipv4_frame(protocol: u8, dst_port: u16, l4_len: usize) -> Vec<u8> {
    let mut frame = vec![0u8; 12];
    frame.extend_from_slice(&[0x08, 0x00]);

    let total = (20 + l4_len) as u16;
    let mut ip = vec![0u8; 20];
    ip[0] = 0x45;
    ip[2..4].copy_from_slice(&total.to_be_bytes());
    ip[8] = 64;
    ip[9] = protocol;
    ip[12..16].copy_from_slice(&[10, 0, 0, 1]);
    ip[16..20].copy_from_slice(&[10, 0, 0, 2]);
    frame.extend(ip);

    let mut l4 = vec![0u8; l4_len];
    if l4_len >= 4 {
        l4[0..2].copy_from_slice(&40000u16.to_be_bytes());
        l4[2..4].copy_from_slice(&dst_port.to_be_bytes());
    }
    if l4_len >= 13 {
        l4[12] = 0x50;
    }
    frame.extend(l4);
    frame
}
