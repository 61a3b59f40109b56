//! Live capture on one interface through a pnet datalink channel.

use super::{CaptureError, PacketSource, RawPacket};
use chrono::Utc;
use pnet::datalink::{self, Channel, Config, DataLinkReceiver};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct LiveCapture {
    interface: String,
    read_timeout: Duration,
    /// Operator cancel. Checked between reads; a set flag ends the batch early.
    interrupt: Arc<AtomicBool>,
    rx: Option<Box<dyn DataLinkReceiver>>,
}

impl LiveCapture {
    /// The channel is opened lazily by the first `next_batch` call.
    pub fn new(interface: impl Into<String>, read_timeout: Duration, interrupt: Arc<AtomicBool>) -> Self {
        Self {
            interface: interface.into(),
            read_timeout,
            interrupt,
            rx: None,
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }

    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces().into_iter().map(|i| i.name).collect()
    }

    fn open(&self) -> Result<Box<dyn DataLinkReceiver>, CaptureError> {
        let iface = datalink::interfaces()
            .into_iter()
            .find(|i| i.name == self.interface)
            .ok_or_else(|| CaptureError::InterfaceNotFound(self.interface.clone(), Self::list_interfaces()))?;

        let config = Config {
            read_timeout: Some(self.read_timeout),
            ..Default::default()
        };
        match datalink::channel(&iface, config) {
            Ok(Channel::Ethernet(_, rx)) => {
                info!(interface = %self.interface, "capture channel opened");
                Ok(rx)
            }
            Ok(_) => Err(CaptureError::UnsupportedChannel(self.interface.clone())),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(CaptureError::InsufficientPrivileges(self.interface.clone()))
            }
            Err(source) => Err(CaptureError::Open {
                interface: self.interface.clone(),
                source,
            }),
        }
    }
}

impl PacketSource for LiveCapture {
    fn next_batch(&mut self, count: usize) -> Result<Vec<RawPacket>, CaptureError> {
        let mut rx = match self.rx.take() {
            Some(rx) => rx,
            None => self.open()?,
        };
        let mut batch = Vec::with_capacity(count);

        while batch.len() < count {
            if self.interrupt.load(Ordering::Relaxed) {
                debug!(captured = batch.len(), "capture interrupted; returning partial batch");
                break;
            }
            match rx.next() {
                Ok(frame) => {
                    let ts = Utc::now().timestamp_micros() as f64 / 1e6;
                    batch.push(RawPacket::from_frame(ts, frame));
                }
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted) => {}
                Err(e) => {
                    // channel dropped here; the next batch reopens it
                    warn!(interface = %self.interface, error = %e, "capture read failed");
                    return Err(CaptureError::Read(e));
                }
            }
        }
        self.rx = Some(rx);
        Ok(batch)
    }
}
