//! Packet capture: raw packet view, the blocking source trait, live and replay sources.

mod live;
mod replay;

pub use live::LiveCapture;
pub use replay::ReplaySource;

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::Packet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("network interface '{0}' not found; available: {1:?}")]
    InterfaceNotFound(String, Vec<String>),

    #[error("insufficient privileges to capture on '{0}' (try: sudo setcap cap_net_raw,cap_net_admin=eip)")]
    InsufficientPrivileges(String),

    #[error("interface '{0}' does not provide an ethernet channel")]
    UnsupportedChannel(String),

    #[error("failed to open capture on '{interface}': {source}")]
    Open {
        interface: String,
        #[source]
        source: std::io::Error,
    },

    #[error("packet read failed: {0}")]
    Read(#[source] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacketParseError {
    #[error("tcp packet without a readable destination port")]
    MissingDestinationPort,

    #[error("invalid capture timestamp {0}")]
    InvalidTimestamp(f64),
}

/// One captured packet, reduced to the layers the flow features need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPacket {
    /// Capture time, fractional seconds since the epoch.
    pub timestamp: f64,
    /// Frame length on the wire, bytes.
    pub wire_len: u32,
    pub has_ip: bool,
    pub has_tcp: bool,
    pub dst_port: Option<u16>,
}

/// Fields of an accepted TCP/IP packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketFields {
    pub timestamp: f64,
    pub wire_len: u32,
    pub dst_port: u16,
}

impl RawPacket {
    pub fn tcp(timestamp: f64, wire_len: u32, dst_port: u16) -> Self {
        Self {
            timestamp,
            wire_len,
            has_ip: true,
            has_tcp: true,
            dst_port: Some(dst_port),
        }
    }

    /// Decode an ethernet frame (IPv4 or IPv6, then TCP).
    pub fn from_frame(timestamp: f64, frame: &[u8]) -> Self {
        let mut packet = Self {
            timestamp,
            wire_len: u32::try_from(frame.len()).unwrap_or(u32::MAX),
            has_ip: false,
            has_tcp: false,
            dst_port: None,
        };

        let Some(eth) = EthernetPacket::new(frame) else {
            return packet;
        };
        match eth.get_ethertype() {
            EtherTypes::Ipv4 => {
                if let Some(ip) = Ipv4Packet::new(eth.payload()) {
                    packet.set_transport(ip.get_next_level_protocol(), ip.payload());
                }
            }
            EtherTypes::Ipv6 => {
                if let Some(ip) = Ipv6Packet::new(eth.payload()) {
                    packet.set_transport(ip.get_next_header(), ip.payload());
                }
            }
            _ => {}
        }
        packet
    }

    fn set_transport(&mut self, next: IpNextHeaderProtocol, payload: &[u8]) {
        self.has_ip = true;
        self.has_tcp = next == IpNextHeaderProtocols::Tcp;
        if self.has_tcp {
            self.dst_port = TcpPacket::new(payload).map(|tcp| tcp.get_destination());
        }
    }

    /// Fields needed for flow statistics, or why the packet cannot be used.
    pub fn flow_fields(&self) -> Result<PacketFields, PacketParseError> {
        if !self.timestamp.is_finite() {
            return Err(PacketParseError::InvalidTimestamp(self.timestamp));
        }
        let dst_port = self.dst_port.ok_or(PacketParseError::MissingDestinationPort)?;
        Ok(PacketFields {
            timestamp: self.timestamp,
            wire_len: self.wire_len,
            dst_port,
        })
    }
}

/// Blocking batch source. One call produces one monitoring cycle's batch.
pub trait PacketSource: Send {
    /// Capture up to `count` packets. An interrupted capture returns the partial batch.
    fn next_batch(&mut self, count: usize) -> Result<Vec<RawPacket>, CaptureError>;
}
