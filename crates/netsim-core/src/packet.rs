//! Wire-level data model. Payload bytes are never modeled, only sizes:
//! fidelity stops at "how many bytes moved", per the packet-content
//! non-goal.

use serde::{Deserialize, Serialize};

use crate::ids::{DeviceId, FlowId};

/// Size, in bytes, of a routing beacon.
pub const ROUTING_PACKET_BYTES: u32 = 32;
/// Size, in bytes, of a payload segment.
pub const PAYLOAD_PACKET_BYTES: u32 = 1024;
/// Size, in bytes, of an acknowledgement.
pub const ACK_PACKET_BYTES: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPacket {
    pub source_host_id: DeviceId,
    /// Virtual time (as milliseconds, to keep the wire format integral) at
    /// which the originating host emitted this beacon.
    pub origin_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadPacket {
    pub flow_id: FlowId,
    pub seq_no: u64,
    pub duplicate_no: u32,
    pub source_host_id: DeviceId,
    pub dest_host_id: DeviceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckPacket {
    pub flow_id: FlowId,
    pub expected_seq_no: u64,
    pub duplicate_no: u32,
    pub source_host_id: DeviceId,
    pub dest_host_id: DeviceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Packet {
    Routing(RoutingPacket),
    Payload(PayloadPacket),
    Ack(AckPacket),
}

impl Packet {
    pub fn size_bytes(&self) -> u32 {
        match self {
            Packet::Routing(_) => ROUTING_PACKET_BYTES,
            Packet::Payload(_) => PAYLOAD_PACKET_BYTES,
            Packet::Ack(_) => ACK_PACKET_BYTES,
        }
    }

    /// The device that originated this packet, as recorded in its header.
    pub fn source_host_id(&self) -> DeviceId {
        match self {
            Packet::Routing(p) => p.source_host_id,
            Packet::Payload(p) => p.source_host_id,
            Packet::Ack(p) => p.source_host_id,
        }
    }

    /// `None` for routing beacons, which are flooded rather than routed to a
    /// single destination.
    pub fn dest_host_id(&self) -> Option<DeviceId> {
        match self {
            Packet::Routing(_) => None,
            Packet::Payload(p) => Some(p.dest_host_id),
            Packet::Ack(p) => Some(p.dest_host_id),
        }
    }

    pub fn duplicate_no(&self) -> Option<u32> {
        match self {
            Packet::Routing(_) => None,
            Packet::Payload(p) => Some(p.duplicate_no),
            Packet::Ack(p) => Some(p.duplicate_no),
        }
    }

    pub fn is_routing(&self) -> bool {
        matches!(self, Packet::Routing(_))
    }
}
