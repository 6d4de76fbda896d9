//! End-host: acks inbound payload segments via its [`PacketTracker`] and
//! floods periodic routing beacons on its attached link (§4.8).

use std::collections::HashMap;

use netsim_core::{AckPacket, DeviceId, FlowId, LinkId, Packet, PacketTracker, RoutingPacket};

pub enum HostAction {
    /// Emit this packet onto the host's own link (an ack, typically).
    Send(Packet),
    /// An ack addressed here belongs to a flow the simulation tracks, not the
    /// host; hand it upward.
    AckForFlow(AckPacket),
    Unexpected,
}

pub struct Host {
    pub id: DeviceId,
    pub link: LinkId,
    trackers: HashMap<FlowId, PacketTracker>,
}

impl Host {
    pub fn new(id: DeviceId, link: LinkId) -> Self {
        Self { id, link, trackers: HashMap::new() }
    }

    pub fn handle_packet(&mut self, packet: Packet) -> HostAction {
        match packet {
            Packet::Payload(p) => {
                let tracker = self.trackers.entry(p.flow_id).or_insert_with(PacketTracker::new);
                let expected_seq_no = tracker.record(p.seq_no);
                HostAction::Send(Packet::Ack(AckPacket {
                    flow_id: p.flow_id,
                    expected_seq_no,
                    duplicate_no: p.duplicate_no,
                    source_host_id: self.id,
                    dest_host_id: p.source_host_id,
                }))
            }
            Packet::Ack(a) => HostAction::AckForFlow(a),
            Packet::Routing(_) => HostAction::Unexpected,
        }
    }

    pub fn emit_beacon(&self, now: f64) -> RoutingPacket {
        RoutingPacket { source_host_id: self.id, origin_time_ms: (now * 1000.0) as u64 }
    }
}
