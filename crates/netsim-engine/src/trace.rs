//! Structured log channels (§6) plus the `tracing`-based human trace.
//!
//! These are deliberately two different things. The channels below are the
//! contract an out-of-scope statistics module consumes; they are complete and
//! mechanical. The `tracing` calls sprinkled through the engine are for a
//! developer staring at a terminal and are never read back by this crate.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use netsim_core::{DeviceId, FlowId, LinkId, SimConfig};

use crate::queue::EventAction;

#[derive(Debug, Clone, Copy, Serialize)]
pub enum Direction {
    ToA,
    ToB,
}

impl From<netsim_core::Direction> for Direction {
    fn from(d: netsim_core::Direction) -> Self {
        match d {
            netsim_core::Direction::ToA => Direction::ToA,
            netsim_core::Direction::ToB => Direction::ToB,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketSentRecord {
    pub time: f64,
    pub packet_id: u64,
    pub link_id: LinkId,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketArrivedRecord {
    pub time: f64,
    pub packet_id: u64,
    pub device_id: DeviceId,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum DropReason {
    BufferFull,
    NoRoute,
    UnexpectedPacket,
    DeterministicFaultInjection,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketDroppedRecord {
    pub time: f64,
    pub packet_id: u64,
    pub link_id: Option<LinkId>,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct BufferOccupancyRecord {
    pub time: f64,
    pub link_id: LinkId,
    pub used_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowSizeRecord {
    pub time: f64,
    pub flow_id: FlowId,
    pub window: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RttSampleRecord {
    pub time: f64,
    pub flow_id: FlowId,
    pub rtt: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowRateRecord {
    pub time: f64,
    pub flow_id: FlowId,
    pub bytes_in_interval: u64,
}

/// Monotonic id assigned to every packet as it is sent, purely so log records
/// can refer to "this particular packet" without embedding its full contents.
#[derive(Debug, Default)]
pub struct PacketIdAllocator {
    next: u64,
}

impl PacketIdAllocator {
    pub fn next(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Logger {
    pub packet_sent: Vec<PacketSentRecord>,
    pub packet_arrived: Vec<PacketArrivedRecord>,
    pub packet_dropped: Vec<PacketDroppedRecord>,
    pub buffer_occupancy: Vec<BufferOccupancyRecord>,
    pub window_size: Vec<WindowSizeRecord>,
    pub rtt_sample: Vec<RttSampleRecord>,
    pub flow_rate: Vec<FlowRateRecord>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packet_sent(&mut self, time: f64, packet_id: u64, link_id: LinkId, direction: netsim_core::Direction) {
        debug!(time, packet_id, link_id, "packet sent");
        self.packet_sent.push(PacketSentRecord { time, packet_id, link_id, direction: direction.into() });
    }

    pub fn packet_arrived(&mut self, time: f64, packet_id: u64, device_id: DeviceId) {
        debug!(time, packet_id, device_id, "packet arrived");
        self.packet_arrived.push(PacketArrivedRecord { time, packet_id, device_id });
    }

    pub fn packet_dropped(&mut self, time: f64, packet_id: u64, link_id: Option<LinkId>, reason: DropReason) {
        warn!(time, packet_id, ?reason, "packet dropped");
        self.packet_dropped.push(PacketDroppedRecord { time, packet_id, link_id, reason });
    }

    pub fn buffer_occupancy(&mut self, time: f64, link_id: LinkId, used_bytes: u64) {
        self.buffer_occupancy.push(BufferOccupancyRecord { time, link_id, used_bytes });
    }

    pub fn window_size(&mut self, time: f64, flow_id: FlowId, window: f64) {
        self.window_size.push(WindowSizeRecord { time, flow_id, window });
    }

    pub fn rtt_sample(&mut self, time: f64, flow_id: FlowId, rtt: f64) {
        self.rtt_sample.push(RttSampleRecord { time, flow_id, rtt });
    }

    pub fn flow_rate(&mut self, time: f64, flow_id: FlowId, bytes_in_interval: u64) {
        self.flow_rate.push(FlowRateRecord { time, flow_id, bytes_in_interval });
    }

    pub fn event(&self, verbose: bool, time: f64, action: &EventAction) {
        if verbose {
            info!(time, ?action, "processing event");
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub config: SimConfig,
    pub duration_s: f64,
    pub packet_sent: Vec<PacketSentRecord>,
    pub packet_arrived: Vec<PacketArrivedRecord>,
    pub packet_dropped: Vec<PacketDroppedRecord>,
    pub buffer_occupancy: Vec<BufferOccupancyRecord>,
    pub window_size: Vec<WindowSizeRecord>,
    pub rtt_sample: Vec<RttSampleRecord>,
    pub flow_rate: Vec<FlowRateRecord>,
    pub flows_finished: HashMap<FlowId, bool>,
}
