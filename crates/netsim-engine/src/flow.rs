//! Source-to-destination bytestream. Drives a [`CongestionController`] and
//! owns the unacked-packet bookkeeping described in §4.9.

use std::collections::{BTreeMap, HashMap};

use netsim_core::packet::PAYLOAD_PACKET_BYTES;
use netsim_core::{AckPacket, DeviceId, FlowId, PayloadPacket, SimConfig};

use crate::congestion::{AckClass, CongestionController, DropKind};
use crate::queue::{EventAction, EventHandle, EventQueue};
use crate::trace::Logger;

#[derive(Debug, Clone, Copy)]
struct UnackedMeta {
    dispatch_time: f64,
    duplicate_no: u32,
}

pub struct Flow {
    pub id: FlowId,
    pub source_host: DeviceId,
    pub dest_host: DeviceId,
    total_bytes: u64,
    bytes_remaining: u64,
    next_seq_to_emit: u64,
    unacked: BTreeMap<u64, UnackedMeta>,
    /// Last duplicate_no assigned to each seq, retained across
    /// retransmissions even after the prior attempt leaves `unacked`.
    duplicate_no_for_seq: HashMap<u64, u32>,
    controller: CongestionController,
    wake_event: Option<EventHandle>,
    /// Seq flagged by a triple-duplicate ack, to be retransmitted on the next
    /// wake.
    pending_dup_drop: Option<u64>,
    start_time_s: f64,
    started: bool,
    packets_sent: u64,
}

impl Flow {
    pub fn new(
        id: FlowId,
        source_host: DeviceId,
        dest_host: DeviceId,
        total_bytes: u64,
        start_time_s: f64,
        config: &SimConfig,
    ) -> Self {
        Self {
            id,
            source_host,
            dest_host,
            total_bytes,
            bytes_remaining: total_bytes,
            next_seq_to_emit: 0,
            unacked: BTreeMap::new(),
            duplicate_no_for_seq: HashMap::new(),
            controller: CongestionController::new(config),
            wake_event: None,
            pending_dup_drop: None,
            start_time_s,
            started: false,
            packets_sent: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.bytes_remaining == 0 && self.unacked.is_empty()
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    pub fn start_time_s(&self) -> f64 {
        self.start_time_s
    }

    pub fn window(&self) -> f64 {
        self.controller.window()
    }

    pub fn unacked_count(&self) -> usize {
        self.unacked.len()
    }

    /// Schedule the initial `FlowWake` at the configured start time.
    pub fn schedule_start(&mut self, now: f64, queue: &mut EventQueue) {
        self.started = true;
        let delay = (self.start_time_s - now).max(0.0);
        if let Ok(handle) = queue.schedule(now, delay, EventAction::FlowWake { flow: self.id }) {
            self.wake_event = Some(handle);
        }
    }

    /// Invoked when a `FlowWake` event for this flow fires.
    pub fn on_wake(
        &mut self,
        now: f64,
        config: &SimConfig,
        queue: &mut EventQueue,
        logger: &mut Logger,
    ) -> Vec<PayloadPacket> {
        self.refill(now, config, queue, logger)
    }

    /// Invoked when an ack addressed to this flow arrives.
    pub fn acknowledgement_received(
        &mut self,
        ack: &AckPacket,
        now: f64,
        config: &SimConfig,
        queue: &mut EventQueue,
        logger: &mut Logger,
    ) -> Vec<PayloadPacket> {
        match self.controller.record_ack(ack.expected_seq_no) {
            AckClass::Fresh => {
                let acked_seqs: Vec<u64> = self
                    .unacked
                    .iter()
                    .filter(|(&seq, meta)| seq < ack.expected_seq_no && meta.duplicate_no == ack.duplicate_no)
                    .map(|(&seq, _)| seq)
                    .collect();
                for seq in acked_seqs {
                    let meta = self.unacked.remove(&seq).unwrap();
                    let rtt = now - meta.dispatch_time;
                    self.controller.on_ack(rtt);
                    self.bytes_remaining = self.bytes_remaining.saturating_sub(PAYLOAD_PACKET_BYTES as u64);
                    logger.rtt_sample(now, self.id, rtt);
                }
            }
            AckClass::TripleDuplicateAck => {
                self.pending_dup_drop = Some(ack.expected_seq_no);
            }
            AckClass::Duplicate => {}
        }
        logger.window_size(now, self.id, self.controller.window());
        self.refill(now, config, queue, logger)
    }

    fn refill(
        &mut self,
        now: f64,
        config: &SimConfig,
        queue: &mut EventQueue,
        logger: &mut Logger,
    ) -> Vec<PayloadPacket> {
        if let Some(handle) = self.wake_event.take() {
            handle.cancel();
        }

        let timed_out: Vec<u64> = self
            .unacked
            .iter()
            .filter(|(_, meta)| self.controller.is_timed_out(meta.dispatch_time, now))
            .map(|(&seq, _)| seq)
            .collect();
        for seq in timed_out {
            self.unacked.remove(&seq);
            self.controller.queue_retransmit(seq);
            self.controller.on_drop(DropKind::Timeout);
            logger.window_size(now, self.id, self.controller.window());
        }
        if let Some(seq) = self.pending_dup_drop.take() {
            if self.unacked.remove(&seq).is_some() {
                self.controller.queue_retransmit(seq);
                self.controller.on_drop(DropKind::TripleDuplicateAck);
                logger.window_size(now, self.id, self.controller.window());
            }
        }

        let mut to_send = Vec::new();
        while (self.unacked.len() as f64) < self.controller.window().floor().max(1.0) {
            if let Some(seq) = self.controller.pop_retransmit() {
                let dup_no = self.duplicate_no_for_seq.entry(seq).or_insert(0);
                *dup_no += 1;
                self.unacked.insert(seq, UnackedMeta { dispatch_time: now, duplicate_no: *dup_no });
                self.packets_sent += 1;
                to_send.push(PayloadPacket {
                    flow_id: self.id,
                    seq_no: seq,
                    duplicate_no: *dup_no,
                    source_host_id: self.source_host,
                    dest_host_id: self.dest_host,
                });
            } else if self.has_more_to_send() {
                let seq = self.next_seq_to_emit;
                self.next_seq_to_emit += 1;
                self.duplicate_no_for_seq.insert(seq, 0);
                self.unacked.insert(seq, UnackedMeta { dispatch_time: now, duplicate_no: 0 });
                self.packets_sent += 1;
                to_send.push(PayloadPacket {
                    flow_id: self.id,
                    seq_no: seq,
                    duplicate_no: 0,
                    source_host_id: self.source_host,
                    dest_host_id: self.dest_host,
                });
            } else {
                break;
            }
        }

        if !self.unacked.is_empty() || self.has_more_to_send() {
            if let Ok(handle) = queue.schedule(now, config.flow_wake_timeout_s, EventAction::FlowWake { flow: self.id }) {
                self.wake_event = Some(handle);
            }
        }

        to_send
    }

    fn has_more_to_send(&self) -> bool {
        self.next_seq_to_emit * PAYLOAD_PACKET_BYTES as u64 < self.total_bytes
    }
}
