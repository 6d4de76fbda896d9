//! Event loop (§4.11): pops the next event, advances the clock to it, and
//! dispatches by `EventAction` variant. This is the only place that owns both
//! the link fabric and the devices sitting on it.

use std::collections::HashMap;

use netsim_core::{
    Clock, DeviceId, DeviceKind, Direction, EnqueueOutcome, FlowId, Link, LinkId, Packet,
    SimConfig, Topology,
};

use crate::flow::Flow;
use crate::host::{Host, HostAction};
use crate::queue::{EventAction, EventQueue};
use crate::router::{Router, RouterAction};
use crate::trace::{DropReason, Logger, PacketIdAllocator, SimulationReport};

/// A safety valve against a scheduling bug turning into an infinite loop;
/// no real topology in this exercise's scope gets anywhere near this many
/// events.
const MAX_EVENTS: u64 = 50_000_000;

pub struct Simulation {
    clock: Clock,
    queue: EventQueue,
    logger: Logger,
    packet_ids: PacketIdAllocator,
    config: SimConfig,
    device_kinds: Vec<DeviceKind>,
    links: Vec<Link>,
    hosts: HashMap<DeviceId, Host>,
    routers: HashMap<DeviceId, Router>,
    flows: Vec<Flow>,
    fault_drop_payload_seq: Option<u64>,
    fault_drop_ack_seq: Option<u64>,
}

impl Simulation {
    pub fn from_topology(topology: &Topology, config: SimConfig) -> Self {
        let mut queue = EventQueue::new();
        let mut hosts = HashMap::new();
        let mut routers = HashMap::new();

        for (idx, kind) in topology.device_kinds.iter().enumerate() {
            let id = idx as DeviceId;
            match kind {
                DeviceKind::Host => {
                    let link = topology.device_links[idx]
                        .first()
                        .copied()
                        .expect("host must be attached to exactly one link");
                    hosts.insert(id, Host::new(id, link));
                    let _ = queue.schedule(0.0, 0.0, EventAction::RoutingUpdate { host: id });
                }
                DeviceKind::Router => {
                    routers.insert(id, Router::new(id, topology.device_links[idx].clone()));
                }
            }
        }

        let links = topology.links.iter().map(|spec| Link::new(*spec)).collect();

        let mut flows = Vec::with_capacity(topology.flows.len());
        for spec in &topology.flows {
            let mut flow = Flow::new(
                spec.id,
                spec.source_host,
                spec.dest_host,
                spec.total_bytes,
                spec.start_time_s,
                &config,
            );
            flow.schedule_start(0.0, &mut queue);
            flows.push(flow);
        }

        Self {
            clock: Clock::new(),
            queue,
            logger: Logger::new(),
            packet_ids: PacketIdAllocator::default(),
            config,
            device_kinds: topology.device_kinds.clone(),
            links,
            hosts,
            routers,
            flows,
            fault_drop_payload_seq: None,
            fault_drop_ack_seq: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// The link a router currently forwards packets toward `dest` on, or
    /// `None` if its table has no route yet. Used by tests to check routing
    /// convergence; the engine itself never needs to peek at this.
    pub fn router_route(&self, router: DeviceId, dest: DeviceId) -> Option<LinkId> {
        self.routers.get(&router)?.routing_table().lookup(dest)
    }

    /// Adds a flow outside of the topology it was constructed from; used by
    /// the scenario harness, which builds a bare two-host link and starts
    /// flows from `TestAction::FlowStart` instead of a topology file.
    pub fn add_flow(&mut self, source_host: DeviceId, dest_host: DeviceId, total_bytes: u64, start_time_s: f64) -> FlowId {
        let id = self.flows.len() as FlowId;
        let mut flow = Flow::new(id, source_host, dest_host, total_bytes, start_time_s, &self.config);
        flow.schedule_start(self.clock.now(), &mut self.queue);
        self.flows.push(flow);
        id
    }

    /// One-shot deterministic fault injection for the scenario harness: the
    /// next payload packet carrying this seq is dropped instead of sent.
    pub fn drop_next_payload_seq(&mut self, seq: u64) {
        self.fault_drop_payload_seq = Some(seq);
    }

    pub fn drop_next_ack_seq(&mut self, seq: u64) {
        self.fault_drop_ack_seq = Some(seq);
    }

    /// Runs until every flow has finished or the event queue drains (the
    /// latter never happens in practice since beacons reschedule themselves
    /// forever, but an empty topology should still terminate cleanly).
    pub fn run(&mut self) {
        let mut processed = 0u64;
        loop {
            if self.flows.iter().all(|f| f.is_finished()) {
                break;
            }
            let Some((time, action)) = self.queue.pop_next() else { break };
            self.clock.advance_to(time);
            self.logger.event(self.config.verbose, time, &action);
            match action {
                EventAction::PacketArrival { link, packet, target, packet_id } => {
                    self.on_packet_arrival(link, packet, target, packet_id, time);
                }
                EventAction::LinkReady { link } => self.on_link_ready(link, time),
                EventAction::FlowWake { flow } => self.on_flow_wake(flow, time),
                EventAction::RoutingUpdate { host } => self.on_routing_update(host, time),
            }
            processed += 1;
            if processed >= MAX_EVENTS {
                break;
            }
        }
    }

    pub fn export_report(self) -> SimulationReport {
        let flows_finished = self.flows.iter().map(|f| (f.id, f.is_finished())).collect();
        SimulationReport {
            config: self.config,
            duration_s: self.clock.now(),
            packet_sent: self.logger.packet_sent,
            packet_arrived: self.logger.packet_arrived,
            packet_dropped: self.logger.packet_dropped,
            buffer_occupancy: self.logger.buffer_occupancy,
            window_size: self.logger.window_size,
            rtt_sample: self.logger.rtt_sample,
            flow_rate: self.logger.flow_rate,
            flows_finished,
        }
    }

    fn on_packet_arrival(&mut self, link: LinkId, packet: Packet, target: DeviceId, packet_id: u64, now: f64) {
        self.logger.packet_arrived(now, packet_id, target);
        match self.device_kinds[target as usize] {
            DeviceKind::Host => self.deliver_to_host(link, packet, target, packet_id, now),
            DeviceKind::Router => self.deliver_to_router(link, packet, target, packet_id, now),
        }
    }

    fn deliver_to_host(&mut self, link: LinkId, packet: Packet, target: DeviceId, packet_id: u64, now: f64) {
        let action = match self.hosts.get_mut(&target) {
            Some(host) => host.handle_packet(packet),
            None => return,
        };
        match action {
            HostAction::Send(reply) => self.emit_from_device(target, reply, now),
            HostAction::AckForFlow(ack) => {
                let idx = ack.flow_id as usize;
                if idx >= self.flows.len() {
                    return;
                }
                let to_send = self.flows[idx].acknowledgement_received(&ack, now, &self.config, &mut self.queue, &mut self.logger);
                let source = self.flows[idx].source_host;
                for p in to_send {
                    self.emit_from_device(source, Packet::Payload(p), now);
                }
            }
            HostAction::Unexpected => {
                self.logger.packet_dropped(now, packet_id, Some(link), DropReason::UnexpectedPacket);
            }
        }
    }

    fn deliver_to_router(&mut self, link: LinkId, packet: Packet, target: DeviceId, packet_id: u64, now: f64) {
        let action = match self.routers.get_mut(&target) {
            Some(router) => router.handle_packet(packet, link, now),
            None => return,
        };
        match action {
            RouterAction::Forward(forwards) => {
                for (out_link, p) in forwards {
                    if let Some(next_hop) = self.links[out_link as usize].other_endpoint(target) {
                        self.dispatch(out_link, next_hop, p, now);
                    }
                }
            }
            RouterAction::Drop(reason) => {
                self.logger.packet_dropped(now, packet_id, Some(link), reason);
            }
            RouterAction::Ignored => {}
        }
    }

    fn on_link_ready(&mut self, link_id: LinkId, now: f64) {
        self.links[link_id as usize].end_transmission();
        let next = self.links[link_id as usize].buffer.dequeue();
        if let Some((packet, direction)) = next {
            let used = self.links[link_id as usize].buffer.used_bytes();
            self.logger.buffer_occupancy(now, link_id, used);
            self.begin_send(link_id, direction, packet, now);
        }
    }

    fn on_flow_wake(&mut self, flow_id: FlowId, now: f64) {
        let idx = flow_id as usize;
        if idx >= self.flows.len() {
            return;
        }
        let to_send = self.flows[idx].on_wake(now, &self.config, &mut self.queue, &mut self.logger);
        let source = self.flows[idx].source_host;
        let window = self.flows[idx].window();
        self.logger.window_size(now, flow_id, window);
        for p in to_send {
            self.emit_from_device(source, Packet::Payload(p), now);
        }
    }

    fn on_routing_update(&mut self, host_id: DeviceId, now: f64) {
        if let Some(host) = self.hosts.get(&host_id) {
            let beacon = host.emit_beacon(now);
            self.emit_from_device(host_id, Packet::Routing(beacon), now);
        }
        let _ = self.queue.schedule(now, self.config.beacon_interval_s, EventAction::RoutingUpdate { host: host_id });
    }

    /// Sends `packet` out a host's own attached link, toward whatever sits on
    /// the other end. Routers forward via the specific out-link their routing
    /// table picked (see `deliver_to_router`), not through here.
    fn emit_from_device(&mut self, device: DeviceId, packet: Packet, now: f64) {
        let Some(link_id) = self.hosts.get(&device).map(|h| h.link) else { return };
        let Some(next_hop) = self.links[link_id as usize].other_endpoint(device) else { return };
        self.dispatch(link_id, next_hop, packet, now);
    }

    fn dispatch(&mut self, link_id: LinkId, target: DeviceId, packet: Packet, now: f64) {
        if self.should_drop(&packet) {
            let packet_id = self.packet_ids.next();
            self.logger.packet_dropped(now, packet_id, Some(link_id), DropReason::DeterministicFaultInjection);
            return;
        }
        let direction = match self.links[link_id as usize].direction_toward(target) {
            Some(d) => d,
            None => return,
        };
        if self.links[link_id as usize].is_idle(now) {
            self.begin_send(link_id, direction, packet, now);
        } else {
            let link = &mut self.links[link_id as usize];
            match link.buffer.enqueue(packet, direction) {
                EnqueueOutcome::Accepted => {
                    let used = link.buffer.used_bytes();
                    self.logger.buffer_occupancy(now, link_id, used);
                }
                EnqueueOutcome::Dropped => {
                    let packet_id = self.packet_ids.next();
                    self.logger.packet_dropped(now, packet_id, Some(link_id), DropReason::BufferFull);
                }
            }
        }
    }

    fn begin_send(&mut self, link_id: LinkId, direction: Direction, packet: Packet, now: f64) {
        let link = &mut self.links[link_id as usize];
        let target = link.target_of(direction);
        let (busy_until, arrival_time) = link.begin_transmission(now, &packet, direction);
        let packet_id = self.packet_ids.next();
        self.logger.packet_sent(now, packet_id, link_id, direction);
        let _ = self.queue.schedule_at(now, busy_until, EventAction::LinkReady { link: link_id });
        let _ = self.queue.schedule_at(now, arrival_time, EventAction::PacketArrival { link: link_id, packet, target, packet_id });
    }

    fn should_drop(&mut self, packet: &Packet) -> bool {
        match packet {
            Packet::Payload(p) if self.fault_drop_payload_seq == Some(p.seq_no) => {
                self.fault_drop_payload_seq = None;
                true
            }
            Packet::Ack(a) if self.fault_drop_ack_seq == Some(a.expected_seq_no) => {
                self.fault_drop_ack_seq = None;
                true
            }
            _ => false,
        }
    }
}
