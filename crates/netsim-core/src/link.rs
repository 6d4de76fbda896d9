//! Half-duplex transmission channel.
//!
//! `Link` owns the pure, time-independent-of-the-event-queue parts of §4.4:
//! buffer bookkeeping and the arithmetic of transmission/propagation delay.
//! Actually scheduling `PacketArrival`/`LinkReady` events against those
//! numbers is the engine's job (it is the only thing that touches the event
//! queue), which keeps this crate free of any dependency on the scheduler.

use serde::{Deserialize, Serialize};

use crate::buffer::{Buffer, Direction};
use crate::ids::{DeviceId, LinkId};
use crate::packet::Packet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkSpec {
    pub id: LinkId,
    pub rate_bytes_per_sec: f64,
    pub propagation_delay_s: f64,
    pub buffer_capacity_bytes: u64,
    pub endpoint_a: DeviceId,
    pub endpoint_b: DeviceId,
}

#[derive(Debug)]
pub struct Link {
    pub spec: LinkSpec,
    pub buffer: Buffer,
    /// Virtual time at which the link becomes free to start a new
    /// transmission. `now >= busy_until` means idle.
    pub busy_until: f64,
    /// Direction of the packet currently "on the wire", if any.
    pub current_direction: Option<Direction>,
}

impl Link {
    pub fn new(spec: LinkSpec) -> Self {
        Self {
            buffer: Buffer::new(spec.buffer_capacity_bytes),
            spec,
            busy_until: 0.0,
            current_direction: None,
        }
    }

    pub fn id(&self) -> LinkId {
        self.spec.id
    }

    pub fn is_idle(&self, now: f64) -> bool {
        now >= self.busy_until
    }

    /// Which direction a packet travels in to reach `target` from whichever
    /// endpoint sent it.
    pub fn direction_toward(&self, target: DeviceId) -> Option<Direction> {
        if target == self.spec.endpoint_b {
            Some(Direction::ToB)
        } else if target == self.spec.endpoint_a {
            Some(Direction::ToA)
        } else {
            None
        }
    }

    pub fn target_of(&self, direction: Direction) -> DeviceId {
        match direction {
            Direction::ToA => self.spec.endpoint_a,
            Direction::ToB => self.spec.endpoint_b,
        }
    }

    pub fn other_endpoint(&self, device: DeviceId) -> Option<DeviceId> {
        if device == self.spec.endpoint_a {
            Some(self.spec.endpoint_b)
        } else if device == self.spec.endpoint_b {
            Some(self.spec.endpoint_a)
        } else {
            None
        }
    }

    pub fn transmission_delay(&self, packet: &Packet) -> f64 {
        packet.size_bytes() as f64 / self.spec.rate_bytes_per_sec
    }

    /// Marks the link busy from `now` through the packet's transmission
    /// delay, recording `direction` as the one currently on the wire.
    /// Returns `(busy_until, arrival_time)`.
    pub fn begin_transmission(
        &mut self,
        now: f64,
        packet: &Packet,
        direction: Direction,
    ) -> (f64, f64) {
        let transmission_delay = self.transmission_delay(packet);
        let busy_until = now + transmission_delay;
        self.busy_until = busy_until;
        self.current_direction = Some(direction);
        let arrival_time = busy_until + self.spec.propagation_delay_s;
        (busy_until, arrival_time)
    }

    pub fn end_transmission(&mut self) {
        self.current_direction = None;
    }
}
