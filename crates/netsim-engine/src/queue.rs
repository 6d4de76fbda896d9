//! Min-heap of scheduled events keyed by (time, insertion-sequence).
//!
//! Cancellation is implemented the way a `Rc<Cell<bool>>`-backed timer handle
//! usually is in single-threaded Rust event loops: the handle and the queued
//! entry share a flag, so `cancel` doesn't need to touch the heap at all, and
//! `pop_next` just skips anything flagged on its way out.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use netsim_core::{DeviceId, FlowId, LinkId, Packet, SimError};

#[derive(Debug, Clone)]
pub enum EventAction {
    PacketArrival {
        link: LinkId,
        packet: Packet,
        target: DeviceId,
        packet_id: u64,
    },
    LinkReady {
        link: LinkId,
    },
    FlowWake {
        flow: FlowId,
    },
    RoutingUpdate {
        host: DeviceId,
    },
}

/// A handle to a scheduled event, usable to cancel it before it fires.
#[derive(Debug, Clone)]
pub struct EventHandle {
    cancelled: Rc<Cell<bool>>,
}

impl EventHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }
}

struct QueuedEvent {
    time: f64,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    action: EventAction,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse time (and then seq) so the
        // smallest (time, seq) pair surfaces first.
        other
            .time
            .partial_cmp(&self.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        now: f64,
        delay: f64,
        action: EventAction,
    ) -> Result<EventHandle, SimError> {
        if delay < 0.0 {
            return Err(SimError::NegativeDelay { delay });
        }
        self.schedule_at(now, now + delay, action)
    }

    pub fn schedule_at(
        &mut self,
        now: f64,
        time: f64,
        action: EventAction,
    ) -> Result<EventHandle, SimError> {
        if time < now {
            return Err(SimError::TimeInPast { time, now });
        }
        let cancelled = Rc::new(Cell::new(false));
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedEvent {
            time,
            seq,
            cancelled: cancelled.clone(),
            action,
        });
        Ok(EventHandle { cancelled })
    }

    /// Removes the root, skipping and discarding cancelled entries, until a
    /// live one surfaces or the heap is empty.
    pub fn pop_next(&mut self) -> Option<(f64, EventAction)> {
        while let Some(ev) = self.heap.pop() {
            if !ev.cancelled.get() {
                return Some((ev.time, ev.action));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(host: DeviceId) -> EventAction {
        EventAction::RoutingUpdate { host }
    }

    #[test]
    fn pops_in_time_order() {
        let mut q = EventQueue::new();
        q.schedule(0.0, 5.0, noop(1)).unwrap();
        q.schedule(0.0, 1.0, noop(2)).unwrap();
        q.schedule(0.0, 3.0, noop(3)).unwrap();
        let times: Vec<f64> = std::iter::from_fn(|| q.pop_next()).map(|(t, _)| t).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut q = EventQueue::new();
        q.schedule(0.0, 1.0, noop(1)).unwrap();
        q.schedule(0.0, 1.0, noop(2)).unwrap();
        q.schedule(0.0, 1.0, noop(3)).unwrap();
        let hosts: Vec<DeviceId> = std::iter::from_fn(|| q.pop_next())
            .map(|(_, a)| match a {
                EventAction::RoutingUpdate { host } => host,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(hosts, vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_events_are_skipped() {
        let mut q = EventQueue::new();
        let handle = q.schedule(0.0, 1.0, noop(1)).unwrap();
        q.schedule(0.0, 2.0, noop(2)).unwrap();
        handle.cancel();
        let (t, a) = q.pop_next().unwrap();
        assert_eq!(t, 2.0);
        assert!(matches!(a, EventAction::RoutingUpdate { host: 2 }));
        assert!(q.pop_next().is_none());
    }

    #[test]
    fn rejects_negative_delay_and_past_times() {
        let mut q = EventQueue::new();
        assert!(q.schedule(5.0, -1.0, noop(1)).is_err());
        assert!(q.schedule_at(5.0, 4.0, noop(1)).is_err());
    }
}
