//! Bounded FIFO backing a [`crate::link::Link`]'s queued-but-not-yet-sent
//! packets.

use std::collections::VecDeque;

use crate::packet::Packet;

/// Which endpoint of a link a buffered packet is travelling toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToA,
    ToB,
}

#[derive(Debug)]
pub enum EnqueueOutcome {
    Accepted,
    Dropped,
}

#[derive(Debug, Default)]
pub struct Buffer {
    capacity_bytes: u64,
    used_bytes: u64,
    queue: VecDeque<(Packet, Direction)>,
}

impl Buffer {
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            used_bytes: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn enqueue(&mut self, packet: Packet, direction: Direction) -> EnqueueOutcome {
        let size = packet.size_bytes() as u64;
        if self.used_bytes + size > self.capacity_bytes {
            return EnqueueOutcome::Dropped;
        }
        self.used_bytes += size;
        self.queue.push_back((packet, direction));
        EnqueueOutcome::Accepted
    }

    pub fn dequeue(&mut self) -> Option<(Packet, Direction)> {
        let entry = self.queue.pop_front()?;
        self.used_bytes -= entry.0.size_bytes() as u64;
        Some(entry)
    }

    pub fn peek_direction(&self) -> Option<Direction> {
        self.queue.front().map(|(_, d)| *d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{AckPacket, Packet};

    fn ack() -> Packet {
        Packet::Ack(AckPacket {
            flow_id: 0,
            expected_seq_no: 0,
            duplicate_no: 0,
            source_host_id: 0,
            dest_host_id: 1,
        })
    }

    #[test]
    fn drops_when_over_capacity() {
        let mut buf = Buffer::new(64);
        assert!(matches!(buf.enqueue(ack(), Direction::ToA), EnqueueOutcome::Accepted));
        assert!(matches!(buf.enqueue(ack(), Direction::ToA), EnqueueOutcome::Dropped));
        assert_eq!(buf.used_bytes(), 64);
    }

    #[test]
    fn fifo_order() {
        let mut buf = Buffer::new(1024);
        buf.enqueue(ack(), Direction::ToA);
        buf.enqueue(ack(), Direction::ToB);
        let (_, d1) = buf.dequeue().unwrap();
        let (_, d2) = buf.dequeue().unwrap();
        assert_eq!(d1, Direction::ToA);
        assert_eq!(d2, Direction::ToB);
        assert_eq!(buf.used_bytes(), 0);
    }
}
