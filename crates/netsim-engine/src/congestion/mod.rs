//! Congestion control: two interchangeable strategies sharing one contract
//! with [`crate::flow::Flow`]. Modeled as a closed enum dispatched by a
//! `match`, per the "avoid inheritance" design note, rather than as a trait
//! object — there are exactly two variants and they will not grow a plugin
//! surface.

mod fast;
mod reno;

use std::collections::BTreeSet;

use netsim_core::{CongestionAlgorithm, SimConfig};

pub use fast::FastState;
pub use reno::{Phase, RenoState};

/// Why a packet is being treated as lost, which Reno responds to differently
/// (fast recovery vs. a full slow-start restart) but FAST treats uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Timeout,
    TripleDuplicateAck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckClass {
    /// Advances `expected_seq_no` past anything seen before.
    Fresh,
    /// Repeats the most recently seen `expected_seq_no`.
    Duplicate,
    /// The third consecutive duplicate; the caller should treat the
    /// outstanding packet at `expected_seq_no` as lost.
    TripleDuplicateAck,
}

/// Controller state common to every strategy (§3's "CongestionController
/// state (common)").
#[derive(Debug)]
struct Common {
    window_size: f64,
    expected_seq: u64,
    duplicate_ack_count: u32,
    retransmit_queue: BTreeSet<u64>,
    /// Smallest RTT sample observed so far. Used both as FAST's delay
    /// baseline and as the generic per-packet timeout estimator shared by
    /// both strategies.
    min_rtt_s: Option<f64>,
}

impl Common {
    fn new() -> Self {
        Self {
            window_size: 1.0,
            expected_seq: 0,
            duplicate_ack_count: 0,
            retransmit_queue: BTreeSet::new(),
            min_rtt_s: None,
        }
    }

    fn observe_rtt(&mut self, rtt: f64) {
        self.min_rtt_s = Some(self.min_rtt_s.map_or(rtt, |m| m.min(rtt)));
    }
}

enum Kind {
    Reno(RenoState),
    Fast(FastState),
}

pub struct CongestionController {
    common: Common,
    kind: Kind,
}

impl CongestionController {
    pub fn new(config: &SimConfig) -> Self {
        let kind = match config.congestion_algorithm {
            CongestionAlgorithm::Reno => Kind::Reno(RenoState::new(config.initial_ssthresh)),
            CongestionAlgorithm::Fast => Kind::Fast(FastState::new(config.fast_alpha, config.fast_gamma)),
        };
        Self { common: Common::new(), kind }
    }

    pub fn window(&self) -> f64 {
        self.common.window_size
    }

    pub fn phase(&self) -> Option<Phase> {
        match &self.kind {
            Kind::Reno(r) => Some(r.phase),
            Kind::Fast(_) => None,
        }
    }

    pub fn ssthresh(&self) -> Option<f64> {
        match &self.kind {
            Kind::Reno(r) => Some(r.ssthresh),
            Kind::Fast(_) => None,
        }
    }

    /// Classify an incoming ack's `expected_seq_no` against the highest one
    /// seen so far, updating the common duplicate-ack bookkeeping. A Reno
    /// controller sitting in `FastRecovery` inflates its window by one for
    /// every duplicate, per §4.10.
    pub fn record_ack(&mut self, expected_seq_no: u64) -> AckClass {
        let class = if expected_seq_no > self.common.expected_seq {
            self.common.expected_seq = expected_seq_no;
            self.common.duplicate_ack_count = 0;
            AckClass::Fresh
        } else if expected_seq_no == self.common.expected_seq {
            self.common.duplicate_ack_count += 1;
            if self.common.duplicate_ack_count == 3 {
                AckClass::TripleDuplicateAck
            } else {
                AckClass::Duplicate
            }
        } else {
            AckClass::Duplicate
        };

        if matches!(class, AckClass::Duplicate | AckClass::TripleDuplicateAck) {
            if let Kind::Reno(reno) = &mut self.kind {
                if reno.phase == Phase::FastRecovery {
                    self.common.window_size += 1.0;
                }
            }
        }
        class
    }

    /// Grow the window for one freshly-acknowledged packet.
    pub fn on_ack(&mut self, rtt: f64) {
        self.common.observe_rtt(rtt);
        match &mut self.kind {
            Kind::Reno(reno) => reno.on_ack(&mut self.common),
            Kind::Fast(fast) => fast.on_ack(&mut self.common, rtt),
        }
    }

    /// Shrink the window in response to a lost packet.
    pub fn on_drop(&mut self, kind: DropKind) {
        match &mut self.kind {
            Kind::Reno(reno) => reno.on_drop(&mut self.common, kind),
            Kind::Fast(_) => self.common.window_size = (self.common.window_size / 2.0).max(1.0),
        }
    }

    /// Uniform per-packet timeout: `max(2 * min_rtt, 1s)`, using the smallest
    /// RTT sample observed so far (or a 1s baseline before the first sample).
    pub fn is_timed_out(&self, dispatch_time: f64, now: f64) -> bool {
        let min_rtt = self.common.min_rtt_s.unwrap_or(0.5);
        let timeout = (2.0 * min_rtt).max(1.0);
        now - dispatch_time >= timeout
    }

    pub fn queue_retransmit(&mut self, seq: u64) {
        self.common.retransmit_queue.insert(seq);
    }

    pub fn pop_retransmit(&mut self) -> Option<u64> {
        let seq = *self.common.retransmit_queue.iter().next()?;
        self.common.retransmit_queue.remove(&seq);
        Some(seq)
    }

    pub fn has_retransmits(&self) -> bool {
        !self.common.retransmit_queue.is_empty()
    }
}
