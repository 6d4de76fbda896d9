//! TOML-described test scenarios for driving a single flow deterministically,
//! independent of a full JSON topology. Adapted from the teacher lab's
//! sender/receiver scenario format to flow/window semantics that apply to
//! both congestion-control variants.

use serde::Deserialize;

use crate::config::{CongestionAlgorithm, SimConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct SimConfigOverride {
    pub congestion_algorithm: Option<CongestionAlgorithm>,
    pub beacon_interval_s: Option<f64>,
    pub flow_wake_timeout_s: Option<f64>,
    pub initial_ssthresh: Option<f64>,
    pub fast_alpha: Option<f64>,
    pub fast_gamma: Option<f64>,
}

impl SimConfigOverride {
    pub fn apply_to(&self, config: &mut SimConfig) {
        if let Some(v) = self.congestion_algorithm {
            config.congestion_algorithm = v;
        }
        if let Some(v) = self.beacon_interval_s {
            config.beacon_interval_s = v;
        }
        if let Some(v) = self.flow_wake_timeout_s {
            config.flow_wake_timeout_s = v;
        }
        if let Some(v) = self.initial_ssthresh {
            config.initial_ssthresh = v;
        }
        if let Some(v) = self.fast_alpha {
            config.fast_alpha = v;
        }
        if let Some(v) = self.fast_gamma {
            config.fast_gamma = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAction {
    /// Start a flow of `total_bytes` at virtual time `time_s`.
    FlowStart { time_s: f64, total_bytes: u64 },
    /// Deterministically drop the first payload packet with the given seq.
    DropNextPayloadSeq { seq: u64 },
    /// Deterministically drop the first ack packet with the given expected seq.
    DropNextAckSeq { seq: u64 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAssertion {
    /// The flow must finish (bytes_remaining == 0 and unacked empty).
    FlowCompletes,
    /// Total payload packets sent by the flow must fall in `[min, max]`.
    PacketsSentInRange { min: u64, max: Option<u64> },
    /// The maximum window size observed must fall in `[min, max]`.
    WindowMaxInRange { min: f64, max: Option<f64> },
    /// The window must drop to at most `to_at_most` at some point after
    /// having reached at least `from_at_least`.
    WindowDropsBelow { from_at_least: f64, to_at_most: f64 },
    /// Simulation must finish within `ms` virtual milliseconds.
    MaxDuration { ms: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestScenario {
    pub name: String,
    pub description: String,
    pub config: SimConfigOverride,
    pub actions: Vec<TestAction>,
    pub assertions: Vec<TestAssertion>,
}
