use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionAlgorithm {
    Reno,
    Fast,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    pub congestion_algorithm: CongestionAlgorithm,
    pub verbose: bool,
    /// Hint only; the core ignores it. Carried through so an out-of-scope
    /// plotting collaborator can read run intent from the same config blob.
    pub emit_graphs: bool,

    /// Interval, in virtual seconds, between a host's routing beacons.
    pub beacon_interval_s: f64,
    /// How long a flow waits with no news before re-examining its window.
    pub flow_wake_timeout_s: f64,
    /// Starting slow-start threshold for Reno, in packets.
    pub initial_ssthresh: f64,
    /// FAST's queueing-delay target, in packets.
    pub fast_alpha: f64,
    /// FAST's smoothing factor, in (0, 1].
    pub fast_gamma: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            congestion_algorithm: CongestionAlgorithm::Reno,
            verbose: false,
            emit_graphs: false,
            beacon_interval_s: 1.0,
            flow_wake_timeout_s: 1.0,
            initial_ssthresh: 64.0,
            fast_alpha: 50.0,
            fast_gamma: 0.5,
        }
    }
}
