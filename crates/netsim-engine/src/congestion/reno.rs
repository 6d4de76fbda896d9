use super::{Common, DropKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SlowStart,
    CongestionAvoidance,
    FastRecovery,
}

#[derive(Debug)]
pub struct RenoState {
    pub phase: Phase,
    pub ssthresh: f64,
}

impl RenoState {
    pub fn new(initial_ssthresh: f64) -> Self {
        Self { phase: Phase::SlowStart, ssthresh: initial_ssthresh }
    }

    pub fn on_ack(&mut self, common: &mut Common) {
        match self.phase {
            Phase::SlowStart => {
                common.window_size += 1.0;
                if common.window_size >= self.ssthresh {
                    self.phase = Phase::CongestionAvoidance;
                }
            }
            Phase::CongestionAvoidance => {
                common.window_size += 1.0 / common.window_size;
            }
            Phase::FastRecovery => {
                // A fresh ack arriving during fast recovery means the
                // retransmission was acknowledged: deflate back down.
                common.window_size = self.ssthresh;
                self.phase = Phase::CongestionAvoidance;
            }
        }
    }

    pub fn on_drop(&mut self, common: &mut Common, kind: DropKind) {
        match kind {
            DropKind::TripleDuplicateAck => {
                self.ssthresh = common.window_size / 2.0;
                common.window_size = self.ssthresh + 3.0;
                self.phase = Phase::FastRecovery;
            }
            DropKind::Timeout => {
                self.ssthresh = common.window_size / 2.0;
                common.window_size = 1.0;
                self.phase = Phase::SlowStart;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_start_doubles_then_transitions() {
        let mut common = Common::new();
        let mut reno = RenoState::new(4.0);
        for _ in 0..4 {
            reno.on_ack(&mut common);
        }
        assert_eq!(common.window_size, 5.0);
        assert_eq!(reno.phase, Phase::CongestionAvoidance);
    }

    #[test]
    fn triple_dup_enters_fast_recovery_then_deflates() {
        let mut common = Common::new();
        common.window_size = 20.0;
        let mut reno = RenoState::new(10.0);
        reno.phase = Phase::CongestionAvoidance;
        reno.on_drop(&mut common, DropKind::TripleDuplicateAck);
        assert_eq!(reno.phase, Phase::FastRecovery);
        assert_eq!(reno.ssthresh, 10.0);
        assert_eq!(common.window_size, 13.0);

        reno.on_ack(&mut common);
        assert_eq!(reno.phase, Phase::CongestionAvoidance);
        assert_eq!(common.window_size, 10.0);
    }

    #[test]
    fn timeout_resets_to_slow_start() {
        let mut common = Common::new();
        common.window_size = 16.0;
        let mut reno = RenoState::new(8.0);
        reno.phase = Phase::CongestionAvoidance;
        reno.on_drop(&mut common, DropKind::Timeout);
        assert_eq!(reno.phase, Phase::SlowStart);
        assert_eq!(reno.ssthresh, 8.0);
        assert_eq!(common.window_size, 1.0);
    }
}
