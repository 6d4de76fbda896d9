//! Runs a [`TestScenario`] against a bare two-host, one-link topology —
//! mirrors the teacher's own `scenario_runner`, retargeted from a single
//! sender/receiver pair to flow/window-level assertions that apply to either
//! congestion-control strategy.

use std::collections::HashMap;

use anyhow::{bail, Result};

use netsim_core::{DeviceKind, LinkSpec, SimConfig, TestAction, TestAssertion, TestScenario, Topology};

use crate::simulation::Simulation;
use crate::trace::SimulationReport;

/// Rate/delay/buffer for the synthetic link a scenario runs its flow over.
/// Arbitrary but fixed, so every scenario's numbers are reproducible.
const SCENARIO_LINK: LinkSpec = LinkSpec {
    id: 0,
    rate_bytes_per_sec: 10_000_000.0,
    propagation_delay_s: 0.01,
    buffer_capacity_bytes: 65_536,
    endpoint_a: 0,
    endpoint_b: 1,
};

fn bare_topology() -> Topology {
    Topology {
        device_kinds: vec![DeviceKind::Host, DeviceKind::Host],
        device_links: vec![vec![0], vec![0]],
        links: vec![SCENARIO_LINK],
        flows: vec![],
        device_names: HashMap::new(),
    }
}

pub fn run_scenario(scenario: &TestScenario) -> Result<SimulationReport> {
    let mut config = SimConfig::default();
    scenario.config.apply_to(&mut config);

    let topology = bare_topology();
    let mut sim = Simulation::from_topology(&topology, config);

    let mut started_flows = Vec::new();
    for action in &scenario.actions {
        match action {
            TestAction::FlowStart { time_s, total_bytes } => {
                started_flows.push(sim.add_flow(0, 1, *total_bytes, *time_s));
            }
            TestAction::DropNextPayloadSeq { seq } => sim.drop_next_payload_seq(*seq),
            TestAction::DropNextAckSeq { seq } => sim.drop_next_ack_seq(*seq),
        }
    }

    sim.run();

    let packets_sent: u64 = started_flows
        .iter()
        .filter_map(|&id| sim.flows().get(id as usize))
        .map(|f| f.packets_sent())
        .sum();

    let report = sim.export_report();
    check_assertions(scenario, &report, packets_sent)?;
    Ok(report)
}

fn check_assertions(scenario: &TestScenario, report: &SimulationReport, packets_sent: u64) -> Result<()> {
    for assertion in &scenario.assertions {
        match assertion {
            TestAssertion::FlowCompletes => {
                if !report.flows_finished.values().all(|&done| done) {
                    bail!("scenario {:?}: not all flows finished", scenario.name);
                }
            }
            TestAssertion::PacketsSentInRange { min, max } => {
                if packets_sent < *min || max.is_some_and(|m| packets_sent > m) {
                    bail!(
                        "scenario {:?}: packets sent {} outside range [{}, {:?}]",
                        scenario.name,
                        packets_sent,
                        min,
                        max
                    );
                }
            }
            TestAssertion::WindowMaxInRange { min, max } => {
                let observed = report.window_size.iter().map(|r| r.window).fold(f64::MIN, f64::max);
                if observed < *min || max.is_some_and(|m| observed > m) {
                    bail!(
                        "scenario {:?}: max window {} outside range [{}, {:?}]",
                        scenario.name,
                        observed,
                        min,
                        max
                    );
                }
            }
            TestAssertion::WindowDropsBelow { from_at_least, to_at_most } => {
                let mut reached_peak = false;
                let mut dropped = false;
                for record in &report.window_size {
                    if record.window >= *from_at_least {
                        reached_peak = true;
                    } else if reached_peak && record.window <= *to_at_most {
                        dropped = true;
                        break;
                    }
                }
                if !dropped {
                    bail!(
                        "scenario {:?}: window never rose to {} and dropped to {}",
                        scenario.name,
                        from_at_least,
                        to_at_most
                    );
                }
            }
            TestAssertion::MaxDuration { ms } => {
                let duration_ms = report.duration_s * 1000.0;
                if duration_ms > *ms as f64 {
                    bail!(
                        "scenario {:?}: duration {}ms exceeds max {}ms",
                        scenario.name,
                        duration_ms,
                        ms
                    );
                }
            }
        }
    }
    Ok(())
}
