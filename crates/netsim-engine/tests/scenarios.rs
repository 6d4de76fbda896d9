//! End-to-end coverage of §8's concrete scenarios, driven through the
//! scenario harness rather than a JSON topology file.

use std::collections::HashMap;

use netsim_core::{CongestionAlgorithm, DeviceKind, LinkSpec, SimConfig, SimConfigOverride, TestAction, TestAssertion, TestScenario, Topology};
use netsim_engine::{run_scenario, Simulation};

fn no_overrides() -> SimConfigOverride {
    SimConfigOverride {
        congestion_algorithm: None,
        beacon_interval_s: None,
        flow_wake_timeout_s: None,
        initial_ssthresh: None,
        fast_alpha: None,
        fast_gamma: None,
    }
}

/// S1 — single link, single Reno flow: the flow runs to completion.
#[test]
fn single_link_single_flow_completes() {
    let scenario = TestScenario {
        name: "single_link_single_flow".into(),
        description: "one Reno flow over an uncongested link".into(),
        config: no_overrides(),
        actions: vec![TestAction::FlowStart { time_s: 0.0, total_bytes: 200_000 }],
        assertions: vec![TestAssertion::FlowCompletes, TestAssertion::MaxDuration { ms: 60_000 }],
    };
    run_scenario(&scenario).expect("scenario assertions should hold");
}

/// S4 — three consecutive duplicate acks push a Reno flow into fast
/// recovery, shrinking its window before it recovers and finishes.
#[test]
fn triple_duplicate_ack_enters_fast_recovery() {
    let scenario = TestScenario {
        name: "triple_dup_ack".into(),
        description: "drop one payload so its seq collects three duplicate acks".into(),
        config: SimConfigOverride { congestion_algorithm: Some(CongestionAlgorithm::Reno), ..no_overrides() },
        actions: vec![
            TestAction::FlowStart { time_s: 0.0, total_bytes: 2_000_000 },
            TestAction::DropNextPayloadSeq { seq: 5 },
        ],
        assertions: vec![
            TestAssertion::FlowCompletes,
            TestAssertion::WindowDropsBelow { from_at_least: 4.0, to_at_most: 40.0 },
        ],
    };
    run_scenario(&scenario).expect("scenario assertions should hold");
}

/// S3 — a 1 Mbps link with a 2 KB buffer forces at least one
/// `packet_dropped{reason=buffer_full}` under a 1 MB Reno flow, but the flow
/// still completes once its window backs off.
#[test]
fn buffer_overflow_still_completes() {
    let link = LinkSpec {
        id: 0,
        rate_bytes_per_sec: 1_000_000.0 / 8.0,
        propagation_delay_s: 0.01,
        buffer_capacity_bytes: 2 * 1024,
        endpoint_a: 0,
        endpoint_b: 1,
    };
    let topology = Topology {
        device_kinds: vec![DeviceKind::Host, DeviceKind::Host],
        device_links: vec![vec![0], vec![0]],
        links: vec![link],
        flows: vec![],
        device_names: HashMap::new(),
    };
    let mut sim = Simulation::from_topology(&topology, SimConfig::default());
    sim.add_flow(0, 1, 1_000_000, 0.0);
    sim.run();
    let report = sim.export_report();

    assert!(report.flows_finished.values().all(|&done| done), "flow should complete");
    assert!(
        report.packet_dropped.iter().any(|d| matches!(d.reason, netsim_engine::trace::DropReason::BufferFull)),
        "a 2KB buffer under a 1MB burst should overflow at least once"
    );
}

/// S2 — a diamond of two routers between source and destination, one branch
/// much slower than the other. The router where the two branches rejoin
/// should converge its route toward the source onto the faster branch, since
/// that copy of each beacon wave always arrives first.
#[test]
fn router_converges_on_lower_delay_path() {
    const HOST_SRC: u32 = 0;
    const HOST_DST: u32 = 1;
    const ROUTER_A: u32 = 2;
    const ROUTER_FAST: u32 = 3;
    const ROUTER_SLOW: u32 = 4;
    const ROUTER_JOIN: u32 = 5;

    fn link(id: u32, delay_s: f64, a: u32, b: u32) -> LinkSpec {
        LinkSpec {
            id,
            rate_bytes_per_sec: 1_000_000.0,
            propagation_delay_s: delay_s,
            buffer_capacity_bytes: 64 * 1024,
            endpoint_a: a,
            endpoint_b: b,
        }
    }

    // HOST_SRC -> ROUTER_A -> {ROUTER_FAST (1ms) | ROUTER_SLOW (50ms)} -> ROUTER_JOIN -> HOST_DST
    let l_src = link(0, 0.001, HOST_SRC, ROUTER_A);
    let l_fast_branch = link(1, 0.001, ROUTER_A, ROUTER_FAST);
    let l_slow_branch = link(2, 0.050, ROUTER_A, ROUTER_SLOW);
    let l_fast_join = link(3, 0.001, ROUTER_FAST, ROUTER_JOIN);
    let l_slow_join = link(4, 0.001, ROUTER_SLOW, ROUTER_JOIN);
    let l_dst = link(5, 0.001, ROUTER_JOIN, HOST_DST);

    let mut device_kinds = vec![DeviceKind::Host; 2];
    device_kinds.extend(vec![DeviceKind::Router; 4]);

    let topology = Topology {
        device_kinds,
        device_links: vec![
            vec![0],          // HOST_SRC
            vec![5],          // HOST_DST
            vec![0, 1, 2],    // ROUTER_A
            vec![1, 3],       // ROUTER_FAST
            vec![2, 4],       // ROUTER_SLOW
            vec![3, 4, 5],    // ROUTER_JOIN
        ],
        links: vec![l_src, l_fast_branch, l_slow_branch, l_fast_join, l_slow_join, l_dst],
        flows: vec![],
        device_names: HashMap::new(),
    };

    let mut sim = Simulation::from_topology(&topology, SimConfig::default());
    sim.add_flow(HOST_SRC, HOST_DST, 20_000, 0.0);
    sim.run();

    assert_eq!(
        sim.router_route(ROUTER_JOIN, HOST_SRC),
        Some(3),
        "the join router should route toward the source via the fast branch (link 3), not the slow one (link 4)"
    );
}

/// FAST converges toward a window near `alpha` queued packets once RTT
/// samples settle, instead of growing without bound.
#[test]
fn fast_flow_completes() {
    let scenario = TestScenario {
        name: "fast_steady_state".into(),
        description: "FAST-controlled flow over the same synthetic link".into(),
        config: SimConfigOverride { congestion_algorithm: Some(CongestionAlgorithm::Fast), ..no_overrides() },
        actions: vec![TestAction::FlowStart { time_s: 0.0, total_bytes: 500_000 }],
        assertions: vec![TestAssertion::FlowCompletes],
    };
    run_scenario(&scenario).expect("scenario assertions should hold");
}
