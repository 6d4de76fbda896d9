use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use netsim_core::{CongestionAlgorithm, SimConfig};
use netsim_engine::Simulation;
use netsim_loader::load_topology_json;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CongestionArg {
    Reno,
    Fast,
}

impl From<CongestionArg> for CongestionAlgorithm {
    fn from(value: CongestionArg) -> Self {
        match value {
            CongestionArg::Reno => CongestionAlgorithm::Reno,
            CongestionArg::Fast => CongestionAlgorithm::Fast,
        }
    }
}

/// Discrete-event network simulator: advances a virtual clock over a
/// declarative topology of hosts, routers, links and flows.
#[derive(Debug, Parser)]
#[command(name = "netsim", version, about)]
struct Args {
    /// Path to a topology description (JSON).
    #[arg(long)]
    topology: PathBuf,

    /// Congestion control strategy every flow in the topology uses.
    #[arg(long, value_enum, default_value_t = CongestionArg::Reno)]
    congestion: CongestionArg,

    /// Where to write the simulation report (JSON). Defaults to stdout.
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// Emit per-event tracing output in addition to the structured report.
    #[arg(long)]
    verbose: bool,

    #[arg(long, default_value_t = 1.0)]
    beacon_interval_s: f64,

    #[arg(long, default_value_t = 1.0)]
    flow_wake_timeout_s: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let topology = load_topology_json(&args.topology)
        .with_context(|| format!("loading topology {}", args.topology.display()))?;

    let config = SimConfig {
        congestion_algorithm: args.congestion.into(),
        verbose: args.verbose,
        beacon_interval_s: args.beacon_interval_s,
        flow_wake_timeout_s: args.flow_wake_timeout_s,
        ..SimConfig::default()
    };

    let mut sim = Simulation::from_topology(&topology, config);
    sim.run();
    let report = sim.export_report();

    let json = serde_json::to_vec_pretty(&report).context("serializing simulation report")?;
    match args.trace_out {
        Some(path) => fs::write(&path, json).with_context(|| format!("writing report to {}", path.display()))?,
        None => println!("{}", String::from_utf8_lossy(&json)),
    }

    Ok(())
}
