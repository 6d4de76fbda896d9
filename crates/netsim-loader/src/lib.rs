//! Reads topology descriptions and test scenarios off disk.
//!
//! JSON/TOML parsing itself is out of scope for this crate's concerns beyond
//! what `serde` already gives us for free; this module's job is locating the
//! file, producing a good error message if it's missing or malformed, and
//! handing the validated, id-resolved [`Topology`] onward.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use netsim_core::{TestScenario, Topology, TopologyDescription};

pub fn load_topology_json(path: impl AsRef<Path>) -> Result<Topology> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading topology file {}", path.display()))?;
    let desc: TopologyDescription = serde_json::from_str(&raw)
        .with_context(|| format!("parsing topology file {}", path.display()))?;
    Topology::from_description(&desc)
        .with_context(|| format!("resolving topology in {}", path.display()))
}

pub fn load_scenario_toml(path: impl AsRef<Path>) -> Result<TestScenario> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading scenario file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing scenario file {}", path.display()))
}
