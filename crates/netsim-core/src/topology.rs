//! The raw topology description (§6) and its validated, id-resolved form.
//!
//! `TopologyDescription` is exactly the four-list shape an out-of-scope JSON
//! parser hands us; `Topology::from_description` is the one place names get
//! turned into the stable integer ids the rest of the engine carries around
//! instead of back-pointers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FlowRef, SimError};
use crate::ids::{DeviceId, DeviceKind, FlowId, LinkId};
use crate::link::LinkSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDescription {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterDescription {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDescription {
    pub id: String,
    pub rate_mbps: f64,
    pub delay_ms: f64,
    pub buffer_kb: f64,
    pub endpoint_a_id: String,
    pub endpoint_b_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDescription {
    pub id: String,
    pub source_host_id: String,
    pub dest_host_id: String,
    pub total_mb: f64,
    pub start_time_s: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyDescription {
    #[serde(default)]
    pub hosts: Vec<HostDescription>,
    #[serde(default)]
    pub routers: Vec<RouterDescription>,
    #[serde(default)]
    pub links: Vec<LinkDescription>,
    #[serde(default)]
    pub flows: Vec<FlowDescription>,
}

#[derive(Debug, Clone)]
pub struct FlowSpec {
    pub id: FlowId,
    pub source_host: DeviceId,
    pub dest_host: DeviceId,
    pub total_bytes: u64,
    pub start_time_s: f64,
}

/// A topology with every name resolved to a [`DeviceId`]/[`LinkId`]/[`FlowId`],
/// ready to hand to the engine.
#[derive(Debug, Clone)]
pub struct Topology {
    pub device_kinds: Vec<DeviceKind>,
    /// For each device, the links it is attached to.
    pub device_links: Vec<Vec<LinkId>>,
    pub links: Vec<LinkSpec>,
    pub flows: Vec<FlowSpec>,
    pub device_names: HashMap<DeviceId, String>,
}

impl Topology {
    pub fn from_description(desc: &TopologyDescription) -> Result<Self, SimError> {
        let mut device_ids: HashMap<String, DeviceId> = HashMap::new();
        let mut device_kinds = Vec::new();
        let mut device_names = HashMap::new();

        for h in &desc.hosts {
            if device_ids.contains_key(&h.id) {
                return Err(SimError::DuplicateId { kind: "device", id: device_ids.len() as u32 });
            }
            let id = device_kinds.len() as DeviceId;
            device_ids.insert(h.id.clone(), id);
            device_names.insert(id, h.id.clone());
            device_kinds.push(DeviceKind::Host);
        }
        for r in &desc.routers {
            if device_ids.contains_key(&r.id) {
                return Err(SimError::DuplicateId { kind: "device", id: device_ids.len() as u32 });
            }
            let id = device_kinds.len() as DeviceId;
            device_ids.insert(r.id.clone(), id);
            device_names.insert(id, r.id.clone());
            device_kinds.push(DeviceKind::Router);
        }

        let mut link_ids: HashMap<String, LinkId> = HashMap::new();
        let mut links = Vec::with_capacity(desc.links.len());
        let mut device_links = vec![Vec::new(); device_kinds.len()];

        for l in &desc.links {
            if link_ids.contains_key(&l.id) {
                return Err(SimError::DuplicateId { kind: "link", id: link_ids.len() as u32 });
            }
            let link_id = links.len() as LinkId;
            let endpoint_a = *device_ids
                .get(&l.endpoint_a_id)
                .ok_or(SimError::UnknownEndpoint { link: link_id, endpoint: 0 })?;
            let endpoint_b = *device_ids
                .get(&l.endpoint_b_id)
                .ok_or(SimError::UnknownEndpoint { link: link_id, endpoint: 0 })?;

            link_ids.insert(l.id.clone(), link_id);
            device_links[endpoint_a as usize].push(link_id);
            device_links[endpoint_b as usize].push(link_id);

            links.push(LinkSpec {
                id: link_id,
                rate_bytes_per_sec: l.rate_mbps * 1_000_000.0 / 8.0,
                propagation_delay_s: l.delay_ms / 1000.0,
                buffer_capacity_bytes: (l.buffer_kb * 1024.0) as u64,
                endpoint_a,
                endpoint_b,
            });
        }

        let mut flow_ids: HashMap<String, FlowId> = HashMap::new();
        let mut flows = Vec::with_capacity(desc.flows.len());
        for f in &desc.flows {
            if flow_ids.contains_key(&f.id) {
                return Err(SimError::DuplicateId { kind: "flow", id: flow_ids.len() as u32 });
            }
            let flow_id = flows.len() as FlowId;
            flow_ids.insert(f.id.clone(), flow_id);

            let source_host = *device_ids.get(&f.source_host_id).ok_or(
                SimError::UnknownFlowEndpoint { flow: FlowRef(flow_id), device: 0 },
            )?;
            let dest_host = *device_ids.get(&f.dest_host_id).ok_or(
                SimError::UnknownFlowEndpoint { flow: FlowRef(flow_id), device: 0 },
            )?;
            if device_kinds[source_host as usize] != DeviceKind::Host {
                return Err(SimError::EndpointNotHost { flow: FlowRef(flow_id), device: source_host });
            }
            if device_kinds[dest_host as usize] != DeviceKind::Host {
                return Err(SimError::EndpointNotHost { flow: FlowRef(flow_id), device: dest_host });
            }

            flows.push(FlowSpec {
                id: flow_id,
                source_host,
                dest_host,
                total_bytes: (f.total_mb * 1_000_000.0) as u64,
                start_time_s: f.start_time_s,
            });
        }

        for (idx, kind) in device_kinds.iter().enumerate() {
            if *kind == DeviceKind::Host && device_links[idx].len() != 1 {
                return Err(SimError::HostLinkCount {
                    device: idx as DeviceId,
                    count: device_links[idx].len(),
                });
            }
        }

        Ok(Topology { device_kinds, device_links, links, flows, device_names })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_host_link() -> TopologyDescription {
        TopologyDescription {
            hosts: vec![
                HostDescription { id: "h1".into() },
                HostDescription { id: "h2".into() },
            ],
            routers: vec![],
            links: vec![LinkDescription {
                id: "l1".into(),
                rate_mbps: 10.0,
                delay_ms: 10.0,
                buffer_kb: 64.0,
                endpoint_a_id: "h1".into(),
                endpoint_b_id: "h2".into(),
            }],
            flows: vec![FlowDescription {
                id: "f1".into(),
                source_host_id: "h1".into(),
                dest_host_id: "h2".into(),
                total_mb: 20.0,
                start_time_s: 0.0,
            }],
        }
    }

    #[test]
    fn resolves_simple_topology() {
        let topo = Topology::from_description(&two_host_link()).unwrap();
        assert_eq!(topo.links.len(), 1);
        assert_eq!(topo.flows.len(), 1);
        assert_eq!(topo.links[0].rate_bytes_per_sec, 1_250_000.0);
        assert_eq!(topo.links[0].buffer_capacity_bytes, 65536);
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let mut desc = two_host_link();
        desc.links[0].endpoint_b_id = "ghost".into();
        assert!(matches!(
            Topology::from_description(&desc),
            Err(SimError::UnknownEndpoint { .. })
        ));
    }

    #[test]
    fn flow_to_router_is_rejected() {
        let mut desc = two_host_link();
        desc.routers.push(RouterDescription { id: "r1".into() });
        desc.flows[0].dest_host_id = "r1".into();
        assert!(matches!(
            Topology::from_description(&desc),
            Err(SimError::EndpointNotHost { .. })
        ));
    }
}
