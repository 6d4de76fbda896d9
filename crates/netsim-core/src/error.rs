//! Fatal error kinds raised before or during a simulation run.
//!
//! `PacketDropped` and `UnexpectedPacket` are *not* represented here: those are
//! expected runtime conditions and are only ever surfaced through the log
//! channels (see [`crate::config`] and the engine's logger), never returned as
//! an `Err`.

use thiserror::Error;

use crate::ids::{DeviceId, LinkId};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("link {link} references unknown endpoint id {endpoint}")]
    UnknownEndpoint { link: LinkId, endpoint: DeviceId },

    #[error("flow {flow} endpoint {device} must be a host, not a router")]
    EndpointNotHost { flow: FlowRef, device: DeviceId },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("flow {flow} references unknown host id {device}")]
    UnknownFlowEndpoint { flow: FlowRef, device: DeviceId },

    #[error("cannot schedule at delay {delay} < 0")]
    NegativeDelay { delay: f64 },

    #[error("cannot schedule at absolute time {time} before current time {now}")]
    TimeInPast { time: f64, now: f64 },

    #[error("host {device} must be attached to exactly one link, found {count}")]
    HostLinkCount { device: DeviceId, count: usize },
}

/// Either a flow's declared id or its position in the topology description,
/// whichever is available at the point the error is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRef(pub u32);

impl std::fmt::Display for FlowRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
