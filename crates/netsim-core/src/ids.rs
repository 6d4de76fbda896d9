//! Stable integer identifiers shared across the simulator.
//!
//! Devices (hosts and routers), links, and flows never hold back-pointers to
//! each other; every cross-reference is one of these ids, resolved against the
//! vectors a [`crate::topology::Topology`] owns. See the cyclic-reference
//! design note: this is what keeps `Link` and `Host`/`Router` decoupled.

use serde::{Deserialize, Serialize};

pub type DeviceId = u32;
pub type LinkId = u32;
pub type FlowId = u32;

/// Whether a [`DeviceId`] names a host or a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    Host,
    Router,
}
