//! Distance-vector-style router: floods routing beacons, forwards everything
//! else by the table they build up. Grounded on the general
//! receive-update-forward shape used for router nodes in discrete-event
//! network simulators (see the `rustasim` router in the example pack), but
//! rebuilt around our own `RoutingTable`/`Packet` types.

use netsim_core::{DeviceId, LinkId, Packet, RoutingTable, UpdateOutcome};

use crate::trace::DropReason;

pub enum RouterAction {
    /// Send `packet` out on each listed link.
    Forward(Vec<(LinkId, Packet)>),
    Drop(DropReason),
    /// A beacon that refreshed nothing newer than what the table already had;
    /// correctly processed, nothing to send.
    Ignored,
}

pub struct Router {
    pub id: DeviceId,
    pub links: Vec<LinkId>,
    routing_table: RoutingTable,
}

impl Router {
    pub fn new(id: DeviceId, links: Vec<LinkId>) -> Self {
        Self { id, links, routing_table: RoutingTable::new() }
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    /// `via_link` is the link the packet arrived on, so beacons aren't
    /// flooded straight back the way they came.
    pub fn handle_packet(&mut self, packet: Packet, via_link: LinkId, _now: f64) -> RouterAction {
        match packet {
            Packet::Routing(beacon) => {
                let origin_time = beacon.origin_time_ms as f64 / 1000.0;
                match self.routing_table.update(beacon.source_host_id, via_link, origin_time) {
                    UpdateOutcome::Ignored => RouterAction::Ignored,
                    UpdateOutcome::Inserted | UpdateOutcome::Refreshed => {
                        let forwards = self
                            .links
                            .iter()
                            .filter(|&&link| link != via_link)
                            .map(|&link| (link, Packet::Routing(beacon)))
                            .collect();
                        RouterAction::Forward(forwards)
                    }
                }
            }
            other => {
                let Some(dest) = other.dest_host_id() else {
                    return RouterAction::Drop(DropReason::NoRoute);
                };
                match self.routing_table.lookup(dest) {
                    Some(link) => RouterAction::Forward(vec![(link, other)]),
                    None => RouterAction::Drop(DropReason::NoRoute),
                }
            }
        }
    }
}
