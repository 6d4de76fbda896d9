//! Per-router destination -> outgoing-link map, refreshed by periodic
//! distance-vector-style beacons (see the Host/Router protocol in §4.7-4.8).

use std::collections::HashMap;

use crate::ids::{DeviceId, LinkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Inserted,
    Refreshed,
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    link: LinkId,
    last_update: f64,
}

#[derive(Debug, Default)]
pub struct RoutingTable {
    entries: HashMap<DeviceId, Entry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, host_id: DeviceId) -> Option<LinkId> {
        self.entries.get(&host_id).map(|e| e.link)
    }

    pub fn update(&mut self, host_id: DeviceId, link: LinkId, timestamp: f64) -> UpdateOutcome {
        match self.entries.get_mut(&host_id) {
            None => {
                self.entries.insert(host_id, Entry { link, last_update: timestamp });
                UpdateOutcome::Inserted
            }
            Some(entry) if timestamp > entry.last_update => {
                entry.link = link;
                entry.last_update = timestamp;
                UpdateOutcome::Refreshed
            }
            Some(_) => UpdateOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_then_refreshes_then_ignores_stale() {
        let mut table = RoutingTable::new();
        assert_eq!(table.update(1, 10, 1.0), UpdateOutcome::Inserted);
        assert_eq!(table.lookup(1), Some(10));
        assert_eq!(table.update(1, 20, 2.0), UpdateOutcome::Refreshed);
        assert_eq!(table.lookup(1), Some(20));
        assert_eq!(table.update(1, 30, 1.5), UpdateOutcome::Ignored);
        assert_eq!(table.lookup(1), Some(20));
    }

    #[test]
    fn unknown_host_has_no_route() {
        let table = RoutingTable::new();
        assert_eq!(table.lookup(99), None);
    }
}
