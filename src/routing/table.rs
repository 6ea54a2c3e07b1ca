use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::error::RouterError;
use crate::network::MacAddr;

/// Where to send frames for one destination host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// Egress interface index
    pub ifindex: u32,
    /// Link-layer address of the next hop on that interface
    pub next_hop: MacAddr,
}

impl RouteEntry {
    pub fn new(ifindex: u32, next_hop: MacAddr) -> Self {
        RouteEntry { ifindex, next_hop }
    }
}

/// Immutable destination -> route map
///
/// Lookups are exact matches on the full destination address; there is no
/// prefix matching and no default route.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<Ipv4Addr, RouteEntry>,
}

impl RouteTable {
    /// Build a table from `(destination, entry)` pairs.
    ///
    /// Fails on the first destination that appears twice.
    pub fn from_entries<I>(entries: I) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = (Ipv4Addr, RouteEntry)>,
    {
        let mut routes = HashMap::new();
        for (destination, entry) in entries {
            if routes.insert(destination, entry).is_some() {
                return Err(RouterError::DuplicateRoute(destination));
            }
        }
        Ok(RouteTable { routes })
    }

    /// Look up the route for `destination`.
    pub fn resolve(&self, destination: Ipv4Addr) -> Option<RouteEntry> {
        self.routes.get(&destination).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
