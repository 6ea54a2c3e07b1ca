//! Forwarding pipeline
//!
//! One pass per received frame: decode the IPv4 header, apply the hop
//! mutations (TTL, checksum), write the header back into the frame, resolve
//! the destination and transmit through the egress interface's socket.
//! Every pass ends in a [`ForwardOutcome`]; nothing here blocks except the
//! final send.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::ForwardError;
use crate::iface::link::{LinkAddr, LinkSocket};
use crate::iface::registry::SocketRegistry;
use crate::network::{Ipv4Header, MacAddr};
use crate::routing::RouteTable;

/// What to do with a frame whose TTL runs out at this hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TtlPolicy {
    /// Decrement unconditionally; a TTL of 0 wraps to 255 and the frame is
    /// still forwarded.
    #[default]
    #[serde(rename = "wrap")]
    Wrap,
    /// Drop frames arriving with TTL 0 or 1 instead of forwarding them.
    #[serde(rename = "drop")]
    DropExpired,
}

/// Result of one pipeline pass
#[derive(Debug)]
pub enum ForwardOutcome {
    Forwarded {
        ifindex: u32,
        next_hop: MacAddr,
        bytes: usize,
    },
    Dropped(ForwardError),
}

impl ForwardOutcome {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, ForwardOutcome::Forwarded { .. })
    }
}

/// Shared, read-only forwarding state
///
/// Cloning is cheap; every listener thread holds its own clone.
pub struct Forwarder<S> {
    routes: Arc<RouteTable>,
    sockets: Arc<SocketRegistry<S>>,
    ttl_policy: TtlPolicy,
}

impl<S> Clone for Forwarder<S> {
    fn clone(&self) -> Self {
        Forwarder {
            routes: Arc::clone(&self.routes),
            sockets: Arc::clone(&self.sockets),
            ttl_policy: self.ttl_policy,
        }
    }
}

impl<S: LinkSocket> Forwarder<S> {
    pub fn new(routes: Arc<RouteTable>, sockets: Arc<SocketRegistry<S>>) -> Self {
        Forwarder {
            routes,
            sockets,
            ttl_policy: TtlPolicy::default(),
        }
    }

    pub fn with_ttl_policy(mut self, ttl_policy: TtlPolicy) -> Self {
        self.ttl_policy = ttl_policy;
        self
    }

    /// Run one frame through the pipeline.
    ///
    /// `frame` starts at the IPv4 header. On return its first 20 bytes hold
    /// the mutated header, unless the frame was dropped as malformed or
    /// expired.
    pub fn process(&self, frame: &mut [u8], inbound: &LinkAddr) -> ForwardOutcome {
        match self.forward(frame, inbound) {
            Ok((ifindex, next_hop, bytes)) => ForwardOutcome::Forwarded {
                ifindex,
                next_hop,
                bytes,
            },
            Err(e) => ForwardOutcome::Dropped(e),
        }
    }

    fn forward(
        &self,
        frame: &mut [u8],
        inbound: &LinkAddr,
    ) -> Result<(u32, MacAddr, usize), ForwardError> {
        let mut header = Ipv4Header::from_bytes(frame)?;
        debug!(
            "IP packet from {} to {} (ttl {})",
            header.src_addr, header.dst_addr, header.ttl
        );

        if self.ttl_policy == TtlPolicy::DropExpired && header.ttl <= 1 {
            return Err(ForwardError::TtlExpired);
        }

        header.decrement_ttl();
        header.update_checksum();
        header.write_to(frame);

        let route = self
            .routes
            .resolve(header.dst_addr)
            .ok_or(ForwardError::NoRoute(header.dst_addr))?;

        let egress = LinkAddr::egress(inbound, route.ifindex, route.next_hop);
        let socket = self
            .sockets
            .get(route.ifindex)
            .ok_or(ForwardError::NoEgressSocket(route.ifindex))?;

        trace!(
            "sending {} bytes for {} on interface {} to {}",
            frame.len(),
            header.dst_addr,
            route.ifindex,
            route.next_hop
        );
        let bytes = socket
            .send_to(frame, &egress)
            .map_err(|source| ForwardError::Transmit {
                ifindex: route.ifindex,
                source,
            })?;

        Ok((route.ifindex, route.next_hop, bytes))
    }
}
