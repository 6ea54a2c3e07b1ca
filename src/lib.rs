//! A minimal software IPv4 router
//!
//! This library intercepts IPv4 frames on every host interface through raw
//! link-layer sockets and forwards them according to a static route table:
//! - IPv4 header parsing and checksum calculation
//! - TTL decrement and checksum recomputation on every hop
//! - Exact-match destination -> (interface, next-hop MAC) routing
//! - One receive loop per network interface

pub mod config;
pub mod error;
pub mod forward;
pub mod iface;
pub mod logging;
pub mod network;
pub mod router;
pub mod routing;

// Re-export commonly used types
pub use config::RouterConfig;
pub use error::{ForwardError, RouterError};
pub use forward::{ForwardOutcome, Forwarder, TtlPolicy};
pub use iface::{InterfaceListener, LinkAddr, LinkSocket, NetInterface, RawSocket};
pub use network::{HeaderError, Ipv4Header, MacAddr};
pub use router::Router;
pub use routing::{RouteEntry, RouteTable};
