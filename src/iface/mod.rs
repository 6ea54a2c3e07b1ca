//! Network interface layer
//!
//! This module provides everything that touches host interfaces:
//! - Interface enumeration
//! - Raw link-layer sockets and their address metadata
//! - The interface -> socket registry used for egress
//! - Per-interface receive loops

pub mod link;
pub mod listener;
pub mod netif;
pub mod registry;
pub mod socket;

// Re-export commonly used items
pub use link::{LinkAddr, LinkSocket};
pub use listener::{bind_listeners, InterfaceListener, ListenerStats, MAX_FRAME_LEN};
pub use netif::{enumerate_interfaces, NetInterface};
pub use registry::{RegistryBuilder, SocketRegistry};
pub use socket::RawSocket;
