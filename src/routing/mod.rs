//! Static IPv4 routing
//!
//! Exact-match destination lookup. The table is populated once at startup
//! and only read afterwards.

pub mod table;

pub use table::{RouteEntry, RouteTable};
