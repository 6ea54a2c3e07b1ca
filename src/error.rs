//! Error types for the forwarder.

use std::io;
use std::net::Ipv4Addr;

use crate::network::HeaderError;

/// Reasons the forwarding pipeline drops a frame.
///
/// None of these stop a listener; they are reported back to it and the
/// receive loop carries on with the next frame.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("malformed IPv4 header: {0}")]
    MalformedHeader(#[from] HeaderError),
    #[error("no route for {0}")]
    NoRoute(Ipv4Addr),
    #[error("TTL expired in transit")]
    TtlExpired,
    #[error("no socket registered for egress interface {0}")]
    NoEgressSocket(u32),
    #[error("transmit on interface {ifindex} failed: {source}")]
    Transmit {
        ifindex: u32,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while starting or running the router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("cannot open packet socket on {interface}: {source}")]
    Socket {
        interface: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot start listener thread for {interface}: {source}")]
    Spawn {
        interface: String,
        #[source]
        source: io::Error,
    },
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),
    #[error("cannot enumerate network interfaces: {0}")]
    Enumerate(#[source] io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("duplicate route for {0}")]
    DuplicateRoute(Ipv4Addr),
    #[error("no interface could be bound")]
    NoListeners,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_names_the_thread_not_the_socket() {
        let e = RouterError::Spawn {
            interface: "r0-eth2".to_string(),
            source: io::Error::from(io::ErrorKind::OutOfMemory),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("cannot start listener thread for r0-eth2: "));
        assert!(!msg.contains("packet socket"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn test_header_error_converts_to_malformed() {
        let e: ForwardError = HeaderError::TooShort { actual: 3 }.into();
        assert!(matches!(e, ForwardError::MalformedHeader(_)));
        assert_eq!(
            e.to_string(),
            "malformed IPv4 header: header too short: need 20 bytes, got 3"
        );
    }
}
