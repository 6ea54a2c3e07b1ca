//! Interface socket registry
//!
//! Maps an interface index to the socket bound on it, so a listener can
//! transmit through another interface's socket. The registry is assembled by
//! a [`RegistryBuilder`] during startup and frozen before any listener
//! thread starts; after that it is shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

/// Write-once collection phase of the registry
#[derive(Debug)]
pub struct RegistryBuilder<S> {
    sockets: HashMap<u32, Arc<S>>,
}

impl<S> Default for RegistryBuilder<S> {
    fn default() -> Self {
        RegistryBuilder {
            sockets: HashMap::new(),
        }
    }
}

impl<S> RegistryBuilder<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the socket bound on `ifindex`.
    ///
    /// Returns false, leaving the first registration in place, if the
    /// interface already has a socket.
    pub fn register(&mut self, ifindex: u32, socket: Arc<S>) -> bool {
        if self.sockets.contains_key(&ifindex) {
            return false;
        }
        self.sockets.insert(ifindex, socket);
        true
    }

    /// Finish registration. No sockets can be added afterwards.
    pub fn build(self) -> SocketRegistry<S> {
        SocketRegistry {
            sockets: self.sockets,
        }
    }
}

/// Frozen interface index -> socket map
#[derive(Debug)]
pub struct SocketRegistry<S> {
    sockets: HashMap<u32, Arc<S>>,
}

impl<S> SocketRegistry<S> {
    pub fn get(&self, ifindex: u32) -> Option<&S> {
        self.sockets.get(&ifindex).map(Arc::as_ref)
    }

    pub fn contains(&self, ifindex: u32) -> bool {
        self.sockets.contains_key(&ifindex)
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut builder = RegistryBuilder::new();
        assert!(builder.register(2, Arc::new("eth1")));
        assert!(builder.register(3, Arc::new("eth2")));
        let registry = builder.build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(2), Some(&"eth1"));
        assert_eq!(registry.get(3), Some(&"eth2"));
        assert_eq!(registry.get(4), None);
        assert!(!registry.contains(4));
    }

    #[test]
    fn test_first_registration_wins() {
        let mut builder = RegistryBuilder::new();
        assert!(builder.register(2, Arc::new("first")));
        assert!(!builder.register(2, Arc::new("second")));
        assert_eq!(builder.build().get(2), Some(&"first"));
    }
}
