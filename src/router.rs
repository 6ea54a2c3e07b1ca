//! Router startup
//!
//! Startup happens in a fixed order: bind a socket on every interface,
//! register all of them, freeze the registry, and only then start the
//! listener threads. No listener can see a partially built registry.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::forward::{Forwarder, TtlPolicy};
use crate::iface::{
    bind_listeners, enumerate_interfaces, InterfaceListener, LinkSocket, ListenerStats,
    NetInterface, RawSocket, RegistryBuilder,
};
use crate::routing::RouteTable;

struct Worker {
    iface: NetInterface,
    stats: Arc<ListenerStats>,
    _handle: JoinHandle<()>,
}

/// A running forwarder: one listener thread per bound interface.
///
/// Listener threads are never joined; they end with the process.
pub struct Router {
    workers: Vec<Worker>,
}

impl Router {
    /// Start forwarding on the host's interfaces as configured.
    pub fn start(config: &RouterConfig) -> Result<Router, RouterError> {
        let routes = Arc::new(config.route_table()?);
        info!("loaded {} static routes", routes.len());

        let interfaces =
            enumerate_interfaces(&config.router.interfaces).map_err(RouterError::Enumerate)?;

        Self::spawn(interfaces, routes, config.router.ttl_policy, |iface| {
            RawSocket::bind_ipv4(iface.index)
        })
    }

    /// Bind, register and spawn listeners using `open` to create sockets.
    pub fn spawn<S, F>(
        interfaces: Vec<NetInterface>,
        routes: Arc<RouteTable>,
        ttl_policy: TtlPolicy,
        open: F,
    ) -> Result<Router, RouterError>
    where
        S: LinkSocket + 'static,
        F: FnMut(&NetInterface) -> std::io::Result<S>,
    {
        let (listeners, forwarder) = prepare(&interfaces, routes, ttl_policy, open)?;

        let mut workers = Vec::with_capacity(listeners.len());
        for listener in listeners {
            let iface = listener.interface().clone();
            let stats = listener.stats();
            let forwarder = forwarder.clone();

            let spawned = thread::Builder::new()
                .name(format!("listen-{}", iface.name))
                .spawn(move || listener.run(forwarder));

            match spawned {
                Ok(handle) => workers.push(Worker {
                    iface,
                    stats,
                    _handle: handle,
                }),
                // The socket stays registered, so routes through this
                // interface still transmit; only its ingress is lost.
                Err(source) => error!(
                    "{}",
                    RouterError::Spawn {
                        interface: iface.name.clone(),
                        source,
                    }
                ),
            }
        }

        if workers.is_empty() {
            return Err(RouterError::NoListeners);
        }

        Ok(Router { workers })
    }

    /// Names of the interfaces being listened on.
    pub fn interfaces(&self) -> impl Iterator<Item = &NetInterface> {
        self.workers.iter().map(|w| &w.iface)
    }

    /// Log per-interface frame counters.
    pub fn log_stats(&self) {
        for worker in &self.workers {
            let s = &worker.stats;
            info!(
                "{}: received {}, forwarded {}, dropped {} (malformed {}, no route {}, expired {}, transmit {}), receive errors {}",
                worker.iface.name,
                s.received.load(Ordering::Relaxed),
                s.forwarded.load(Ordering::Relaxed),
                s.dropped(),
                s.malformed.load(Ordering::Relaxed),
                s.no_route.load(Ordering::Relaxed),
                s.expired.load(Ordering::Relaxed),
                s.transmit_errors.load(Ordering::Relaxed),
                s.receive_errors.load(Ordering::Relaxed),
            );
        }
    }
}

/// Bind every interface and freeze the socket registry.
///
/// Interfaces that fail to bind are skipped. Fails only if none bind.
pub fn prepare<S, F>(
    interfaces: &[NetInterface],
    routes: Arc<RouteTable>,
    ttl_policy: TtlPolicy,
    open: F,
) -> Result<(Vec<InterfaceListener<S>>, Forwarder<S>), RouterError>
where
    S: LinkSocket,
    F: FnMut(&NetInterface) -> std::io::Result<S>,
{
    let (listeners, failures) = bind_listeners(interfaces, open);
    if listeners.is_empty() {
        return Err(RouterError::NoListeners);
    }
    if !failures.is_empty() {
        info!(
            "{} of {} interfaces bound",
            listeners.len(),
            interfaces.len()
        );
    }

    let mut builder = RegistryBuilder::new();
    for listener in &listeners {
        builder.register(listener.interface().index, listener.socket());
    }
    let registry = Arc::new(builder.build());

    let forwarder = Forwarder::new(routes, registry).with_ttl_policy(ttl_policy);
    Ok((listeners, forwarder))
}
