//! Per-interface listener
//!
//! Each listener owns the socket bound on one interface and runs a blocking
//! receive loop that hands every frame to the [`Forwarder`]. Frames from one
//! interface are handled strictly in arrival order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::link::LinkSocket;
use super::netif::NetInterface;
use crate::error::{ForwardError, RouterError};
use crate::forward::{ForwardOutcome, Forwarder};

/// Largest frame a listener will read
pub const MAX_FRAME_LEN: usize = 65536;

/// Frame counters for one listener
#[derive(Debug, Default)]
pub struct ListenerStats {
    pub received: AtomicU64,
    pub forwarded: AtomicU64,
    pub malformed: AtomicU64,
    pub no_route: AtomicU64,
    pub expired: AtomicU64,
    pub transmit_errors: AtomicU64,
    pub receive_errors: AtomicU64,
}

impl ListenerStats {
    fn record(&self, outcome: &ForwardOutcome) {
        let counter = match outcome {
            ForwardOutcome::Forwarded { .. } => &self.forwarded,
            ForwardOutcome::Dropped(ForwardError::MalformedHeader(_)) => &self.malformed,
            ForwardOutcome::Dropped(ForwardError::NoRoute(_)) => &self.no_route,
            ForwardOutcome::Dropped(ForwardError::TtlExpired) => &self.expired,
            ForwardOutcome::Dropped(
                ForwardError::NoEgressSocket(_) | ForwardError::Transmit { .. },
            ) => &self.transmit_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
            + self.no_route.load(Ordering::Relaxed)
            + self.expired.load(Ordering::Relaxed)
            + self.transmit_errors.load(Ordering::Relaxed)
    }
}

/// A socket bound to one interface, ready to receive
pub struct InterfaceListener<S> {
    iface: NetInterface,
    socket: Arc<S>,
    stats: Arc<ListenerStats>,
}

impl<S: LinkSocket> InterfaceListener<S> {
    pub fn new(iface: NetInterface, socket: S) -> Self {
        InterfaceListener {
            iface,
            socket: Arc::new(socket),
            stats: Arc::new(ListenerStats::default()),
        }
    }

    pub fn interface(&self) -> &NetInterface {
        &self.iface
    }

    /// The listener's socket, for registering it as an egress socket.
    pub fn socket(&self) -> Arc<S> {
        Arc::clone(&self.socket)
    }

    pub fn stats(&self) -> Arc<ListenerStats> {
        Arc::clone(&self.stats)
    }

    /// Receive one frame and run it through the forwarder.
    ///
    /// Only a failed receive is an error; every frame that was read ends in
    /// a [`ForwardOutcome`].
    pub fn receive_one(
        &self,
        buf: &mut [u8],
        forwarder: &Forwarder<S>,
    ) -> Result<ForwardOutcome, RouterError> {
        let (n, from) = self
            .socket
            .recv_from(buf)
            .map_err(RouterError::Receive)?;
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        match from.mac() {
            Some(mac) => debug!("{}: received {} bytes from {}", self.iface.name, n, mac),
            None => debug!("{}: received {} bytes", self.iface.name, n),
        }

        let outcome = forwarder.process(&mut buf[..n], &from);
        self.stats.record(&outcome);
        Ok(outcome)
    }

    /// Receive and forward frames until the process exits.
    pub fn run(self, forwarder: Forwarder<S>) {
        info!(
            "{}: waiting for incoming packets on interface {}",
            self.iface.name, self.iface.index
        );
        let mut buf = vec![0u8; MAX_FRAME_LEN];

        loop {
            match self.receive_one(&mut buf, &forwarder) {
                Ok(ForwardOutcome::Forwarded {
                    ifindex, next_hop, ..
                }) => {
                    debug!(
                        "{}: forwarded via interface {} to {}",
                        self.iface.name, ifindex, next_hop
                    );
                }
                Ok(ForwardOutcome::Dropped(ForwardError::NoRoute(dst))) => {
                    debug!("{}: there is no route for {}", self.iface.name, dst);
                }
                Ok(ForwardOutcome::Dropped(e)) => {
                    warn!("{}: dropped frame: {}", self.iface.name, e);
                }
                Err(e) => {
                    self.stats.receive_errors.fetch_add(1, Ordering::Relaxed);
                    error!("{}: {}", self.iface.name, e);
                }
            }
        }
    }
}

/// Open a socket on every interface in `interfaces`.
///
/// A failure on one interface is logged and returned alongside the
/// listeners that did bind; it never prevents the others from binding.
pub fn bind_listeners<S, F>(
    interfaces: &[NetInterface],
    mut open: F,
) -> (Vec<InterfaceListener<S>>, Vec<RouterError>)
where
    S: LinkSocket,
    F: FnMut(&NetInterface) -> std::io::Result<S>,
{
    let mut listeners = Vec::new();
    let mut failures = Vec::new();

    for iface in interfaces {
        info!("listen on interface {}:{}", iface.name, iface.index);
        match open(iface) {
            Ok(socket) => listeners.push(InterfaceListener::new(iface.clone(), socket)),
            Err(source) => {
                let e = RouterError::Socket {
                    interface: iface.name.clone(),
                    source,
                };
                error!("{}", e);
                failures.push(e);
            }
        }
    }

    (listeners, failures)
}
