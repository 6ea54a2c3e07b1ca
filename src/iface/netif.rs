//! Host network interface enumeration

use std::io;

/// A host network interface a listener can be bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetInterface {
    /// OS interface name (e.g. "eth0", "r0-eth1")
    pub name: String,
    /// OS interface index
    pub index: u32,
}

impl NetInterface {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        NetInterface {
            name: name.into(),
            index,
        }
    }
}

/// List the host's network interfaces, sorted by index.
///
/// If `allowed` is non-empty, only interfaces named in it are returned.
pub fn enumerate_interfaces(allowed: &[String]) -> io::Result<Vec<NetInterface>> {
    let interfaces = nix::net::if_::if_nameindex().map_err(io::Error::other)?;

    let all = interfaces
        .iter()
        .map(|iface| NetInterface::new(iface.name().to_string_lossy(), iface.index()))
        .collect();

    Ok(filter_interfaces(all, allowed))
}

fn filter_interfaces(mut interfaces: Vec<NetInterface>, allowed: &[String]) -> Vec<NetInterface> {
    if !allowed.is_empty() {
        interfaces.retain(|iface| allowed.contains(&iface.name));
    }
    interfaces.sort_by_key(|iface| iface.index);
    interfaces
}
