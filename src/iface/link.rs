//! Link-layer addressing for packet sockets
//!
//! [`LinkAddr`] is a plain-Rust view of `sockaddr_ll`: the metadata the kernel
//! hands back with every received frame and expects with every sent one.

use std::io;

use crate::network::ethernet::{ethertype_to_socket, MAC_LEN};
use crate::network::{MacAddr, ETH_P_IP};

/// Link-layer address metadata for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkAddr {
    /// Interface index the frame arrived on or leaves through
    pub ifindex: u32,
    /// Ethertype, already in network byte order
    pub protocol: u16,
    /// ARP hardware type (`ARPHRD_*`)
    pub hatype: u16,
    /// Packet type (`PACKET_HOST`, `PACKET_OTHERHOST`, ...)
    pub pkttype: u8,
    /// Number of meaningful bytes in `addr`
    pub halen: u8,
    pub addr: [u8; 8],
}

impl LinkAddr {
    /// Address used to bind a socket to one interface for IPv4 frames only.
    pub fn bind_ipv4(ifindex: u32) -> Self {
        LinkAddr {
            ifindex,
            protocol: ethertype_to_socket(ETH_P_IP),
            ..Default::default()
        }
    }

    /// Build the egress address for a forwarded frame.
    ///
    /// Hardware type, address length and packet type are carried over from
    /// the frame's inbound metadata; interface and destination come from
    /// the route.
    pub fn egress(inbound: &LinkAddr, ifindex: u32, next_hop: MacAddr) -> Self {
        let mut addr = [0u8; 8];
        addr[..MAC_LEN].copy_from_slice(&next_hop.octets());

        LinkAddr {
            ifindex,
            protocol: ethertype_to_socket(ETH_P_IP),
            hatype: inbound.hatype,
            pkttype: inbound.pkttype,
            halen: inbound.halen,
            addr,
        }
    }

    /// The hardware address bytes, truncated to `halen`.
    pub fn hw_addr(&self) -> &[u8] {
        let len = (self.halen as usize).min(self.addr.len());
        &self.addr[..len]
    }

    /// The hardware address as a MAC, if it is exactly six bytes long.
    pub fn mac(&self) -> Option<MacAddr> {
        let bytes: [u8; MAC_LEN] = self.hw_addr().try_into().ok()?;
        Some(MacAddr::new(bytes))
    }

    pub(crate) fn to_sockaddr(self) -> io::Result<libc::sockaddr_ll> {
        let ifindex = i32::try_from(self.ifindex).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "interface index out of range")
        })?;

        Ok(libc::sockaddr_ll {
            sll_family: libc::AF_PACKET as u16,
            sll_protocol: self.protocol,
            sll_ifindex: ifindex,
            sll_hatype: self.hatype,
            sll_pkttype: self.pkttype,
            sll_halen: self.halen,
            sll_addr: self.addr,
        })
    }

    pub(crate) fn from_sockaddr(sockaddr: &libc::sockaddr_ll) -> Self {
        LinkAddr {
            ifindex: sockaddr.sll_ifindex as u32,
            protocol: sockaddr.sll_protocol,
            hatype: sockaddr.sll_hatype,
            pkttype: sockaddr.sll_pkttype,
            halen: sockaddr.sll_halen,
            addr: sockaddr.sll_addr,
        }
    }
}

/// A bound link-layer socket frames can be received from and sent through.
///
/// Implemented by [`RawSocket`](super::socket::RawSocket); tests substitute
/// in-memory sockets.
pub trait LinkSocket: Send + Sync {
    /// Block until a frame arrives; returns its length and source metadata.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, LinkAddr)>;

    /// Transmit `buf` to `addr`; returns the number of bytes sent.
    fn send_to(&self, buf: &[u8], addr: &LinkAddr) -> io::Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> LinkAddr {
        LinkAddr {
            ifindex: 2,
            protocol: ethertype_to_socket(ETH_P_IP),
            hatype: 1,
            pkttype: 0,
            halen: 6,
            addr: [0, 0, 0, 0, 0, 1, 0, 0],
        }
    }

    #[test]
    fn test_egress_copies_inbound_link_fields() {
        let next_hop = MacAddr::new([0, 0, 0, 0, 0, 2]);
        let egress = LinkAddr::egress(&inbound(), 3, next_hop);

        assert_eq!(egress.ifindex, 3);
        assert_eq!(egress.hatype, 1);
        assert_eq!(egress.pkttype, 0);
        assert_eq!(egress.halen, 6);
        assert_eq!(egress.addr, [0, 0, 0, 0, 0, 2, 0, 0]);
        assert_eq!(egress.mac(), Some(next_hop));
        assert_eq!(egress.protocol.to_ne_bytes(), [0x08, 0x00]);
    }

    #[test]
    fn test_hw_addr_respects_halen() {
        let mut addr = inbound();
        assert_eq!(addr.hw_addr(), &[0, 0, 0, 0, 0, 1]);

        addr.halen = 0;
        assert!(addr.hw_addr().is_empty());
        assert_eq!(addr.mac(), None);

        addr.halen = 200;
        assert_eq!(addr.hw_addr().len(), 8);
    }

    #[test]
    fn test_sockaddr_conversion() {
        let addr = inbound();
        let sockaddr = addr.to_sockaddr().unwrap();
        assert_eq!(sockaddr.sll_family, libc::AF_PACKET as u16);
        assert_eq!(sockaddr.sll_ifindex, 2);
        assert_eq!(LinkAddr::from_sockaddr(&sockaddr), addr);
    }

    #[test]
    fn test_bind_address() {
        let addr = LinkAddr::bind_ipv4(7);
        assert_eq!(addr.ifindex, 7);
        assert_eq!(addr.halen, 0);
        assert_eq!(addr.protocol, ethertype_to_socket(ETH_P_IP));
    }
}
