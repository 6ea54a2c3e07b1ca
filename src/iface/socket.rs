//! Raw link-layer (`AF_PACKET`) socket
//!
//! The socket is opened as `SOCK_DGRAM`, so the kernel strips the Ethernet
//! header on receive and builds it from the destination [`LinkAddr`] on send.
//! Buffers handed to and from this socket start at the IPv4 header.

use std::os::fd::RawFd;
use std::{io, mem, ptr};

use super::link::{LinkAddr, LinkSocket};
use crate::network::ethernet::ethertype_to_socket;
use crate::network::ETH_P_IP;

/// A packet socket receiving IPv4 frames on one interface.
///
/// The descriptor is closed when the socket is dropped.
#[derive(Debug)]
pub struct RawSocket {
    fd: RawFd,
}

impl RawSocket {
    /// Open a packet socket for IPv4 and bind it to `ifindex`.
    ///
    /// # Permissions
    ///
    /// Needs `CAP_NET_RAW`; otherwise the kernel returns `EPERM`.
    pub fn bind_ipv4(ifindex: u32) -> io::Result<RawSocket> {
        let proto = ethertype_to_socket(ETH_P_IP) as libc::c_int;

        // SAFETY: plain syscall with integer arguments; the returned
        // descriptor is owned by `RawSocket` from here on.
        let socket = match unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_DGRAM, proto) } {
            ..=-1 => return Err(io::Error::last_os_error()),
            fd => RawSocket { fd },
        };

        socket.bind(&LinkAddr::bind_ipv4(ifindex))?;
        Ok(socket)
    }

    fn bind(&self, addr: &LinkAddr) -> io::Result<()> {
        let sockaddr = addr.to_sockaddr()?;

        // SAFETY: `ptr::addr_of!(sockaddr)` points to
        // `mem::size_of::<libc::sockaddr_ll>()` valid bytes.
        match unsafe {
            libc::bind(
                self.fd,
                ptr::addr_of!(sockaddr) as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        } {
            0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl LinkSocket for RawSocket {
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, LinkAddr)> {
        // SAFETY: sockaddr_ll is plain old data; all-zero is a valid value.
        let mut sockaddr: libc::sockaddr_ll = unsafe { mem::zeroed() };
        let mut sockaddr_len = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

        // SAFETY: `buf` is valid for `buf.len()` writable bytes and
        // `sockaddr_len` holds the size of the `sockaddr_ll` it points to.
        let recvd = match unsafe {
            libc::recvfrom(
                self.fd,
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                0,
                ptr::addr_of_mut!(sockaddr) as *mut libc::sockaddr,
                ptr::addr_of_mut!(sockaddr_len),
            )
        } {
            ..=-1 => return Err(io::Error::last_os_error()),
            recvd => recvd as usize,
        };

        if sockaddr.sll_family != libc::AF_PACKET as u16 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "invalid link-layer address structure (address family not AF_PACKET)",
            ));
        }

        Ok((recvd, LinkAddr::from_sockaddr(&sockaddr)))
    }

    fn send_to(&self, buf: &[u8], addr: &LinkAddr) -> io::Result<usize> {
        let sockaddr = addr.to_sockaddr()?;

        // SAFETY: `buf` is valid for `buf.len()` readable bytes and
        // `ptr::addr_of!(sockaddr)` points to a full `sockaddr_ll`.
        match unsafe {
            libc::sendto(
                self.fd,
                buf.as_ptr() as *const libc::c_void,
                buf.len(),
                0,
                ptr::addr_of!(sockaddr) as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        } {
            ..=-1 => Err(io::Error::last_os_error()),
            sent => Ok(sent as usize),
        }
    }
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        // SAFETY: `fd` was returned by `socket` and is closed only here.
        unsafe { libc::close(self.fd) };
    }
}
