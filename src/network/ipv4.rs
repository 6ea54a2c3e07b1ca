//! IPv4 header codec
//!
//! Parses the fixed 20-byte IPv4 header at the start of a frame's network
//! payload and serializes it back. Options are not supported: a header whose
//! IHL is anything other than 5 is rejected.
//!
//! Features:
//! - IPv4 header parsing and serialization
//! - Checksum calculation and validation
//! - The TTL mutation a forwarding hop performs

use std::net::Ipv4Addr;

use crate::network::header_checksum;
use byteorder::{BigEndian, ByteOrder};

pub const IPV4_HEADER_LEN: usize = 20;
const IPV4_VERSION: u8 = 4;
const DEFAULT_IHL: u8 = 5; // 5 * 4 = 20 bytes (standard header length)

/// Reasons a buffer cannot be decoded as an option-less IPv4 header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("header too short: need 20 bytes, got {actual}")]
    TooShort { actual: usize },
    #[error("unsupported IP version: {0}")]
    UnsupportedVersion(u8),
    #[error("unsupported header length: {0} bytes (options are not supported)")]
    UnsupportedHeaderLength(usize),
    #[error("total length {0} is smaller than the header")]
    TotalLengthTooSmall(u16),
}

/// IPv4 packet header structure
///
/// Represents the standard 20-byte IPv4 header as defined in RFC 791
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length
    pub tos: u8, // Type of Service
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16, // Flags and Fragment Offset
    pub ttl: u8,                // Time to Live
    pub protocol: u8,           // Next Protocol
    pub checksum: u16,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
}

impl Ipv4Header {
    /// Create a new option-less IPv4 header
    ///
    /// The checksum is left at zero; call [`update_checksum`](Self::update_checksum)
    /// once all fields are set.
    pub fn new(
        total_len: u16,
        ttl: u8,
        protocol: u8,
        src_addr: Ipv4Addr,
        dst_addr: Ipv4Addr,
    ) -> Self {
        Ipv4Header {
            version: IPV4_VERSION,
            ihl: DEFAULT_IHL,
            tos: 0,
            total_len,
            id: 0,
            flags_frag_offset: 0,
            ttl,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        }
    }

    /// Parse IPv4 header from byte slice
    ///
    /// Only the first 20 bytes are read; anything after them is payload.
    pub fn from_bytes(data: &[u8]) -> Result<Self, HeaderError> {
        if data.len() < IPV4_HEADER_LEN {
            return Err(HeaderError::TooShort { actual: data.len() });
        }

        let version = (data[0] & 0xF0) >> 4;
        if version != IPV4_VERSION {
            return Err(HeaderError::UnsupportedVersion(version));
        }

        let ihl = data[0] & 0x0F;
        if ihl != DEFAULT_IHL {
            return Err(HeaderError::UnsupportedHeaderLength(ihl as usize * 4));
        }

        let total_len = BigEndian::read_u16(&data[2..4]);
        if (total_len as usize) < IPV4_HEADER_LEN {
            return Err(HeaderError::TotalLengthTooSmall(total_len));
        }

        Ok(Ipv4Header {
            version,
            ihl,
            tos: data[1],
            total_len,
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            dst_addr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        })
    }

    /// Convert IPv4 header to bytes
    ///
    /// Serializes the header to a 20-byte array ready for transmission
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (self.version << 4) | self.ihl;
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        bytes[12..16].copy_from_slice(&self.src_addr.octets());
        bytes[16..20].copy_from_slice(&self.dst_addr.octets());

        bytes
    }

    /// Write the header over the first 20 bytes of `buf`
    ///
    /// The caller guarantees `buf` holds at least a full header, which is
    /// always true for a buffer this header was decoded from.
    pub fn write_to(&self, buf: &mut [u8]) {
        buf[..IPV4_HEADER_LEN].copy_from_slice(&self.to_bytes());
    }

    /// Decrement TTL by one hop
    ///
    /// A TTL of zero wraps around to 255.
    pub fn decrement_ttl(&mut self) {
        self.ttl = self.ttl.wrapping_sub(1);
    }

    /// Update checksum after modifying header fields
    ///
    /// Zeroes the checksum field, then recalculates it over the header.
    pub fn update_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = header_checksum(&self.to_bytes());
    }

    /// Returns true if the header checksum is valid
    pub fn has_valid_checksum(&self) -> bool {
        header_checksum(&self.to_bytes()) == self.checksum
    }
}

/// IPv4 protocol constants
pub mod protocol {
    pub const ICMP: u8 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytes() -> [u8; IPV4_HEADER_LEN] {
        let mut header = Ipv4Header::new(
            84,
            64,
            protocol::ICMP,
            Ipv4Addr::new(10, 0, 1, 10),
            Ipv4Addr::new(10, 0, 2, 10),
        );
        header.tos = 0xb8;
        header.id = 0x1c46;
        header.flags_frag_offset = 0x4000;
        header.update_checksum();
        header.to_bytes()
    }

    #[test]
    fn test_parse_fields() {
        let header = Ipv4Header::from_bytes(&sample_bytes()).unwrap();
        assert_eq!(header.version, 4);
        assert_eq!(header.ihl, 5);
        assert_eq!(header.tos, 0xb8);
        assert_eq!(header.total_len, 84);
        assert_eq!(header.id, 0x1c46);
        assert_eq!(header.flags_frag_offset, 0x4000);
        assert_eq!(header.ttl, 64);
        assert_eq!(header.protocol, protocol::ICMP);
        assert_eq!(header.src_addr, Ipv4Addr::new(10, 0, 1, 10));
        assert_eq!(header.dst_addr, Ipv4Addr::new(10, 0, 2, 10));
        assert!(header.has_valid_checksum());
    }

    #[test]
    fn test_unmutated_header_reencodes_identically() {
        let mut bytes = sample_bytes();
        // Arbitrary checksum and reserved flag bit must survive untouched.
        bytes[6] |= 0x80;
        bytes[10] = 0x12;
        bytes[11] = 0x34;
        let header = Ipv4Header::from_bytes(&bytes).unwrap();
        assert_eq!(header.to_bytes(), bytes);
    }

    #[test]
    fn test_parse_ignores_trailing_payload() {
        let mut frame = sample_bytes().to_vec();
        frame.extend_from_slice(&[0xaa; 64]);
        let header = Ipv4Header::from_bytes(&frame).unwrap();
        assert_eq!(header.to_bytes()[..], frame[..IPV4_HEADER_LEN]);
    }

    #[test]
    fn test_reject_short_buffer() {
        let bytes = sample_bytes();
        assert_eq!(
            Ipv4Header::from_bytes(&bytes[..19]),
            Err(HeaderError::TooShort { actual: 19 })
        );
        assert_eq!(
            Ipv4Header::from_bytes(&[]),
            Err(HeaderError::TooShort { actual: 0 })
        );
    }

    #[test]
    fn test_reject_options() {
        let mut bytes = sample_bytes();
        bytes[0] = 0x46;
        assert_eq!(
            Ipv4Header::from_bytes(&bytes),
            Err(HeaderError::UnsupportedHeaderLength(24))
        );

        bytes[0] = 0x44;
        assert_eq!(
            Ipv4Header::from_bytes(&bytes),
            Err(HeaderError::UnsupportedHeaderLength(16))
        );
    }

    #[test]
    fn test_reject_wrong_version() {
        let mut bytes = sample_bytes();
        bytes[0] = 0x65;
        assert_eq!(
            Ipv4Header::from_bytes(&bytes),
            Err(HeaderError::UnsupportedVersion(6))
        );
    }

    #[test]
    fn test_reject_inconsistent_total_length() {
        let mut bytes = sample_bytes();
        bytes[2] = 0;
        bytes[3] = 19;
        assert_eq!(
            Ipv4Header::from_bytes(&bytes),
            Err(HeaderError::TotalLengthTooSmall(19))
        );
    }

    #[test]
    fn test_reencode_and_checksum_across_field_values() {
        for i in 0..=255u16 {
            let mut header = Ipv4Header::new(
                20 + i * 5,
                i as u8,
                i.wrapping_mul(7) as u8,
                Ipv4Addr::new(10, i as u8, (i * 3) as u8, (i * 5) as u8),
                Ipv4Addr::new((i * 11) as u8, 0, 2, i as u8),
            );
            header.tos = i.wrapping_mul(37) as u8;
            header.id = i.wrapping_mul(0x9e37);
            header.flags_frag_offset = i.wrapping_mul(0x1234);
            header.checksum = i.wrapping_mul(0x0101);

            // Whatever the stored checksum, decoding and re-encoding is lossless.
            let bytes = header.to_bytes();
            assert_eq!(Ipv4Header::from_bytes(&bytes).unwrap().to_bytes(), bytes);

            header.update_checksum();
            let bytes = header.to_bytes();
            assert_eq!(crate::network::checksum(&bytes), 0, "header {:02x?}", bytes);
            let decoded = Ipv4Header::from_bytes(&bytes).unwrap();
            assert!(decoded.has_valid_checksum());
            assert_eq!(decoded, header);
        }
    }

    #[test]
    fn test_decrement_ttl() {
        let mut header = Ipv4Header::from_bytes(&sample_bytes()).unwrap();
        header.decrement_ttl();
        assert_eq!(header.ttl, 63);

        header.ttl = 1;
        header.decrement_ttl();
        assert_eq!(header.ttl, 0);

        header.decrement_ttl();
        assert_eq!(header.ttl, 255);
    }

    #[test]
    fn test_update_checksum_after_mutation() {
        let mut header = Ipv4Header::from_bytes(&sample_bytes()).unwrap();
        header.decrement_ttl();
        assert!(!header.has_valid_checksum());
        header.update_checksum();
        assert!(header.has_valid_checksum());
        assert_eq!(crate::network::checksum(&header.to_bytes()), 0);
    }
}
