//! Network layer protocols implementation
//!
//! This module contains the pieces of the network layer a forwarder touches:
//! - IPv4: header parsing and serialization
//! - Ethernet: hardware addresses and the IPv4 ethertype
//! - Checksums: the Internet checksum used by the IPv4 header

pub mod ethernet;
pub mod ipv4;

// Re-export commonly used items
pub use ethernet::{MacAddr, ETH_P_IP};
pub use ipv4::{HeaderError, Ipv4Header, IPV4_HEADER_LEN};

/// Byte offset of the checksum field inside an IPv4 header
const CHECKSUM_OFFSET: usize = 10;

/// Calculate Internet checksum
///
/// Algorithm: Sum data in 16-bit chunks, add carry bits to the sum,
/// and return the one's complement of the result.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum = 0u32;

    // Process data in 2-byte chunks
    for chunk in data.chunks_exact(2) {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    // Handle odd-length data by padding with zero
    if data.len() % 2 != 0 {
        if let Some(&last_byte) = data.last() {
            sum += (last_byte as u32) << 8;
        }
    }

    fold(sum)
}

/// Calculate the IPv4 header checksum (RFC 791 §3.1)
///
/// Sums every 16-bit word of the 20-byte header except the checksum field
/// at offsets 10-11, so the caller does not need to zero it first.
pub fn header_checksum(header: &[u8; IPV4_HEADER_LEN]) -> u16 {
    let mut sum = 0u32;

    for (i, chunk) in header.chunks_exact(2).enumerate() {
        if i * 2 == CHECKSUM_OFFSET {
            continue;
        }
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    fold(sum)
}

/// Fold carries back into the low 16 bits and complement.
fn fold(mut sum: u32) -> u16 {
    // A second pass is needed when the first fold itself carries out.
    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !sum as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example header from the Wikipedia IPv4 checksum article.
    const SAMPLE: [u8; 20] = [
        0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0xb8, 0x61, 0xc0, 0xa8, 0x00,
        0x01, 0xc0, 0xa8, 0x00, 0xc7,
    ];

    #[test]
    fn test_header_checksum_known_value() {
        assert_eq!(header_checksum(&SAMPLE), 0xb861);
    }

    #[test]
    fn test_header_checksum_ignores_checksum_field() {
        let mut zeroed = SAMPLE;
        zeroed[10] = 0;
        zeroed[11] = 0;
        assert_eq!(header_checksum(&zeroed), header_checksum(&SAMPLE));

        let mut garbage = SAMPLE;
        garbage[10] = 0xde;
        garbage[11] = 0xad;
        assert_eq!(header_checksum(&garbage), 0xb861);
    }

    #[test]
    fn test_verification_identity() {
        let mut header = SAMPLE;
        header[10] = 0;
        header[11] = 0;
        let sum = header_checksum(&header);
        header[10..12].copy_from_slice(&sum.to_be_bytes());

        // Summing the whole header, checksum included, yields zero.
        assert_eq!(checksum(&header), 0);
    }

    #[test]
    fn test_double_carry_fold() {
        // 8 * 0xFFFF + 1 = 0x7FFF9; the first fold gives 0x10000.
        let mut header = [0xFFu8; 20];
        header[10] = 0;
        header[11] = 0;
        header[18] = 0x00;
        header[19] = 0x01;
        let sum = header_checksum(&header);
        assert_eq!(sum, 0xFFFE);
        header[10..12].copy_from_slice(&sum.to_be_bytes());
        assert_eq!(checksum(&header), 0);
    }

    #[test]
    fn test_verification_identity_across_headers() {
        for i in 0..=255u32 {
            let mut header = [0u8; IPV4_HEADER_LEN];
            header[0] = 0x45;
            header[1] = (i * 37) as u8;
            header[2..4].copy_from_slice(&(20 + (i * 251) as u16).to_be_bytes());
            header[4..6].copy_from_slice(&((i * 0x9e37) as u16).to_be_bytes());
            header[6..8].copy_from_slice(&((i * 0x1234) as u16).to_be_bytes());
            header[8] = i as u8;
            header[9] = (i * 7) as u8;
            header[10] = (i * 13) as u8;
            header[11] = (i * 29) as u8;
            for (k, b) in header[12..].iter_mut().enumerate() {
                *b = (i * (k as u32 + 3) + 0xa5) as u8;
            }

            let sum = header_checksum(&header);
            header[10..12].copy_from_slice(&sum.to_be_bytes());
            assert_eq!(checksum(&header), 0, "header {:02x?}", header);
            assert_eq!(header_checksum(&header), sum);
        }
    }

    #[test]
    fn test_checksum_odd_length() {
        assert_eq!(checksum(&[0x01]), !0x0100u16);
    }
}
