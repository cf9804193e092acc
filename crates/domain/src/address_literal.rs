//! Addresses embedded in a single DNS label.
//!
//! Three grammars share one token:
//!
//! * three hyphens: dotted IPv4 with `-` for `.` (`192-0-2-1`), falling back
//!   to IPv6 when the token is not a dotted quad (`2001-db8--1`)
//! * any other non-zero number of hyphens: IPv6 with `-` for `:`
//! * no hyphen: the compact codec, lowercase hex of the address octets
//!   (8 digits for IPv4, 32 for IPv6)

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::DomainError;

pub fn parse_label_address(token: &str) -> Result<IpAddr, DomainError> {
    match token.matches('-').count() {
        0 => compact::decode(token),
        3 => token
            .replace('-', ".")
            .parse::<Ipv4Addr>()
            .map(IpAddr::V4)
            .or_else(|_| parse_v6(token)),
        _ => parse_v6(token),
    }
}

fn parse_v6(token: &str) -> Result<IpAddr, DomainError> {
    token
        .replace('-', ":")
        .parse::<Ipv6Addr>()
        .map(IpAddr::V6)
        .map_err(|_| DomainError::InvalidAddressLiteral(token.to_string()))
}

/// Hyphenated form of an address, the inverse of [`parse_label_address`].
pub fn encode_label_address(address: &IpAddr) -> String {
    match address {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{}-{}-{}-{}", a, b, c, d)
        }
        IpAddr::V6(v6) => encode_v6(v6),
    }
}

fn encode_v6(address: &Ipv6Addr) -> String {
    let segments = address.segments();
    let (start, len) = longest_zero_run(&segments);
    if len < 2 {
        return join_segments(&segments);
    }

    let compressed = format!(
        "{}--{}",
        join_segments(&segments[..start]),
        join_segments(&segments[start + len..])
    );
    // Three-hyphen tokens are reserved for dotted IPv4.
    if compressed.matches('-').count() == 3 {
        return join_segments(&segments);
    }
    compressed
}

fn longest_zero_run(segments: &[u16; 8]) -> (usize, usize) {
    let (mut best_start, mut best_len) = (0, 0);
    let mut i = 0;
    while i < segments.len() {
        if segments[i] != 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < segments.len() && segments[i] == 0 {
            i += 1;
        }
        if i - start > best_len {
            best_start = start;
            best_len = i - start;
        }
    }
    (best_start, best_len)
}

fn join_segments(segments: &[u16]) -> String {
    segments
        .iter()
        .map(|s| format!("{:x}", s))
        .collect::<Vec<_>>()
        .join("-")
}

pub mod compact {
    use super::*;

    pub fn encode(address: &IpAddr) -> String {
        match address {
            IpAddr::V4(v4) => hex::encode(v4.octets()),
            IpAddr::V6(v6) => hex::encode(v6.octets()),
        }
    }

    pub fn decode(token: &str) -> Result<IpAddr, DomainError> {
        let invalid = || DomainError::InvalidAddressLiteral(token.to_string());
        let bytes = hex::decode(token).map_err(|_| invalid())?;

        match bytes.len() {
            4 => {
                let octets: [u8; 4] = bytes.try_into().map_err(|_| invalid())?;
                Ok(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            16 => {
                let octets: [u8; 16] = bytes.try_into().map_err(|_| invalid())?;
                Ok(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            _ => Err(invalid()),
        }
    }
}
