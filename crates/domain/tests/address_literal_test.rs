use labelns_domain::address_literal::{compact, encode_label_address, parse_label_address};
use labelns_domain::DomainError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

fn random_v4() -> Ipv4Addr {
    Ipv4Addr::from(fastrand::u32(..))
}

fn random_v6() -> Ipv6Addr {
    // Bias towards zero groups so the compressed forms get exercised.
    let mut segments = [0u16; 8];
    for segment in &mut segments {
        if fastrand::bool() {
            *segment = fastrand::u16(..);
        }
    }
    Ipv6Addr::from(segments)
}

#[test]
fn test_parse_dotted_v4_literal() {
    let address = parse_label_address("127-0-0-1").unwrap();
    assert_eq!(address, IpAddr::V4(Ipv4Addr::LOCALHOST));
}

#[test]
fn test_parse_v6_literal_with_compression() {
    let address = parse_label_address("2001-db8--1").unwrap();
    assert_eq!(address, "2001:db8::1".parse::<IpAddr>().unwrap());
}

#[test]
fn test_three_hyphen_v6_literals() {
    let cases = [
        ("2001-db8--1", "2001:db8::1"),
        ("fe80--1-2", "fe80::1:2"),
        ("1--2-3", "1::2:3"),
    ];
    for (token, text) in cases {
        let address = parse_label_address(token).unwrap();
        assert_eq!(address, text.parse::<IpAddr>().unwrap(), "token {}", token);
    }
}

#[test]
fn test_three_hyphen_dotted_quad_stays_v4() {
    let address = parse_label_address("10-0-0-1").unwrap();
    assert_eq!(address, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
}

#[test]
fn test_parse_v6_literal_with_explicit_zero_groups() {
    let address = parse_label_address("2001-db8--0000-0000-0000-0000-0001").unwrap();
    assert_eq!(address, "2001:db8::1".parse::<IpAddr>().unwrap());
}

#[test]
fn test_parse_rejects_malformed_literals() {
    for token in ["notanip", "1-2-3", "300-1-1-1", "2001-db8-zz--1", ""] {
        let result = parse_label_address(token);
        assert!(
            matches!(result, Err(DomainError::InvalidAddressLiteral(_))),
            "{} should be rejected, got {:?}",
            token,
            result
        );
    }
}

#[test]
fn test_v4_literal_round_trip() {
    for _ in 0..500 {
        let address = IpAddr::V4(random_v4());
        let token = encode_label_address(&address);
        assert_eq!(token.matches('-').count(), 3);
        assert_eq!(parse_label_address(&token).unwrap(), address, "token {}", token);
    }
}

#[test]
fn test_v6_literal_round_trip() {
    for _ in 0..500 {
        let address = IpAddr::V6(random_v6());
        let token = encode_label_address(&address);
        assert!(!token.contains(':') && !token.contains('.'));
        assert_eq!(parse_label_address(&token).unwrap(), address, "token {}", token);
    }
}

#[test]
fn test_v6_literal_edge_addresses() {
    for text in ["::", "::1", "1::", "1:2::", "::ffff:192.0.2.1", "fe80::1:2"] {
        let address: IpAddr = text.parse().unwrap();
        let token = encode_label_address(&address);
        assert_eq!(parse_label_address(&token).unwrap(), address, "token {}", token);
    }
}

#[test]
fn test_compact_round_trip() {
    for _ in 0..500 {
        let v4 = IpAddr::V4(random_v4());
        let v6 = IpAddr::V6(random_v6());
        assert_eq!(compact::decode(&compact::encode(&v4)).unwrap(), v4);
        assert_eq!(compact::decode(&compact::encode(&v6)).unwrap(), v6);
    }
}

#[test]
fn test_compact_tokens_are_hyphen_free_and_sized_by_family() {
    let v4 = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1));
    assert_eq!(compact::encode(&v4), "c0a80001");
    assert_eq!(compact::encode(&IpAddr::V6(Ipv6Addr::LOCALHOST)).len(), 32);
    assert_eq!(parse_label_address("c0a80001").unwrap(), v4);
}

#[test]
fn test_compact_decode_accepts_uppercase() {
    assert_eq!(
        compact::decode("C0A80001").unwrap(),
        IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1))
    );
}

#[test]
fn test_compact_decode_rejects_other_lengths() {
    assert!(compact::decode("c0a800").is_err());
    assert!(compact::decode("c0a8000101").is_err());
}
