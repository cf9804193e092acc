use labelns_domain::notify_event::{is_valid_channel, EMPTY_ANSWER};
use labelns_domain::{DnsQuery, DnsRecord, NotifyEvent, PeerEndpoint, RecordType, TransportKind};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn udp_peer() -> PeerEndpoint {
    PeerEndpoint::udp("203.0.113.9:5353".parse().unwrap())
}

#[test]
fn test_query_name_is_canonical() {
    let query = DnsQuery::new("LO.Example.com", RecordType::A, udp_peer());
    assert_eq!(&*query.name, "lo.example.com.");
}

#[test]
fn test_peer_ip_folds_mapped_addresses() {
    let mapped: SocketAddr = "[::ffff:203.0.113.9]:5353".parse().unwrap();
    let peer = PeerEndpoint::tcp(mapped);
    assert_eq!(peer.ip(), Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))));
    assert_eq!(peer.port(), Some(5353));
}

#[test]
fn test_unix_peer_has_no_address() {
    let peer = PeerEndpoint::unix();
    assert_eq!(peer.transport, TransportKind::Unix);
    assert_eq!(peer.ip(), None);
}

#[test]
fn test_record_type_accepts_matching_family() {
    let v4 = IpAddr::V4(Ipv4Addr::LOCALHOST);
    assert!(RecordType::A.accepts(&v4));
    assert!(RecordType::ANY.accepts(&v4));
    assert!(!RecordType::AAAA.accepts(&v4));
    assert_eq!("aaaa".parse::<RecordType>().unwrap(), RecordType::AAAA);
    assert!("MX".parse::<RecordType>().is_err());
}

#[test]
fn test_notify_event_fields() {
    let query = DnsQuery::new("n-chan.lo.example.com.", RecordType::A, udp_peer());
    let record = DnsRecord::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)), 60);

    let event = NotifyEvent::answered(&query, &record);
    assert_eq!(event.remote_ip, Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))));
    assert_eq!(event.remote_port, Some(5353));
    assert_eq!(event.remote_network, "udp");
    assert_eq!(event.qtype, "A");
    assert_eq!(event.rr, "203.0.113.9");
    assert!(event.ok);

    assert_eq!(NotifyEvent::empty(&query).rr, EMPTY_ANSWER);

    let failed = NotifyEvent::failed("x.example.com.", None, &udp_peer(), "boom");
    assert_eq!(failed.qtype, "n/a");
    assert!(!failed.ok);
}

#[test]
fn test_channel_names_are_single_labels() {
    assert!(is_valid_channel("my-chan_1"));
    assert!(!is_valid_channel(""));
    assert!(!is_valid_channel("a.b"));
    assert!(!is_valid_channel(&"x".repeat(64)));
}
