mod helpers;

use helpers::{dns_config, udp_query, use_case_with, RecordingHub, PEER};
use labelns_domain::notify_event::EMPTY_ANSWER;
use labelns_domain::{DomainError, RecordType};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

#[tokio::test]
async fn test_publishes_one_event_per_record() {
    let hub = Arc::new(RecordingHub::new());
    let use_case = use_case_with(dns_config(&["example.com."]), None, Some(hub.clone()));

    let query = udp_query("n-chan.lo.example.com.", RecordType::A);
    let records = use_case.execute(&query).await.unwrap();
    assert_eq!(records.len(), 1);

    let events = hub.events();
    assert_eq!(events.len(), 1);
    let (channel, event) = &events[0];
    assert_eq!(channel, "chan");
    assert_eq!(event.name, "n-chan.lo.example.com.");
    assert_eq!(event.qtype, "A");
    assert_eq!(event.rr, "203.0.113.9");
    assert_eq!(event.remote_ip, Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))));
    assert_eq!(event.remote_port, Some(PEER.rsplit(':').next().unwrap().parse().unwrap()));
    assert_eq!(event.remote_network, "udp");
    assert!(event.ok);
}

#[tokio::test]
async fn test_publishes_empty_event_when_nested_passes() {
    let hub = Arc::new(RecordingHub::new());
    let use_case = use_case_with(dns_config(&["example.com."]), None, Some(hub.clone()));

    let query = udp_query("n-chan.4-10-0-0-1.example.com.", RecordType::AAAA);
    use_case.execute(&query).await.unwrap();

    let events = hub.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1.rr, EMPTY_ANSWER);
    assert_eq!(events[0].1.qtype, "AAAA");
    assert!(events[0].1.ok);
}

#[tokio::test]
async fn test_publishes_handler_errors() {
    let hub = Arc::new(RecordingHub::new());
    let use_case = use_case_with(dns_config(&["example.com."]), None, Some(hub.clone()));

    let query = labelns_domain::DnsQuery::new(
        "n-chan.lo.example.com.",
        RecordType::A,
        labelns_domain::PeerEndpoint::unix(),
    );
    let result = use_case.execute(&query).await;
    assert_eq!(result, Err(DomainError::UnsupportedPeer("unix")));

    let events = hub.events();
    assert_eq!(events.len(), 1);
    assert!(!events[0].1.ok);
    assert_eq!(events[0].1.rr, DomainError::UnsupportedPeer("unix").to_string());
    assert_eq!(events[0].1.remote_network, "unix");
}

#[tokio::test]
async fn test_reports_nested_grammar_error_before_failing() {
    let hub = Arc::new(RecordingHub::new());
    let use_case = use_case_with(dns_config(&["example.com."]), None, Some(hub.clone()));

    let query = udp_query("n-chan.6-notanip.example.com.", RecordType::AAAA);
    let result = use_case.execute(&query).await;
    assert!(matches!(result, Err(DomainError::InvalidAddressLiteral(_))));

    let events = hub.events();
    assert_eq!(events.len(), 1);
    let (channel, event) = &events[0];
    assert_eq!(channel, "chan");
    assert_eq!(event.qtype, "n/a");
    assert_eq!(
        event.rr,
        DomainError::InvalidAddressLiteral("notanip".to_string()).to_string()
    );
    assert!(!event.ok);
}

#[tokio::test]
async fn test_notify_keeps_nested_limiter() {
    let hub = Arc::new(RecordingHub::new());
    let use_case = use_case_with(dns_config(&["example.com."]), None, Some(hub.clone()));
    let query = udp_query("n-chan.4-10-0-0-1.4-10-0-0-2.example.com.", RecordType::A);

    let first = use_case.execute(&query).await.unwrap();
    let second = use_case.execute(&query).await.unwrap();

    assert_eq!(first[0].address, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(second[0].address, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));

    let rrs: Vec<String> = hub.events().into_iter().map(|(_, e)| e.rr).collect();
    assert_eq!(rrs, vec!["10.0.0.1".to_string(), EMPTY_ANSWER.to_string()]);
}

#[tokio::test]
async fn test_silent_without_hub() {
    let use_case = use_case_with(dns_config(&["example.com."]), None, None);
    let query = udp_query("n-chan.lo.example.com.", RecordType::A);
    assert_eq!(use_case.execute(&query).await.unwrap().len(), 1);
}
