use super::group::{ServerError, ServerGroup};
use crate::di::Services;
use labelns_domain::config::parse_socket_addr;
use labelns_domain::{Config, PeerEndpoint};
use labelns_infrastructure::dns::proxy_protocol::read_proxy_header;
use labelns_infrastructure::dns::transport::{read_with_length_prefix, send_with_length_prefix};
use labelns_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

const UDP_RECV_BUFFER: usize = 4096;
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Binds every configured DNS listener and hands it to `group`. Binding
/// errors surface here, before anything is served.
pub async fn start_dns_listeners(
    group: &mut ServerGroup,
    config: &Config,
    services: &Services,
) -> anyhow::Result<()> {
    let socket_addr = parse_socket_addr("server.listen", &config.server.listen)?;

    let udp_socket = Arc::new(create_udp_socket(socket_addr)?);
    let tcp_listener = create_tcp_listener(socket_addr)?;
    info!(bind_address = %socket_addr, proxy_protocol = config.server.proxy_protocol, "DNS listeners bound");

    group.spawn(
        "udp",
        serve_udp(
            udp_socket,
            Arc::clone(&services.dns_handler),
            group.shutdown_token(),
            group.tracker(),
        ),
    );
    group.spawn(
        "tcp",
        serve_tcp(
            tcp_listener,
            Arc::clone(&services.dns_handler),
            config.server.proxy_protocol,
            group.shutdown_token(),
            group.tracker(),
        ),
    );

    start_unix_listener(group, config, services)?;

    Ok(())
}

#[cfg(unix)]
fn start_unix_listener(
    group: &mut ServerGroup,
    config: &Config,
    services: &Services,
) -> anyhow::Result<()> {
    let Some(path) = &config.server.unix_socket else {
        return Ok(());
    };

    let listener = create_unix_listener(path)?;
    info!(path = %path, "Unix DNS listener bound");
    group.spawn(
        "unix",
        serve_unix(
            listener,
            Arc::clone(&services.dns_handler),
            group.shutdown_token(),
            group.tracker(),
        ),
    );
    Ok(())
}

#[cfg(not(unix))]
fn start_unix_listener(
    _group: &mut ServerGroup,
    config: &Config,
    _services: &Services,
) -> anyhow::Result<()> {
    if config.server.unix_socket.is_some() {
        warn!("Unix sockets are not supported on this platform, ignoring server.unix_socket");
    }
    Ok(())
}

fn socket_domain(socket_addr: SocketAddr) -> Domain {
    if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    }
}

pub fn create_udp_socket(socket_addr: SocketAddr) -> Result<UdpSocket, ServerError> {
    let bind_error = |source| ServerError::Bind {
        addr: format!("udp://{}", socket_addr),
        source,
    };

    let socket = Socket::new(socket_domain(socket_addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(bind_error)?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false).map_err(bind_error)?;
    }
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.bind(&socket_addr.into()).map_err(bind_error)?;
    socket.set_nonblocking(true).map_err(bind_error)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket).map_err(bind_error)
}

pub fn create_tcp_listener(socket_addr: SocketAddr) -> Result<TcpListener, ServerError> {
    let bind_error = |source| ServerError::Bind {
        addr: format!("tcp://{}", socket_addr),
        source,
    };

    let socket = Socket::new(socket_domain(socket_addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_error)?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false).map_err(bind_error)?;
    }
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.bind(&socket_addr.into()).map_err(bind_error)?;
    socket.listen(1024).map_err(bind_error)?;
    socket.set_nonblocking(true).map_err(bind_error)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener).map_err(bind_error)
}

#[cfg(unix)]
pub fn create_unix_listener(path: &str) -> Result<tokio::net::UnixListener, ServerError> {
    let bind_error = |source| ServerError::Bind {
        addr: format!("unix://{}", path),
        source,
    };

    // A stale socket file from a previous run blocks bind.
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            return Err(bind_error(e));
        }
    }
    tokio::net::UnixListener::bind(path).map_err(bind_error)
}

pub async fn serve_udp(
    socket: Arc<UdpSocket>,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
) -> Result<(), ServerError> {
    let mut recv_buf = [0u8; UDP_RECV_BUFFER];

    loop {
        let (n, from) = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok(received) => received,
                // ICMP port unreachable from an earlier reply, not a listener fault.
                Err(e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(ServerError::Listener { listener: "udp", source }),
            },
        };

        let request: Arc<[u8]> = Arc::from(&recv_buf[..n]);
        let socket = Arc::clone(&socket);
        let handler = Arc::clone(&handler);
        tracker.spawn(async move {
            if let Some(response) = handler.handle_raw(&request, PeerEndpoint::udp(from)).await {
                if let Err(e) = socket.send_to(&response, from).await {
                    debug!(peer = %from, error = %e, "UDP send failed");
                }
            }
        });
    }
}

pub async fn serve_tcp(
    listener: TcpListener,
    handler: Arc<DnsServerHandler>,
    proxy_protocol: bool,
    shutdown: CancellationToken,
    tracker: TaskTracker,
) -> Result<(), ServerError> {
    loop {
        let (stream, socket_peer) = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) if is_transient_accept_error(&e) => {
                    debug!(error = %e, "TCP accept failed");
                    continue;
                }
                Err(source) => return Err(ServerError::Listener { listener: "tcp", source }),
            },
        };

        let handler = Arc::clone(&handler);
        let shutdown = shutdown.clone();
        tracker.spawn(async move {
            let _ = stream.set_nodelay(true);
            handle_tcp_connection(stream, socket_peer, proxy_protocol, handler, shutdown).await;
        });
    }
}

async fn handle_tcp_connection(
    mut stream: TcpStream,
    socket_peer: SocketAddr,
    proxy_protocol: bool,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) {
    let mut peer_addr = socket_peer;

    if proxy_protocol {
        match read_proxy_header(&mut stream).await {
            Ok(Some(header)) => {
                if let Some(source) = header.source() {
                    debug!(socket_peer = %socket_peer, source = %source, "PROXY header accepted");
                    peer_addr = source;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(peer = %socket_peer, error = %e, "Rejected PROXY header");
                return;
            }
        }
    }

    serve_stream(stream, PeerEndpoint::tcp(peer_addr), handler, shutdown).await;
}

#[cfg(unix)]
pub async fn serve_unix(
    listener: tokio::net::UnixListener,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
) -> Result<(), ServerError> {
    loop {
        let stream = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) if is_transient_accept_error(&e) => {
                    debug!(error = %e, "Unix accept failed");
                    continue;
                }
                Err(source) => return Err(ServerError::Listener { listener: "unix", source }),
            },
        };

        let handler = Arc::clone(&handler);
        let shutdown = shutdown.clone();
        tracker.spawn(serve_stream(stream, PeerEndpoint::unix(), handler, shutdown));
    }
}

/// Length-prefixed request/response loop shared by TCP and Unix sockets.
async fn serve_stream<S>(
    mut stream: S,
    peer: PeerEndpoint,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let request = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = tokio::time::timeout(TCP_IDLE_TIMEOUT, read_with_length_prefix(&mut stream)) => {
                match read {
                    Ok(Ok(request)) => request,
                    Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                    Ok(Err(e)) => {
                        debug!(peer = %peer, error = %e, "Stream read failed");
                        break;
                    }
                    Err(_) => {
                        debug!(peer = %peer, "Idle stream closed");
                        break;
                    }
                }
            }
        };

        let Some(response) = handler.handle_raw(&request, peer).await else {
            continue;
        };
        if let Err(e) = send_with_length_prefix(&mut stream, &response).await {
            debug!(peer = %peer, error = %e, "Stream write failed");
            break;
        }
    }
}

fn is_transient_accept_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{Message, MessageType, OpCode, Query};
    use hickory_proto::rr::{Name, RData, RecordType};
    use labelns_infrastructure::dns::forwarding::MessageBuilder;
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use tokio::io::AsyncWriteExt;

    fn test_handler() -> Arc<DnsServerHandler> {
        let mut config = Config::default();
        config.dns.zones = vec!["example.com.".to_string()];
        config.upstream.proxy_enabled = false;
        Services::new(&config).unwrap().dns_handler
    }

    fn request(id: u16, name: &str) -> Vec<u8> {
        let mut query = Query::new();
        query.set_name(Name::from_str(name).unwrap());
        query.set_query_type(RecordType::A);
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.add_query(query);
        MessageBuilder::serialize_message(&message).unwrap()
    }

    fn first_a(bytes: &[u8]) -> Option<Ipv4Addr> {
        let response = Message::from_vec(bytes).unwrap();
        response.answers().iter().find_map(|record| match record.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
    }

    fn spawn_tcp(proxy_protocol: bool) -> (SocketAddr, CancellationToken) {
        let listener = create_tcp_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(serve_tcp(
            listener,
            test_handler(),
            proxy_protocol,
            shutdown.clone(),
            TaskTracker::new(),
        ));
        (addr, shutdown)
    }

    #[tokio::test]
    async fn test_udp_round_trip() {
        let socket = Arc::new(create_udp_socket("127.0.0.1:0".parse().unwrap()).unwrap());
        let addr = socket.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(serve_udp(
            socket,
            test_handler(),
            shutdown.clone(),
            TaskTracker::new(),
        ));

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .send_to(&request(7, "4-192-0-2-7.example.com."), addr)
            .await
            .unwrap();
        let mut buf = [0u8; 512];
        let (n, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first_a(&buf[..n]), Some(Ipv4Addr::new(192, 0, 2, 7)));

        shutdown.cancel();
        assert!(server.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_tcp_loopback_uses_socket_peer() {
        let (addr, shutdown) = spawn_tcp(true);

        let mut stream = TcpStream::connect(addr).await.unwrap();
        send_with_length_prefix(&mut stream, &request(1, "lo.example.com."))
            .await
            .unwrap();
        let response = read_with_length_prefix(&mut stream).await.unwrap();

        assert_eq!(first_a(&response), Some(Ipv4Addr::LOCALHOST));
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_tcp_proxy_header_sets_peer() {
        let (addr, shutdown) = spawn_tcp(true);

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"PROXY TCP4 198.51.100.7 192.0.2.1 1234 53\r\n")
            .await
            .unwrap();

        for id in 1..=2 {
            send_with_length_prefix(&mut stream, &request(id, "lo.example.com."))
                .await
                .unwrap();
            let response = read_with_length_prefix(&mut stream).await.unwrap();
            assert_eq!(first_a(&response), Some(Ipv4Addr::new(198, 51, 100, 7)));
        }
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_tcp_proxy_header_ignored_when_disabled() {
        let (addr, shutdown) = spawn_tcp(false);

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"PROXY TCP4 198.51.100.7 192.0.2.1 1234 53\r\n")
            .await
            .unwrap();
        let _ = send_with_length_prefix(&mut stream, &request(1, "lo.example.com.")).await;

        // The header is read as a bogus length prefix, so no valid answer arrives.
        let response = tokio::time::timeout(
            Duration::from_millis(500),
            read_with_length_prefix(&mut stream),
        )
        .await;
        assert!(!matches!(response, Ok(Ok(ref bytes)) if first_a(bytes).is_some()));
        shutdown.cancel();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unix_socket_round_trip() {
        let path = std::env::temp_dir().join(format!("labelns-test-{}.sock", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        let listener = create_unix_listener(&path).unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(serve_unix(
            listener,
            test_handler(),
            shutdown.clone(),
            TaskTracker::new(),
        ));

        let mut stream = tokio::net::UnixStream::connect(&path).await.unwrap();
        send_with_length_prefix(&mut stream, &request(3, "lo.example.com."))
            .await
            .unwrap();
        let response = read_with_length_prefix(&mut stream).await.unwrap();
        let response = Message::from_vec(&response).unwrap();

        // Unix peers carry no address: the loopback handler cannot answer and
        // the query fails.
        assert_eq!(
            response.response_code(),
            hickory_proto::op::ResponseCode::ServFail
        );

        send_with_length_prefix(&mut stream, &request(4, "4-192-0-2-9.example.com."))
            .await
            .unwrap();
        let response = read_with_length_prefix(&mut stream).await.unwrap();
        assert_eq!(first_a(&response), Some(Ipv4Addr::new(192, 0, 2, 9)));

        shutdown.cancel();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_transient_accept_errors() {
        assert!(is_transient_accept_error(&io::Error::from(
            io::ErrorKind::ConnectionAborted
        )));
        assert!(!is_transient_accept_error(&io::Error::from(
            io::ErrorKind::PermissionDenied
        )));
    }
}
