#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use labelns_infrastructure::dns::transport::{read_with_length_prefix, send_with_length_prefix};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// TCP upstream answering every question with the same address set.
pub struct MockTcpDnsServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTcpDnsServer {
    pub async fn start(addresses: Vec<IpAddr>, ttl: u32) -> Result<Self, std::io::Error> {
        Self::start_with_rcode(addresses, ttl, ResponseCode::NoError).await
    }

    /// Answers with `rcode` and whatever addresses are given.
    pub async fn start_with_rcode(
        addresses: Vec<IpAddr>,
        ttl: u32,
        rcode: ResponseCode,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let connections = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = listener.accept() => {
                        let Ok((mut stream, _)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let addresses = addresses.clone();
                        tokio::spawn(async move {
                            if let Ok(query) = read_with_length_prefix(&mut stream).await {
                                let response = Self::build_mock_response(&query, &addresses, ttl, rcode);
                                let _ = send_with_length_prefix(&mut stream, &response).await;
                            }
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr,
            connections,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    fn build_mock_response(
        query: &[u8],
        addresses: &[IpAddr],
        ttl: u32,
        rcode: ResponseCode,
    ) -> Vec<u8> {
        let request = Message::from_vec(query).expect("mock upstream got a bad query");
        let question = request.queries()[0].clone();

        let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
        response.set_recursion_desired(true);
        response.set_response_code(rcode);
        response.add_query(question.clone());

        for address in addresses {
            let rdata = match address {
                IpAddr::V4(ip) => RData::A(A(*ip)),
                IpAddr::V6(ip) => RData::AAAA(AAAA(*ip)),
            };
            response.add_answer(Record::from_rdata(question.name().clone(), ttl, rdata));
        }

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        response.emit(&mut encoder).expect("mock response encodes");
        buf
    }
}

impl Drop for MockTcpDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
