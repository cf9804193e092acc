//! PROXY protocol (v1 text, v2 binary) header detection for TCP listeners.
//!
//! The header is inspected with `peek` so a connection without one is left
//! untouched, and stripped with a single read once it is complete.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

pub const PROXY_HEADER_TIMEOUT: Duration = Duration::from_secs(5);

const V1_PREFIX: &[u8] = b"PROXY ";
const V1_MAX_LEN: usize = 107;
const V2_SIGNATURE: &[u8; 12] = b"\r\n\r\n\0\r\nQUIT\n";
const V2_HEADER_LEN: usize = 16;
const MAX_HEADER_LEN: usize = 1024;
const PEEK_RETRY_DELAY: Duration = Duration::from_millis(5);

#[derive(Error, Debug)]
pub enum ProxyProtocolError {
    #[error("malformed PROXY header: {0}")]
    Malformed(String),

    #[error("PROXY header exceeds {MAX_HEADER_LEN} bytes")]
    TooLarge,

    #[error("connection closed before the PROXY header was complete")]
    ConnectionClosed,

    #[error("timed out waiting for PROXY header")]
    Timeout,

    #[error("I/O error while reading PROXY header: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyHeader {
    /// Connection relayed on behalf of `source`.
    Proxied {
        source: SocketAddr,
        destination: SocketAddr,
    },
    /// LOCAL command or UNKNOWN family: the socket peer stays authoritative.
    Local,
}

impl ProxyHeader {
    pub fn source(&self) -> Option<SocketAddr> {
        match self {
            Self::Proxied { source, .. } => Some(*source),
            Self::Local => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The stream does not start with a PROXY header.
    NotProxy,
    /// More bytes are needed to decide.
    Incomplete,
    Header { header: ProxyHeader, consumed: usize },
}

/// Parses a PROXY header at the start of `buf`.
pub fn parse_header(buf: &[u8]) -> Result<ParseOutcome, ProxyProtocolError> {
    if starts_like(buf, V2_SIGNATURE) {
        if buf.len() < V2_SIGNATURE.len() {
            return Ok(ParseOutcome::Incomplete);
        }
        return parse_v2(buf);
    }
    if starts_like(buf, V1_PREFIX) {
        if buf.len() < V1_PREFIX.len() {
            return Ok(ParseOutcome::Incomplete);
        }
        return parse_v1(buf);
    }
    Ok(ParseOutcome::NotProxy)
}

fn starts_like(buf: &[u8], signature: &[u8]) -> bool {
    let n = buf.len().min(signature.len());
    n > 0 && buf[..n] == signature[..n]
}

fn parse_v1(buf: &[u8]) -> Result<ParseOutcome, ProxyProtocolError> {
    let window = &buf[..buf.len().min(V1_MAX_LEN)];
    let Some(end) = window.windows(2).position(|w| w == b"\r\n") else {
        if buf.len() >= V1_MAX_LEN {
            return Err(ProxyProtocolError::Malformed("v1 line too long".into()));
        }
        return Ok(ParseOutcome::Incomplete);
    };

    let line = std::str::from_utf8(&buf[..end])
        .map_err(|_| ProxyProtocolError::Malformed("v1 line is not ASCII".into()))?;
    let parts: Vec<&str> = line.split(' ').collect();
    let consumed = end + 2;

    match parts.as_slice() {
        ["PROXY", "UNKNOWN", ..] => Ok(ParseOutcome::Header {
            header: ProxyHeader::Local,
            consumed,
        }),
        ["PROXY", family @ ("TCP4" | "TCP6"), src, dst, sport, dport] => {
            let source = v1_address(src, sport)?;
            let destination = v1_address(dst, dport)?;
            let v4 = *family == "TCP4";
            if source.is_ipv4() != v4 || destination.is_ipv4() != v4 {
                return Err(ProxyProtocolError::Malformed(format!(
                    "address does not match {}",
                    family
                )));
            }
            Ok(ParseOutcome::Header {
                header: ProxyHeader::Proxied {
                    source,
                    destination,
                },
                consumed,
            })
        }
        _ => Err(ProxyProtocolError::Malformed(format!("v1 line '{}'", line))),
    }
}

fn v1_address(ip: &str, port: &str) -> Result<SocketAddr, ProxyProtocolError> {
    let ip: IpAddr = ip
        .parse()
        .map_err(|_| ProxyProtocolError::Malformed(format!("address '{}'", ip)))?;
    let port: u16 = port
        .parse()
        .map_err(|_| ProxyProtocolError::Malformed(format!("port '{}'", port)))?;
    Ok(SocketAddr::new(ip, port))
}

fn parse_v2(buf: &[u8]) -> Result<ParseOutcome, ProxyProtocolError> {
    if buf.len() < V2_HEADER_LEN {
        return Ok(ParseOutcome::Incomplete);
    }

    let version = buf[12] >> 4;
    let command = buf[12] & 0x0F;
    if version != 2 {
        return Err(ProxyProtocolError::Malformed(format!(
            "v2 version {}",
            version
        )));
    }

    let payload_len = u16::from_be_bytes([buf[14], buf[15]]) as usize;
    let consumed = V2_HEADER_LEN + payload_len;
    if consumed > MAX_HEADER_LEN {
        return Err(ProxyProtocolError::TooLarge);
    }
    if buf.len() < consumed {
        return Ok(ParseOutcome::Incomplete);
    }

    let payload = &buf[V2_HEADER_LEN..consumed];
    let header = match command {
        0x0 => ProxyHeader::Local,
        0x1 => match buf[13] {
            0x11 if payload.len() >= 12 => {
                let src = Ipv4Addr::new(payload[0], payload[1], payload[2], payload[3]);
                let dst = Ipv4Addr::new(payload[4], payload[5], payload[6], payload[7]);
                ProxyHeader::Proxied {
                    source: SocketAddr::new(src.into(), port_at(payload, 8)),
                    destination: SocketAddr::new(dst.into(), port_at(payload, 10)),
                }
            }
            0x21 if payload.len() >= 36 => {
                let mut src = [0u8; 16];
                let mut dst = [0u8; 16];
                src.copy_from_slice(&payload[0..16]);
                dst.copy_from_slice(&payload[16..32]);
                ProxyHeader::Proxied {
                    source: SocketAddr::new(Ipv6Addr::from(src).into(), port_at(payload, 32)),
                    destination: SocketAddr::new(Ipv6Addr::from(dst).into(), port_at(payload, 34)),
                }
            }
            0x11 | 0x21 => {
                return Err(ProxyProtocolError::Malformed(
                    "v2 address block too short".into(),
                ))
            }
            _ => ProxyHeader::Local,
        },
        other => {
            return Err(ProxyProtocolError::Malformed(format!(
                "v2 command {}",
                other
            )))
        }
    };

    Ok(ParseOutcome::Header { header, consumed })
}

fn port_at(payload: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([payload[offset], payload[offset + 1]])
}

/// Detects and strips a PROXY header. `Ok(None)` when the connection does
/// not start with one; nothing is consumed in that case.
pub async fn read_proxy_header(
    stream: &mut TcpStream,
) -> Result<Option<ProxyHeader>, ProxyProtocolError> {
    tokio::time::timeout(PROXY_HEADER_TIMEOUT, detect_and_strip(stream))
        .await
        .map_err(|_| ProxyProtocolError::Timeout)?
}

async fn detect_and_strip(
    stream: &mut TcpStream,
) -> Result<Option<ProxyHeader>, ProxyProtocolError> {
    let mut buf = vec![0u8; MAX_HEADER_LEN];
    let mut last_seen = 0;

    loop {
        let n = stream.peek(&mut buf).await?;
        if n == 0 {
            return Err(ProxyProtocolError::ConnectionClosed);
        }

        match parse_header(&buf[..n])? {
            ParseOutcome::NotProxy => return Ok(None),
            ParseOutcome::Header { header, consumed } => {
                stream.read_exact(&mut buf[..consumed]).await?;
                return Ok(Some(header));
            }
            ParseOutcome::Incomplete => {
                if n == last_seen {
                    tokio::time::sleep(PEEK_RETRY_DELAY).await;
                }
                last_seen = n;
            }
        }
    }
}
