// src/transport.rs
//! Outbound CoT delivery: the sink the poller writes to and the transmit
//! worker draining it to the network

use crate::error::{LincotError, Result};
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::{
    io::AsyncWriteExt,
    net::{lookup_host, TcpStream, UdpSocket},
    sync::mpsc,
};
use tracing::{debug, info};
use url::Url;

/// Depth of the transmit queue between poller and transmitter
pub const TX_QUEUE_SIZE: usize = 64;

/// Destination for serialized CoT events
pub trait CotSink {
    /// Hand one serialized event over for transmission
    fn put(&mut self, event: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

impl CotSink for mpsc::Sender<Vec<u8>> {
    async fn put(&mut self, event: Vec<u8>) -> Result<()> {
        self.send(event)
            .await
            .map_err(|_| LincotError::Transport("Transmit queue is closed".to_string()))
    }
}

/// Collects events in memory
impl CotSink for Vec<Vec<u8>> {
    async fn put(&mut self, event: Vec<u8>) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// Where the transmit worker sends events, parsed from `COT_URL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CotUrl {
    /// `tcp://host:port`, one stream for the whole run
    Tcp(String),
    /// `udp://host:port`, one datagram per event (multicast groups work)
    Udp(String),
    /// `log://stdout` or `log://stderr`
    Log(LogTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

impl FromStr for CotUrl {
    type Err = LincotError;

    fn from_str(s: &str) -> Result<Self> {
        let url = Url::parse(s)?;

        if url.scheme() == "log" {
            return match url.host_str() {
                Some("stdout") | None => Ok(CotUrl::Log(LogTarget::Stdout)),
                Some("stderr") => Ok(CotUrl::Log(LogTarget::Stderr)),
                Some(other) => Err(LincotError::Config(format!(
                    "Unknown log target '{}' in COT_URL, expected stdout or stderr",
                    other
                ))),
            };
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| LincotError::Config(format!("COT_URL '{}' has no host", s)))?;
        let port = url
            .port()
            .ok_or_else(|| LincotError::Config(format!("COT_URL '{}' has no port", s)))?;
        let addr = format!("{}:{}", host, port);

        match url.scheme() {
            "tcp" => Ok(CotUrl::Tcp(addr)),
            "udp" => Ok(CotUrl::Udp(addr)),
            scheme => Err(LincotError::Config(format!(
                "Unsupported COT_URL scheme '{}', expected tcp, udp or log",
                scheme
            ))),
        }
    }
}

impl fmt::Display for CotUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CotUrl::Tcp(addr) => write!(f, "tcp://{}", addr),
            CotUrl::Udp(addr) => write!(f, "udp://{}", addr),
            CotUrl::Log(LogTarget::Stdout) => write!(f, "log://stdout"),
            CotUrl::Log(LogTarget::Stderr) => write!(f, "log://stderr"),
        }
    }
}

/// An opened destination
enum Connection {
    Tcp(TcpStream),
    Udp(UdpSocket),
    Stdout(tokio::io::Stdout),
    Stderr(tokio::io::Stderr),
}

impl Connection {
    async fn open(url: &CotUrl) -> Result<Self> {
        match url {
            CotUrl::Tcp(addr) => {
                let stream = TcpStream::connect(addr).await.map_err(|e| {
                    LincotError::Transport(format!("Failed to connect to {}: {}", url, e))
                })?;
                Ok(Connection::Tcp(stream))
            }
            CotUrl::Udp(addr) => {
                let target = resolve(addr).await?;
                let bind = if target.is_ipv6() {
                    SocketAddr::from(([0u16; 8], 0))
                } else {
                    SocketAddr::from(([0u8; 4], 0))
                };
                let socket = UdpSocket::bind(bind).await?;
                socket.connect(target).await.map_err(|e| {
                    LincotError::Transport(format!("Failed to set UDP peer {}: {}", url, e))
                })?;
                Ok(Connection::Udp(socket))
            }
            CotUrl::Log(LogTarget::Stdout) => Ok(Connection::Stdout(tokio::io::stdout())),
            CotUrl::Log(LogTarget::Stderr) => Ok(Connection::Stderr(tokio::io::stderr())),
        }
    }

    async fn send(&mut self, event: &[u8]) -> Result<()> {
        match self {
            Connection::Tcp(stream) => stream.write_all(event).await?,
            Connection::Udp(socket) => {
                socket.send(event).await?;
            }
            Connection::Stdout(out) => {
                out.write_all(event).await?;
                out.flush().await?;
            }
            Connection::Stderr(err) => {
                err.write_all(event).await?;
                err.flush().await?;
            }
        }
        Ok(())
    }
}

async fn resolve(addr: &str) -> Result<SocketAddr> {
    lookup_host(addr)
        .await
        .map_err(|e| LincotError::Transport(format!("Failed to resolve {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| LincotError::Transport(format!("No address found for {}", addr)))
}

/// Drains the transmit queue to the configured destination.
///
/// The destination is opened once; there is no reconnection, and a
/// failed write ends the worker with an error.
pub struct TxWorker {
    queue: mpsc::Receiver<Vec<u8>>,
    url: CotUrl,
}

impl TxWorker {
    /// Create a worker and the sending half of its queue
    pub fn new(url: CotUrl) -> (Self, mpsc::Sender<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(TX_QUEUE_SIZE);
        (Self { queue: rx, url }, tx)
    }

    /// Send queued events until every sender is dropped
    pub async fn run(mut self) -> Result<()> {
        let mut connection = Connection::open(&self.url).await?;
        info!(url = %self.url, "Transmit worker connected");

        while let Some(event) = self.queue.recv().await {
            connection.send(&event).await?;
            debug!(url = %self.url, bytes = event.len(), "Sent CoT event");
        }

        debug!("Transmit queue closed");
        Ok(())
    }
}
