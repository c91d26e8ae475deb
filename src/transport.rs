use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::watch;

use crate::config::{RETRY_ATTEMPTS, UDP_MAX_SIZE};
use crate::types::message::{DecodeError, Message};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("timed out waiting for a datagram")]
    Timeout,
    #[error("transport is closed")]
    Closed,
    #[error("malformed datagram: {0}")]
    Malformed(#[from] DecodeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Datagram endpoint shared by every process in the simulation.
///
/// `None` as a timeout waits indefinitely.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fire-and-forget; failures are logged, never returned.
    async fn send(&self, message: &Message, port: u16);

    async fn receive_datagram(&self, timeout: Option<Duration>) -> Result<Vec<u8>, TransportError>;

    async fn receive(&self, timeout: Option<Duration>) -> Result<Message, TransportError> {
        let datagram = self.receive_datagram(timeout).await?;
        Ok(Message::try_from(datagram.as_slice())?)
    }

    /// Sends to the scheduler and waits for one reply, resending on timeout.
    /// `None` means every attempt timed out or the endpoint failed.
    async fn call_and_wait(&self, message: &Message, timeout: Option<Duration>) -> Option<Message>;

    fn local_port(&self) -> u16;

    fn close(&self);
}

pub struct UdpTransport {
    receiver: UdpSocket,
    sender: UdpSocket,
    port: u16,
    scheduler_port: u16,
    attempts: u32,
    closed: watch::Sender<bool>,
}

impl UdpTransport {
    /// Binds the receive socket on `port` (0 picks an ephemeral one).
    pub async fn bind(port: u16, scheduler_port: u16) -> io::Result<Self> {
        let receiver = UdpSocket::bind((Ipv4Addr::LOCALHOST, port)).await?;
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = receiver.local_addr()?.port();
        let (closed, _) = watch::channel(false);
        Ok(Self {
            receiver,
            sender,
            port,
            scheduler_port,
            attempts: RETRY_ATTEMPTS,
            closed,
        })
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, message: &Message, port: u16) {
        let target = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        if let Err(err) = self.sender.send_to(&message.encode(), target).await {
            error!("failed to send {message} to port {port}: {err}");
        }
    }

    async fn receive_datagram(&self, timeout: Option<Duration>) -> Result<Vec<u8>, TransportError> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return Err(TransportError::Closed);
        }

        let recv = async {
            let mut buf = vec![0u8; UDP_MAX_SIZE];
            let (len, _) = match timeout {
                Some(limit) => tokio::time::timeout(limit, self.receiver.recv_from(&mut buf))
                    .await
                    .map_err(|_| TransportError::Timeout)??,
                None => self.receiver.recv_from(&mut buf).await?,
            };
            buf.truncate(len);
            Ok::<_, TransportError>(buf)
        };

        tokio::select! {
            _ = closed.changed() => Err(TransportError::Closed),
            received = recv => received,
        }
    }

    async fn call_and_wait(&self, message: &Message, timeout: Option<Duration>) -> Option<Message> {
        for attempt in 1..=self.attempts {
            self.send(message, self.scheduler_port).await;
            match self.receive(timeout).await {
                Ok(reply) => return Some(reply),
                Err(TransportError::Timeout) => {
                    debug!(
                        "port {}: attempt {attempt}/{} timed out",
                        self.port, self.attempts
                    );
                }
                Err(err) => {
                    warn!("port {}: no usable reply: {err}", self.port);
                    return None;
                }
            }
        }
        None
    }

    fn local_port(&self) -> u16 {
        self.port
    }

    fn close(&self) {
        self.closed.send_replace(true);
    }
}
