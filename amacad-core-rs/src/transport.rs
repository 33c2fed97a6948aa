//! UDP transport for AMACAD packets
//!
//! Broadcast packets go to every configured peer, or to the limited
//! broadcast address when no peers are configured.

use crate::message::{Destination, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Default UDP port for AMACAD nodes
pub const DEFAULT_PORT: u16 = 9970;

/// Maximum datagram size
const MAX_MSG_SIZE: usize = 65536;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("packet encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// UDP transport for sending and receiving AMACAD packets
pub struct Transport {
    socket: Arc<UdpSocket>,
    port: u16,
    peers: Vec<SocketAddr>,
    incoming_tx: mpsc::Sender<(Packet, SocketAddr)>,
    incoming_rx: mpsc::Receiver<(Packet, SocketAddr)>,
}

impl Transport {
    /// Bind to `0.0.0.0:port`; `peers` replaces network broadcast when non-empty
    pub async fn new(port: u16, peers: Vec<SocketAddr>) -> Result<Self, TransportError> {
        Self::bind(SocketAddr::from(([0, 0, 0, 0], port)), peers).await
    }

    /// Bind to an explicit local address
    pub async fn bind(addr: SocketAddr, peers: Vec<SocketAddr>) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await?;
        socket.set_broadcast(true)?;
        let port = socket.local_addr()?.port();

        let (incoming_tx, incoming_rx) = mpsc::channel(256);

        Ok(Self {
            socket: Arc::new(socket),
            port,
            peers,
            incoming_tx,
            incoming_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn peers(&self) -> &[SocketAddr] {
        &self.peers
    }

    /// Start receiving packets in background
    pub fn start_receive(&self) {
        let socket = self.socket.clone();
        let tx = self.incoming_tx.clone();

        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_MSG_SIZE];

            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, src)) => match Packet::from_bytes(&buf[..len]) {
                        Ok(packet) => {
                            if tx.send((packet, src)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse packet from {}: {}", src, e);
                        }
                    },
                    Err(e) => {
                        error!("UDP receive error: {}", e);
                    }
                }
            }
        });
    }

    /// Receive the next packet and the datagram's source address
    pub async fn recv(&mut self) -> Option<(Packet, SocketAddr)> {
        self.incoming_rx.recv().await
    }

    /// Send a packet according to its destination
    pub async fn send(&self, packet: &Packet) -> Result<(), TransportError> {
        let bytes = packet.to_bytes()?;

        match packet.dest {
            Destination::Unicast(addr) => {
                debug!("Sending {} bytes to {}", bytes.len(), addr);
                self.socket.send_to(&bytes, addr).await?;
            }
            Destination::Broadcast if self.peers.is_empty() => {
                let addr = SocketAddr::from(([255, 255, 255, 255], self.port));
                debug!("Broadcasting {} bytes to {}", bytes.len(), addr);
                self.socket.send_to(&bytes, addr).await?;
            }
            Destination::Broadcast => {
                for addr in &self.peers {
                    if let Err(e) = self.socket.send_to(&bytes, addr).await {
                        warn!("Failed to send to {}: {}", addr, e);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Body;

    #[tokio::test]
    async fn test_unicast_roundtrip() {
        let mut receiver = Transport::bind("127.0.0.1:0".parse().unwrap(), vec![]).await.unwrap();
        receiver.start_receive();
        let sender = Transport::bind("127.0.0.1:0".parse().unwrap(), vec![]).await.unwrap();

        let packet = Packet {
            src: sender.local_addr().unwrap(),
            dest: Destination::Unicast(receiver.local_addr().unwrap()),
            body: Body::Data(b"ping".to_vec()),
        };
        sender.send(&packet).await.unwrap();

        let (received, from) = receiver.recv().await.unwrap();
        assert_eq!(received, packet);
        assert_eq!(from, sender.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_broadcast_fans_out_to_peers() {
        let mut a = Transport::bind("127.0.0.1:0".parse().unwrap(), vec![]).await.unwrap();
        let mut b = Transport::bind("127.0.0.1:0".parse().unwrap(), vec![]).await.unwrap();
        a.start_receive();
        b.start_receive();

        let peers = vec![a.local_addr().unwrap(), b.local_addr().unwrap()];
        let sender = Transport::bind("127.0.0.1:0".parse().unwrap(), peers).await.unwrap();

        let packet = Packet {
            src: sender.local_addr().unwrap(),
            dest: Destination::Broadcast,
            body: Body::Data(b"hello".to_vec()),
        };
        sender.send(&packet).await.unwrap();

        assert_eq!(a.recv().await.unwrap().0, packet);
        assert_eq!(b.recv().await.unwrap().0, packet);
    }
}
