//! Streaming transport
//!
//! Drains the [`SnapshotSlot`] onto a connected UDP socket. Idle ticks sleep
//! for the poll interval; there is no acknowledgement, retry or queue.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use facelink_core::{FacelinkError, FacelinkResult};

use crate::slot::{SnapshotSlot, TransportStats};

/// Default idle sleep between slot checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Where datagrams are sent
    pub destination: SocketAddr,
    /// Local address to bind; unspecified of the destination's family by default
    pub bind: SocketAddr,
    /// Idle sleep between slot checks
    pub poll_interval: Duration,
}

impl TransportConfig {
    pub fn new(destination: SocketAddr) -> Self {
        let bind = match destination {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        TransportConfig {
            destination,
            bind,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Outbound LiveLink stream over one connected UDP socket
pub struct StreamingTransport {
    socket: UdpSocket,
    slot: Arc<SnapshotSlot>,
    config: TransportConfig,
    local_addr: SocketAddr,
}

impl StreamingTransport {
    /// Bind and connect to the configured destination
    pub async fn connect(config: TransportConfig, slot: Arc<SnapshotSlot>) -> FacelinkResult<Self> {
        let socket = UdpSocket::bind(config.bind)
            .await
            .map_err(|e| FacelinkError::TransportError(e.to_string()))?;

        socket
            .connect(config.destination)
            .await
            .map_err(|e| FacelinkError::TransportError(e.to_string()))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| FacelinkError::TransportError(e.to_string()))?;

        Ok(StreamingTransport {
            socket,
            slot,
            config,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn destination(&self) -> SocketAddr {
        self.config.destination
    }

    pub fn slot(&self) -> Arc<SnapshotSlot> {
        Arc::clone(&self.slot)
    }

    pub fn stats(&self) -> TransportStats {
        self.slot.stats()
    }

    /// One tick: send the pending snapshot if there is one.
    ///
    /// Returns `true` if a send was attempted. Send failures are logged and
    /// counted, never returned.
    pub async fn drain_once(&self) -> bool {
        match self.slot.take() {
            Some(snapshot) => {
                self.send(&snapshot).await;
                true
            }
            None => false,
        }
    }

    async fn send(&self, snapshot: &Bytes) {
        match self.socket.send(snapshot).await {
            Ok(_) => self.slot.record_sent(),
            Err(e) => {
                self.slot.record_send_error();
                tracing::warn!("LiveLink send to {} failed: {}", self.config.destination, e);
            }
        }
    }

    /// Run until a shutdown signal arrives
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            destination = %self.config.destination,
            local = %self.local_addr,
            "Streaming transport started"
        );

        loop {
            if self.drain_once().await {
                // Sent; a shutdown may have arrived meanwhile
                if !matches!(shutdown.try_recv(), Err(broadcast::error::TryRecvError::Empty)) {
                    break;
                }
                continue;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        let stats = self.slot.stats();
        tracing::info!(
            sent = stats.sent,
            coalesced = stats.coalesced,
            send_errors = stats.send_errors,
            "Streaming transport stopped"
        );
    }

    /// Spawn the loop on the current runtime
    pub fn spawn(self) -> TransportHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let slot = self.slot();
        let local_addr = self.local_addr;
        let task = tokio::spawn(self.run(shutdown_rx));

        TransportHandle {
            shutdown_tx,
            task,
            slot,
            local_addr,
        }
    }
}

/// Handle to a spawned transport loop
pub struct TransportHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
    slot: Arc<SnapshotSlot>,
    local_addr: SocketAddr,
}

impl TransportHandle {
    pub fn slot(&self) -> Arc<SnapshotSlot> {
        Arc::clone(&self.slot)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> TransportStats {
        self.slot.stats()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal the loop to stop and wait for it
    pub async fn shutdown(self) -> FacelinkResult<()> {
        let _ = self.shutdown_tx.send(());
        self.task
            .await
            .map_err(|e| FacelinkError::TransportError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::LiveLinkListener;
    use facelink_core::BlendshapeChannel;
    use facelink_state::AnimationFrame;
    use facelink_wire::encode;

    async fn receiver() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_connect() {
        let rx = receiver().await;
        let config = TransportConfig::new(rx.local_addr().unwrap());
        let transport = StreamingTransport::connect(config, Arc::new(SnapshotSlot::new()))
            .await
            .unwrap();

        assert_ne!(transport.local_addr().port(), 0);
        assert_eq!(transport.destination(), rx.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_idle_tick_sends_nothing() {
        let rx = receiver().await;
        let transport = StreamingTransport::connect(
            TransportConfig::new(rx.local_addr().unwrap()),
            Arc::new(SnapshotSlot::new()),
        )
        .await
        .unwrap();

        assert!(!transport.drain_once().await);
        assert_eq!(transport.stats(), TransportStats::default());
    }

    #[tokio::test]
    async fn test_coalesces_to_latest() {
        let rx = receiver().await;
        let slot = Arc::new(SnapshotSlot::new());
        let transport =
            StreamingTransport::connect(TransportConfig::new(rx.local_addr().unwrap()), slot.clone())
                .await
                .unwrap();

        slot.publish(Bytes::from_static(b"first"));
        slot.publish(Bytes::from_static(b"second"));

        assert!(transport.drain_once().await);
        assert!(!transport.drain_once().await);

        let mut buf = [0u8; 64];
        let (len, _) = rx.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"second");

        let stats = transport.stats();
        assert_eq!(stats.published, 2);
        assert_eq!(stats.coalesced, 1);
        assert_eq!(stats.sent, 1);
    }

    #[tokio::test]
    async fn test_spawned_loop_delivers_frames() {
        let listener = LiveLinkListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let config = TransportConfig::new(listener.local_addr())
            .with_poll_interval(Duration::from_millis(1));
        let slot = Arc::new(SnapshotSlot::new());
        let handle = StreamingTransport::connect(config, slot.clone())
            .await
            .unwrap()
            .spawn();
        assert!(handle.is_running());

        let mut frame = AnimationFrame::builder().filter_size(1).build().unwrap();
        frame.set(BlendshapeChannel::JawOpen, 0.75);
        slot.publish(encode(&frame));

        let (decoded, _) = tokio::time::timeout(Duration::from_secs(2), listener.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(decoded.found);
        assert_eq!(decoded.frame.id(), frame.id());
        assert_eq!(decoded.frame.get(BlendshapeChannel::JawOpen), 0.75);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_send_failure_keeps_running() {
        // Nothing listens on the destination; on most platforms the
        // resulting ICMP error surfaces on a later send.
        let rx = receiver().await;
        let destination = rx.local_addr().unwrap();
        drop(rx);

        let slot = Arc::new(SnapshotSlot::new());
        let transport =
            StreamingTransport::connect(TransportConfig::new(destination), slot.clone())
                .await
                .unwrap();

        for i in 0..3u8 {
            slot.publish(Bytes::from(vec![i; 4]));
            assert!(transport.drain_once().await);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let stats = transport.stats();
        assert_eq!(stats.sent + stats.send_errors, 3);
    }
}
