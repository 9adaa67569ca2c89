//! LiveLink receiver

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use facelink_core::{FacelinkError, FacelinkResult};
use facelink_wire::{Decoded, LiveLinkDecoder, MAX_MESSAGE_SIZE};

/// Largest datagram accepted, the UDP payload limit over IPv4
pub const MAX_DATAGRAM_SIZE: usize = MAX_MESSAGE_SIZE;

/// UDP socket that decodes incoming LiveLink face messages
pub struct LiveLinkListener {
    socket: UdpSocket,
    decoder: LiveLinkDecoder,
    local_addr: SocketAddr,
}

impl LiveLinkListener {
    /// Bind to a local address
    pub async fn bind(addr: SocketAddr) -> FacelinkResult<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| FacelinkError::TransportError(e.to_string()))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| FacelinkError::TransportError(e.to_string()))?;

        Ok(LiveLinkListener {
            socket,
            decoder: LiveLinkDecoder::new(),
            local_addr,
        })
    }

    /// Use a custom decoder (e.g. a different filter window)
    pub fn with_decoder(mut self, decoder: LiveLinkDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive and decode one datagram
    pub async fn recv(&self) -> FacelinkResult<(Decoded, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let (len, addr) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| FacelinkError::TransportError(e.to_string()))?;

        let decoded = self.decoder.decode(&buf[..len])?;
        Ok((decoded, addr))
    }

    /// Receive until a datagram with a face arrives.
    ///
    /// Datagrams without a face and datagrams that fail to decode are skipped.
    pub async fn recv_face(&self) -> FacelinkResult<(Decoded, SocketAddr)> {
        loop {
            match self.recv().await {
                Ok((decoded, addr)) if decoded.found => return Ok((decoded, addr)),
                Ok(_) => continue,
                Err(e) if e.is_format_error() => {
                    tracing::warn!("Dropping malformed LiveLink datagram: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelink_core::BlendshapeChannel;
    use facelink_state::AnimationFrame;
    use facelink_wire::encode;

    async fn pair() -> (LiveLinkListener, UdpSocket) {
        let listener = LiveLinkListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.connect(listener.local_addr()).await.unwrap();
        (listener, sender)
    }

    #[tokio::test]
    async fn test_listener_bind() {
        let (listener, _) = pair().await;
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_recv_no_face() {
        let (listener, sender) = pair().await;
        sender.send(&[6, 0, 0, 0, b'$']).await.unwrap();

        let (decoded, addr) = listener.recv().await.unwrap();
        assert!(!decoded.found);
        assert_eq!(addr, sender.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_recv_face_skips_noise() {
        let (listener, sender) = pair().await;

        let mut bad = encode(&AnimationFrame::default()).to_vec();
        let count_at = bad.len() - 245;
        bad[count_at] = 52;
        sender.send(&bad).await.unwrap();
        sender.send(b"hello").await.unwrap();

        let mut frame = AnimationFrame::builder().filter_size(1).build().unwrap();
        frame.set(BlendshapeChannel::MouthSmileLeft, 0.5);
        sender.send(&encode(&frame)).await.unwrap();

        let (decoded, _) = listener.recv_face().await.unwrap();
        assert!(decoded.found);
        assert_eq!(decoded.frame.get(BlendshapeChannel::MouthSmileLeft), 0.5);
    }

    #[tokio::test]
    async fn test_recv_long_name() {
        let (listener, sender) = pair().await;
        let name = "n".repeat(2000);
        let mut frame = AnimationFrame::builder()
            .name(name.as_str())
            .filter_size(1)
            .build()
            .unwrap();
        frame.set(BlendshapeChannel::JawOpen, 0.75);
        let bytes = encode(&frame);
        assert!(bytes.len() > 1500);
        sender.send(&bytes).await.unwrap();

        let (decoded, _) = listener.recv().await.unwrap();
        assert!(decoded.found);
        assert_eq!(decoded.frame.name(), name);
        assert_eq!(decoded.frame.get(BlendshapeChannel::JawOpen), 0.75);
    }
}
