//! Streaming session: pipeline plus a running transport

use std::net::SocketAddr;
use std::sync::Arc;
use bytes::Bytes;
use chrono::Local;

use facelink_core::{FacelinkError, FacelinkResult};
use facelink_geometry::{FaceLandmarks, HeadRotation};
use facelink_transport::{
    SnapshotSlot, StreamingTransport, TransportConfig, TransportHandle, TransportStats,
};

use crate::config::StreamConfig;
use crate::pipeline::FacePipeline;

/// A running stream to one destination
pub struct StreamSession {
    config: StreamConfig,
    pipeline: FacePipeline,
    transport: TransportHandle,
    destination: SocketAddr,
}

impl StreamSession {
    /// Validate `config`, resolve the destination and start the transport
    pub async fn start(config: StreamConfig) -> FacelinkResult<Self> {
        config.validate()?;

        let destination = resolve(&config).await?;
        let slot = Arc::new(SnapshotSlot::new());
        let pipeline = FacePipeline::from_config(&config, Arc::clone(&slot))?;

        let transport_config =
            TransportConfig::new(destination).with_poll_interval(config.poll_interval);
        let transport = StreamingTransport::connect(transport_config, slot)
            .await?
            .spawn();

        tracing::info!(
            destination = %destination,
            name = %config.name,
            identity = %config.identity,
            fps = config.fps,
            filter_size = config.filter_size,
            "Stream session started"
        );

        Ok(StreamSession {
            config,
            pipeline,
            transport,
            destination,
        })
    }

    /// Process one frame of tracking output at the current time
    pub fn process(
        &mut self,
        face: Option<&FaceLandmarks>,
        rotation: Option<HeadRotation>,
    ) -> Bytes {
        self.pipeline.process(face, rotation, &Local::now())
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &FacePipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut FacePipeline {
        &mut self.pipeline
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Local address of the sending socket
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn stats(&self) -> TransportStats {
        self.transport.stats()
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    /// Stop the transport; returns the final counters
    pub async fn shutdown(self) -> FacelinkResult<TransportStats> {
        let slot = self.transport.slot();
        self.transport.shutdown().await?;
        let stats = slot.stats();
        tracing::info!(
            frames = self.pipeline.processed(),
            faces = self.pipeline.faces(),
            "Stream session stopped"
        );
        Ok(stats)
    }
}

async fn resolve(config: &StreamConfig) -> FacelinkResult<SocketAddr> {
    let destination = config.destination();
    let mut resolved = tokio::net::lookup_host(destination.as_str())
        .await
        .map_err(|e| FacelinkError::TransportError(format!("{}: {}", destination, e)))?;
    let Some(addr) = resolved.next() else {
        return Err(FacelinkError::TransportError(format!(
            "{}: no address resolved",
            destination
        )));
    };
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelink_core::BlendshapeChannel;
    use facelink_transport::LiveLinkListener;
    use std::time::Duration;

    async fn session_to(listener: &LiveLinkListener) -> StreamSession {
        let mut config = StreamConfig::default();
        config.port = listener.local_addr().port();
        config.filter_size = 1;
        config.poll_interval = Duration::from_millis(1);
        StreamSession::start(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_session_streams() {
        let listener = LiveLinkListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let mut session = session_to(&listener).await;
        assert!(session.is_running());
        assert_eq!(session.destination(), listener.local_addr());

        session
            .pipeline_mut()
            .frame_mut()
            .set(BlendshapeChannel::TongueOut, 0.5);
        session.process(None, None);

        let (decoded, from) = tokio::time::timeout(Duration::from_secs(2), listener.recv_face())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(from.port(), session.local_addr().port());
        assert_eq!(decoded.frame.id(), session.config().identity);
        assert_eq!(decoded.frame.get(BlendshapeChannel::TongueOut), 0.5);

        let stats = session.shutdown().await.unwrap();
        assert_eq!(stats.published, 1);
    }

    #[tokio::test]
    async fn test_resolve_destination() {
        let mut config = StreamConfig::default();
        config.port = 9;
        let addr = resolve(&config).await.unwrap();
        assert_eq!(addr, "127.0.0.1:9".parse().unwrap());

        config.host = "localhost".to_string();
        assert_eq!(resolve(&config).await.unwrap().port(), 9);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = StreamConfig::default();
        config.fps = 0;
        assert!(matches!(
            StreamSession::start(config).await,
            Err(FacelinkError::InvalidConfig { .. })
        ));
    }
}
