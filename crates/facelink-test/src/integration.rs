//! End-to-end streaming scenarios
//!
//! Drives a [`StreamSession`] with synthetic faces and receives the stream
//! on a loopback [`LiveLinkListener`], the way a LiveLink consumer would.

use std::time::Duration;

use facelink_core::{BlendshapeChannel, FacelinkError, FacelinkResult};
use facelink_runtime::{StreamConfig, StreamSession};
use facelink_state::AnimationFrame;
use facelink_transport::{LiveLinkListener, TransportStats};

use crate::fixtures::SyntheticFace;

/// Scenario configuration
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    /// Number of tracked frames to process
    pub frames: usize,
    /// Producer pacing between frames
    pub frame_interval: Duration,
    /// Every n-th frame has no face (0 disables)
    pub drop_face_every: usize,
    pub filter_size: usize,
    /// How long to wait for the last datagram
    pub receive_timeout: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            frames: 30,
            frame_interval: Duration::from_millis(2),
            drop_face_every: 0,
            filter_size: 4,
            receive_timeout: Duration::from_secs(2),
        }
    }
}

impl ScenarioConfig {
    /// Producer faster than the transport drains
    pub fn burst() -> Self {
        ScenarioConfig {
            frames: 200,
            frame_interval: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Tracker losing the face periodically
    pub fn flicker() -> Self {
        ScenarioConfig {
            drop_face_every: 3,
            ..Default::default()
        }
    }
}

/// What the consumer saw
#[derive(Debug)]
pub struct ScenarioResult {
    /// Frame the producer held after the last processed frame
    pub produced: AnimationFrame,
    /// Last frame the listener decoded
    pub received: AnimationFrame,
    /// Datagrams decoded by the listener
    pub datagrams: usize,
    pub stats: TransportStats,
}

impl ScenarioResult {
    /// The consumer ended on exactly what the producer last published
    pub fn converged(&self) -> bool {
        self.produced.values() == self.received.values()
            && self.produced.timecode() == self.received.timecode()
            && self.produced.id() == self.received.id()
    }

    /// Every published snapshot was either sent or coalesced away
    pub fn accounted(&self) -> bool {
        self.stats.published == self.stats.sent + self.stats.coalesced + self.stats.send_errors
    }
}

/// Run a scenario against a fresh listener on loopback
pub async fn run_scenario(config: ScenarioConfig) -> FacelinkResult<ScenarioResult> {
    let listener = LiveLinkListener::bind(([127, 0, 0, 1], 0).into()).await?;

    let stream = StreamConfig {
        port: listener.local_addr().port(),
        filter_size: config.filter_size,
        poll_interval: Duration::from_millis(1),
        ..StreamConfig::default()
    };
    let mut session = StreamSession::start(stream).await?;

    for i in 0..config.frames {
        let t = i as f32 / session.config().fps as f32;
        let face = SyntheticFace::animated(t, 1.0);
        let skip = config.drop_face_every > 0 && i % config.drop_face_every == 0;

        if skip {
            session.process(None, None);
        } else {
            let landmarks = face.landmarks()?;
            session.process(Some(&landmarks), Some(face.rotation));
        }

        if !config.frame_interval.is_zero() {
            tokio::time::sleep(config.frame_interval).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    let produced = session.pipeline().frame().clone();
    let expected = produced.timecode();

    let mut datagrams = 0;
    let received = loop {
        let (decoded, _) = tokio::time::timeout(config.receive_timeout, listener.recv_face())
            .await
            .map_err(|_| FacelinkError::TransportError("timed out waiting for stream".into()))??;
        datagrams += 1;
        if decoded.frame.timecode() == expected && decoded.frame.values() == produced.values() {
            break decoded.frame;
        }
    };

    let stats = session.shutdown().await?;
    Ok(ScenarioResult {
        produced,
        received,
        datagrams,
        stats,
    })
}

/// Channels a synthetic face drives
pub const DRIVEN_CHANNELS: [BlendshapeChannel; 5] = [
    BlendshapeChannel::JawOpen,
    BlendshapeChannel::MouthSmileLeft,
    BlendshapeChannel::MouthSmileRight,
    BlendshapeChannel::EyeBlinkLeft,
    BlendshapeChannel::EyeBlinkRight,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_steady_stream_converges() {
        let result = run_scenario(ScenarioConfig::default()).await.unwrap();
        assert!(result.converged());
        assert!(result.accounted());
        assert_eq!(result.stats.published, 30);
        assert!(result.datagrams >= 1);
    }

    #[tokio::test]
    async fn test_burst_coalesces_but_delivers_latest() {
        let result = run_scenario(ScenarioConfig::burst()).await.unwrap();
        assert!(result.converged());
        assert!(result.accounted());
        assert_eq!(result.stats.published, 200);
        assert!(result.stats.sent <= 200);
    }

    #[tokio::test]
    async fn test_face_loss_keeps_streaming() {
        let result = run_scenario(ScenarioConfig::flicker()).await.unwrap();
        assert!(result.converged());
        assert_eq!(result.stats.published, 30);
        for channel in DRIVEN_CHANNELS {
            let v = result.received.get(channel);
            assert!((0.0..=1.0).contains(&v), "{channel} = {v}");
        }
    }
}
