//! facelink Face Stream Demo
//!
//! Streams a synthetic animated face to a LiveLink receiver.
//!
//! Configuration comes from `FACELINK_*` environment variables (host, port,
//! name, identity, fps, filter size, poll interval). `FACELINK_LOG_FORMAT` selects
//! `plain` or `json` logs. The optional first argument is the run time in
//! seconds; without it the demo runs until Ctrl-C.

use std::time::{Duration, Instant};

use facelink_core::{FacelinkError, FacelinkResult};
use facelink_runtime::{init_tracing, LogFormat, StreamConfig, StreamSession};
use facelink_test::SyntheticFace;

/// Seconds per expression cycle
const CYCLE_SECONDS: f32 = 4.0;

#[tokio::main]
async fn main() -> FacelinkResult<()> {
    let format = match std::env::var("FACELINK_LOG_FORMAT") {
        Ok(raw) => raw.parse()?,
        Err(_) => LogFormat::Plain,
    };
    init_tracing(format)?;

    let run_for = match std::env::args().nth(1) {
        Some(raw) => Some(parse_duration(&raw)?),
        None => None,
    };

    let config = StreamConfig::from_env()?;
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(config.fps));
    let mut session = StreamSession::start(config).await?;

    tracing::info!(
        destination = %session.destination(),
        "Streaming synthetic face, press Ctrl-C to stop"
    );

    let started = Instant::now();
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let elapsed = started.elapsed();
        if run_for.is_some_and(|limit| elapsed >= limit) {
            break;
        }

        let face = SyntheticFace::animated(elapsed.as_secs_f32(), CYCLE_SECONDS);
        match face.landmarks() {
            Ok(landmarks) => {
                session.process(Some(&landmarks), Some(face.rotation));
            }
            Err(e) => {
                tracing::warn!("Skipping frame: {}", e);
                session.process(None, None);
            }
        }
    }

    let stats = session.shutdown().await?;
    tracing::info!(
        published = stats.published,
        sent = stats.sent,
        coalesced = stats.coalesced,
        send_errors = stats.send_errors,
        "Done"
    );
    Ok(())
}

fn parse_duration(raw: &str) -> FacelinkResult<Duration> {
    let invalid = |message: String| FacelinkError::InvalidConfig {
        field: "duration".to_string(),
        message,
    };
    let secs: f32 = raw
        .trim()
        .parse()
        .map_err(|e| invalid(format!("{:?}: {}", raw, e)))?;
    Duration::try_from_secs_f32(secs).map_err(|e| invalid(format!("{:?}: {}", raw, e)))
}
