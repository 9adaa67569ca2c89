//! Streaming session configuration

use std::str::FromStr;
use std::time::Duration;

use facelink_core::{FacelinkError, FacelinkResult};
use facelink_state::{
    random_uuid, AnimationFrame, FrameIdentity, DEFAULT_DENOMINATOR, DEFAULT_NAME,
    DEFAULT_SUB_FRAME, IDENTITY_MARKER,
};
use facelink_transport::DEFAULT_POLL_INTERVAL;
use facelink_wire::{message_size, MAX_MESSAGE_SIZE};

/// Default LiveLink face port
pub const DEFAULT_PORT: u16 = 11111;

/// Default destination host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Frame rate of a streaming session
pub const DEFAULT_STREAM_FPS: u32 = 30;

/// Filter window of a streaming session
pub const DEFAULT_STREAM_FILTER_SIZE: usize = 4;

/// Streaming session configuration
#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// Destination host (name or address)
    pub host: String,
    /// Destination port
    pub port: u16,
    /// Subject name shown by the receiver
    pub name: String,
    /// Device identity, stored with its leading `$`
    pub identity: String,
    pub fps: u32,
    /// Moving-average window for filtered channels
    pub filter_size: usize,
    /// Transport idle sleep
    pub poll_interval: Duration,
    pub sub_frame: u32,
    pub frame_rate_denominator: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            name: DEFAULT_NAME.to_string(),
            identity: FrameIdentity::normalize_id(random_uuid()),
            fps: DEFAULT_STREAM_FPS,
            filter_size: DEFAULT_STREAM_FILTER_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            sub_frame: DEFAULT_SUB_FRAME,
            frame_rate_denominator: DEFAULT_DENOMINATOR,
        }
    }
}

impl StreamConfig {
    /// Defaults overlaid with `FACELINK_*` environment variables
    pub fn from_env() -> FacelinkResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> FacelinkResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StreamConfig::default();

        if let Some(host) = lookup("FACELINK_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "FACELINK_PORT", "port")? {
            config.port = port;
        }
        if let Some(name) = lookup("FACELINK_NAME") {
            config.name = name;
        }
        if let Some(identity) = lookup("FACELINK_IDENTITY") {
            config.identity = FrameIdentity::normalize_id(identity);
        }
        if let Some(fps) = parse_var(&lookup, "FACELINK_FPS", "fps")? {
            config.fps = fps;
        }
        if let Some(filter_size) = parse_var(&lookup, "FACELINK_FILTER_SIZE", "filter_size")? {
            config.filter_size = filter_size;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "FACELINK_POLL_MS", "poll_interval")? {
            config.poll_interval = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every field
    pub fn validate(&self) -> FacelinkResult<()> {
        if self.host.trim().is_empty() {
            return Err(invalid("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port", "must not be 0"));
        }
        if self.fps == 0 {
            return Err(invalid("fps", "must be at least 1"));
        }
        if self.filter_size == 0 {
            return Err(invalid("filter_size", "must be at least 1"));
        }
        if self.poll_interval.is_zero() {
            return Err(invalid("poll_interval", "must be greater than 0"));
        }
        if !self.identity.starts_with(IDENTITY_MARKER) || self.identity.len() < 2 {
            return Err(FacelinkError::InvalidIdentity(self.identity.clone()));
        }
        if !self.identity.is_ascii() {
            return Err(FacelinkError::InvalidIdentity(self.identity.clone()));
        }
        if message_size(self.identity.len(), self.name.len()) > MAX_MESSAGE_SIZE {
            return Err(invalid("name", "too long for a single datagram"));
        }
        Ok(())
    }

    /// `host:port`
    pub fn destination(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Fresh animation frame carrying this configuration
    pub fn build_frame(&self) -> FacelinkResult<AnimationFrame> {
        AnimationFrame::builder()
            .identity(FrameIdentity::new(self.identity.clone(), self.name.clone()))
            .fps(self.fps)
            .filter_size(self.filter_size)
            .sub_frame(self.sub_frame)
            .denominator(self.frame_rate_denominator)
            .build()
    }
}

fn invalid(field: &str, message: &str) -> FacelinkError {
    FacelinkError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, field: &str) -> FacelinkResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| FacelinkError::InvalidConfig {
                field: field.to_string(),
                message: format!("{}={:?}: {}", key, raw, e),
            }),
    }
}
