//! Animation frame - identity, frame rate and the 61 channel values
//!
//! The frame is mutated by a single producer. The streaming side never reads
//! it directly; it only ever sees encoded snapshots.

use facelink_core::{BlendshapeChannel, FacelinkError, FacelinkResult, CHANNEL_COUNT, PROTOCOL_VERSION};
use chrono::Timelike;
use uuid::Uuid;

use crate::{ChannelHistory, Timecode, DEFAULT_SUB_FRAME};

/// Leading marker every LiveLink identity carries
pub const IDENTITY_MARKER: char = '$';

/// Subject name used when none is configured
pub const DEFAULT_NAME: &str = "facelink";

/// Frame rate of a frame built without explicit settings
pub const DEFAULT_FPS: u32 = 60;

/// Filter window of a frame built without explicit settings
pub const DEFAULT_FILTER_SIZE: usize = 5;

/// Frame rate denominator sent alongside the fps
pub const DEFAULT_DENOMINATOR: u32 = 1;

/// Subject identity: device id plus display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIdentity {
    id: String,
    name: String,
}

impl FrameIdentity {
    /// Build an identity, prefixing the id with `$` if missing
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Self::normalize_id(id.into()),
            name: name.into(),
        }
    }

    /// Identity with a freshly generated random UUID
    pub fn random(name: impl Into<String>) -> Self {
        Self::new(random_uuid(), name)
    }

    /// Ensure the id starts with the identity marker
    pub fn normalize_id(id: String) -> String {
        if id.starts_with(IDENTITY_MARKER) {
            id
        } else {
            format!("{IDENTITY_MARKER}{id}")
        }
    }

    /// Id including the leading `$`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Random version 4 UUID in canonical hyphenated form
pub fn random_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Stateful, temporally filtered blendshape frame
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    identity: FrameIdentity,
    version: u32,
    fps: u32,
    denominator: u32,
    timecode: Timecode,
    values: [f32; CHANNEL_COUNT],
    history: Box<[ChannelHistory]>,
    filter_size: usize,
}

impl AnimationFrame {
    /// Create a frame with the given identity, frame rate and filter window
    pub fn new(identity: FrameIdentity, fps: u32, filter_size: usize) -> FacelinkResult<Self> {
        AnimationFrameBuilder::new()
            .identity(identity)
            .fps(fps)
            .filter_size(filter_size)
            .build()
    }

    pub fn builder() -> AnimationFrameBuilder {
        AnimationFrameBuilder::new()
    }

    /// Current (post-filter) value of a channel
    #[inline]
    pub fn get(&self, channel: BlendshapeChannel) -> f32 {
        self.values[channel.index()]
    }

    /// Filtered write: push into the channel history and store its mean
    pub fn set(&mut self, channel: BlendshapeChannel, value: f32) {
        let history = &mut self.history[channel.index()];
        history.push(value);
        self.values[channel.index()] = history.mean();
    }

    /// Unfiltered write: overwrite the current value, history untouched
    pub fn set_unfiltered(&mut self, channel: BlendshapeChannel, value: f32) {
        self.values[channel.index()] = value;
    }

    /// Write with the filtering policy of the channel
    pub fn apply(&mut self, channel: BlendshapeChannel, value: f32) {
        if channel.is_unfiltered() {
            self.set_unfiltered(channel, value);
        } else {
            self.set(channel, value);
        }
    }

    /// All current values in wire order
    pub fn values(&self) -> &[f32; CHANNEL_COUNT] {
        &self.values
    }

    /// Replace all current values, bypassing the filter
    pub fn set_values(&mut self, values: [f32; CHANNEL_COUNT]) {
        self.values = values;
    }

    /// Reset values and filter state to rest
    pub fn reset(&mut self) {
        self.values = [0.0; CHANNEL_COUNT];
        for history in self.history.iter_mut() {
            *history = ChannelHistory::seeded(self.filter_size, 0.0);
        }
    }

    pub fn identity(&self) -> &FrameIdentity {
        &self.identity
    }

    /// Identity id including the leading `$`
    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Change the frame rate, rejecting 0
    pub fn set_fps(&mut self, fps: u32) -> FacelinkResult<()> {
        self.fps = validate_fps(fps)?;
        Ok(())
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn filter_size(&self) -> usize {
        self.filter_size
    }

    pub fn timecode(&self) -> Timecode {
        self.timecode
    }

    pub fn set_timecode(&mut self, timecode: Timecode) {
        self.timecode = timecode;
    }

    /// Stamp the frame number for `now` at the frame's fps
    pub fn stamp<T: Timelike>(&mut self, now: &T) {
        self.timecode = Timecode::at(now, self.fps, self.timecode.sub_frame);
    }

    /// Number of values currently held in a channel's history
    pub fn history_len(&self, channel: BlendshapeChannel) -> usize {
        self.history[channel.index()].len()
    }
}

impl Default for AnimationFrame {
    fn default() -> Self {
        AnimationFrame::with_settings(
            FrameIdentity::random(DEFAULT_NAME),
            PROTOCOL_VERSION,
            DEFAULT_FPS,
            DEFAULT_DENOMINATOR,
            Timecode::default(),
            DEFAULT_FILTER_SIZE,
        )
    }
}

impl AnimationFrame {
    fn with_settings(
        identity: FrameIdentity,
        version: u32,
        fps: u32,
        denominator: u32,
        timecode: Timecode,
        filter_size: usize,
    ) -> Self {
        // Each channel owns its history; nothing is shared between frames
        let history = (0..CHANNEL_COUNT)
            .map(|_| ChannelHistory::seeded(filter_size, 0.0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        AnimationFrame {
            identity,
            version,
            fps,
            denominator,
            timecode,
            values: [0.0; CHANNEL_COUNT],
            history,
            filter_size,
        }
    }
}

fn validate_fps(fps: u32) -> FacelinkResult<u32> {
    if fps == 0 {
        return Err(FacelinkError::InvalidFrameRate(fps));
    }
    Ok(fps)
}

/// Builder validating frame settings up front
#[derive(Debug, Clone)]
pub struct AnimationFrameBuilder {
    identity: Option<FrameIdentity>,
    name: String,
    id: Option<String>,
    version: u32,
    fps: u32,
    denominator: u32,
    sub_frame: u32,
    frame_number: u32,
    filter_size: usize,
}

impl AnimationFrameBuilder {
    pub fn new() -> Self {
        AnimationFrameBuilder {
            identity: None,
            name: DEFAULT_NAME.to_string(),
            id: None,
            version: PROTOCOL_VERSION,
            fps: DEFAULT_FPS,
            denominator: DEFAULT_DENOMINATOR,
            sub_frame: DEFAULT_SUB_FRAME,
            frame_number: 0,
            filter_size: DEFAULT_FILTER_SIZE,
        }
    }

    /// Use a complete identity (overrides `name` and `id`)
    pub fn identity(mut self, identity: FrameIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Device id; `$` is prepended when missing
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn denominator(mut self, denominator: u32) -> Self {
        self.denominator = denominator;
        self
    }

    pub fn sub_frame(mut self, sub_frame: u32) -> Self {
        self.sub_frame = sub_frame;
        self
    }

    pub fn frame_number(mut self, frame_number: u32) -> Self {
        self.frame_number = frame_number;
        self
    }

    pub fn filter_size(mut self, filter_size: usize) -> Self {
        self.filter_size = filter_size;
        self
    }

    pub fn build(self) -> FacelinkResult<AnimationFrame> {
        let fps = validate_fps(self.fps)?;
        if self.filter_size == 0 {
            return Err(FacelinkError::InvalidFilterSize(self.filter_size));
        }

        let identity = match (self.identity, self.id) {
            (Some(identity), _) => identity,
            (None, Some(id)) => FrameIdentity::new(id, self.name),
            (None, None) => FrameIdentity::random(self.name),
        };

        Ok(AnimationFrame::with_settings(
            identity,
            self.version,
            fps,
            self.denominator,
            Timecode::new(self.frame_number, self.sub_frame),
            self.filter_size,
        ))
    }
}

impl Default for AnimationFrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use chrono::NaiveTime;

    fn session_frame() -> AnimationFrame {
        AnimationFrame::builder()
            .id("abc")
            .name("test")
            .fps(30)
            .filter_size(4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_identity_gets_marker() {
        let frame = session_frame();
        assert_eq!(frame.id(), "$abc");

        let already = FrameIdentity::new("$abc", "x");
        assert_eq!(already.id(), "$abc");
    }

    #[test]
    fn test_random_identity() {
        let identity = FrameIdentity::random("x");
        assert!(identity.id().starts_with('$'));
        assert_eq!(identity.id().len(), 37);
        assert_eq!(&identity.id()[15..16], "4");

        let uuid = Uuid::parse_str(&identity.id()[1..]).unwrap();
        assert_eq!(uuid.get_version_num(), 4);
        assert_ne!(random_uuid(), random_uuid());
    }

    #[test]
    fn test_zero_fps_rejected_at_construction() {
        let err = AnimationFrame::builder().fps(0).build().unwrap_err();
        assert!(matches!(err, FacelinkError::InvalidFrameRate(0)));

        let err = AnimationFrame::new(FrameIdentity::new("a", "b"), 0, 4).unwrap_err();
        assert!(matches!(err, FacelinkError::InvalidFrameRate(0)));
    }

    #[test]
    fn test_zero_filter_rejected() {
        let err = AnimationFrame::builder().filter_size(0).build().unwrap_err();
        assert!(matches!(err, FacelinkError::InvalidFilterSize(0)));
    }

    #[test]
    fn test_set_fps_validates() {
        let mut frame = session_frame();
        assert!(frame.set_fps(0).is_err());
        assert_eq!(frame.fps(), 30);
        frame.set_fps(60).unwrap();
        assert_eq!(frame.fps(), 60);
    }

    #[test]
    fn test_unfiltered_blink_writes() {
        let mut frame = session_frame();
        for _ in 0..4 {
            frame.set_unfiltered(BlendshapeChannel::EyeBlinkLeft, 1.0);
        }
        assert_eq!(frame.get(BlendshapeChannel::EyeBlinkLeft), 1.0);
    }

    #[test]
    fn test_unfiltered_ignores_history() {
        let mut frame = session_frame();
        for _ in 0..4 {
            frame.set(BlendshapeChannel::EyeBlinkRight, 0.2);
        }
        frame.set_unfiltered(BlendshapeChannel::EyeBlinkRight, 0.9);
        assert_eq!(frame.get(BlendshapeChannel::EyeBlinkRight), 0.9);
        assert_eq!(frame.history_len(BlendshapeChannel::EyeBlinkRight), 4);
    }

    #[test]
    fn test_filtered_moving_average() {
        let mut frame = session_frame();
        for v in [0.0, 0.0, 0.0, 1.0] {
            frame.set(BlendshapeChannel::JawOpen, v);
        }
        assert_eq!(frame.get(BlendshapeChannel::JawOpen), 0.25);
    }

    #[test]
    fn test_first_filtered_write_blends_with_rest() {
        let mut frame = session_frame();
        frame.set(BlendshapeChannel::MouthPucker, 1.0);
        assert_eq!(frame.get(BlendshapeChannel::MouthPucker), 0.5);
    }

    #[test]
    fn test_apply_uses_channel_policy() {
        let mut frame = session_frame();
        frame.apply(BlendshapeChannel::EyeBlinkLeft, 1.0);
        frame.apply(BlendshapeChannel::EyeWideLeft, 1.0);
        assert_eq!(frame.get(BlendshapeChannel::EyeBlinkLeft), 1.0);
        assert_eq!(frame.get(BlendshapeChannel::EyeWideLeft), 0.5);
    }

    #[test]
    fn test_frames_do_not_share_history() {
        let mut a = session_frame();
        let b = session_frame();
        for _ in 0..4 {
            a.set(BlendshapeChannel::BrowInnerUp, 1.0);
        }
        assert_eq!(b.history_len(BlendshapeChannel::BrowInnerUp), 1);
        assert_eq!(b.get(BlendshapeChannel::BrowInnerUp), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut frame = session_frame();
        frame.set(BlendshapeChannel::JawOpen, 1.0);
        frame.reset();
        assert_eq!(frame.get(BlendshapeChannel::JawOpen), 0.0);
        assert_eq!(frame.history_len(BlendshapeChannel::JawOpen), 1);
    }

    #[test]
    fn test_stamp() {
        let mut frame = session_frame();
        frame.stamp(&NaiveTime::from_hms_opt(0, 0, 10).unwrap());
        assert_eq!(frame.timecode().frame_number, 300);
        assert_eq!(frame.timecode().sub_frame, DEFAULT_SUB_FRAME);
    }

    #[test]
    fn test_defaults() {
        let frame = AnimationFrame::default();
        assert_eq!(frame.fps(), DEFAULT_FPS);
        assert_eq!(frame.filter_size(), DEFAULT_FILTER_SIZE);
        assert_eq!(frame.version(), PROTOCOL_VERSION);
        assert_eq!(frame.name(), DEFAULT_NAME);
        assert!(frame.values().iter().all(|v| *v == 0.0));
    }

    proptest! {
        #[test]
        fn prop_filter_converges(
            filter_size in 1usize..10,
            value in -2.0f32..2.0,
            extra in 0usize..10,
        ) {
            let mut frame = AnimationFrame::builder()
                .filter_size(filter_size)
                .build()
                .unwrap();
            for _ in 0..filter_size + extra {
                frame.set(BlendshapeChannel::CheekSquintLeft, value);
            }
            prop_assert_eq!(frame.get(BlendshapeChannel::CheekSquintLeft), value);
        }
    }
}
