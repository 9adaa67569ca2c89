//! Per-channel calibration ranges
//!
//! Ranges are raw feature values, not normalized ratios: some (mouth close,
//! shrug, brow distances) are metric distances in mesh units and sit far
//! outside [0, 1]. They are tuned constants and are kept as measured.

use facelink_core::{BlendshapeChannel, CHANNEL_COUNT};

use crate::remap;

/// Raw feature range that maps onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRange {
    pub min: f32,
    pub max: f32,
}

impl CalibrationRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn remap(&self, value: f32) -> f32 {
        remap(value, self.min, self.max)
    }
}

/// Calibration for every channel; `None` means unconfigured
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    ranges: [Option<CalibrationRange>; CHANNEL_COUNT],
}

use BlendshapeChannel as C;

/// Default ranges for the MediaPipe face mesh
const MEDIAPIPE_RANGES: &[(BlendshapeChannel, f32, f32)] = &[
    (C::EyeBlinkLeft, 0.40, 0.70),
    (C::EyeSquintLeft, 0.37, 0.44),
    (C::EyeWideLeft, 0.9, 1.2),
    (C::EyeBlinkRight, 0.40, 0.70),
    (C::EyeSquintRight, 0.37, 0.44),
    (C::EyeWideRight, 0.9, 1.2),
    (C::JawLeft, -0.4, 0.0),
    (C::JawRight, 0.0, 0.4),
    (C::JawOpen, 0.50, 0.55),
    (C::MouthClose, 3.0, 4.5),
    (C::MouthFunnel, 4.0, 4.8),
    (C::MouthPucker, 3.46, 4.92),
    (C::MouthLeft, -3.4, -2.3),
    (C::MouthRight, 1.5, 3.0),
    (C::MouthSmileLeft, -0.25, 0.0),
    (C::MouthSmileRight, -0.25, 0.0),
    (C::MouthFrownLeft, 0.4, 0.9),
    (C::MouthFrownRight, 0.4, 0.9),
    (C::MouthStretchLeft, -0.4, 0.0),
    (C::MouthStretchRight, -0.4, 0.0),
    (C::MouthRollLower, 0.4, 0.7),
    (C::MouthRollUpper, 0.31, 0.34),
    (C::MouthShrugLower, 1.9, 2.3),
    (C::MouthShrugUpper, 1.4, 2.4),
    (C::MouthPressLeft, 0.4, 0.5),
    (C::MouthPressRight, 0.4, 0.5),
    (C::MouthLowerDownLeft, 1.7, 2.1),
    (C::MouthLowerDownRight, 1.7, 2.1),
    (C::BrowDownLeft, 1.0, 1.2),
    (C::BrowDownRight, 1.0, 1.2),
    (C::BrowInnerUp, 2.2, 2.6),
    (C::BrowOuterUpLeft, 1.25, 1.5),
    (C::BrowOuterUpRight, 1.25, 1.5),
    (C::CheekSquintLeft, 0.55, 0.63),
    (C::CheekSquintRight, 0.55, 0.63),
];

impl CalibrationTable {
    /// Table with no channel configured
    pub fn empty() -> Self {
        Self {
            ranges: [None; CHANNEL_COUNT],
        }
    }

    /// Default MediaPipe calibration
    pub fn mediapipe() -> Self {
        let mut table = Self::empty();
        for &(channel, min, max) in MEDIAPIPE_RANGES {
            table.set(channel, CalibrationRange::new(min, max));
        }
        table
    }

    pub fn get(&self, channel: BlendshapeChannel) -> Option<CalibrationRange> {
        self.ranges[channel.index()]
    }

    pub fn set(&mut self, channel: BlendshapeChannel, range: CalibrationRange) {
        self.ranges[channel.index()] = Some(range);
    }

    /// Mark a channel unconfigured so the mapper leaves it alone
    pub fn clear(&mut self, channel: BlendshapeChannel) {
        self.ranges[channel.index()] = None;
    }

    pub fn is_configured(&self, channel: BlendshapeChannel) -> bool {
        self.ranges[channel.index()].is_some()
    }

    /// Remap through the channel's range, `None` if unconfigured
    #[inline]
    pub fn remap(&self, channel: BlendshapeChannel, value: f32) -> Option<f32> {
        self.get(channel).map(|range| range.remap(value))
    }

    /// `1 - remap`, `None` if unconfigured
    #[inline]
    pub fn remap_inverted(&self, channel: BlendshapeChannel, value: f32) -> Option<f32> {
        self.remap(channel, value).map(|v| 1.0 - v)
    }

    /// Configured channels with their ranges, in wire order
    pub fn iter(&self) -> impl Iterator<Item = (BlendshapeChannel, CalibrationRange)> + '_ {
        BlendshapeChannel::ALL
            .iter()
            .filter_map(|&c| self.get(c).map(|range| (c, range)))
    }

    pub fn configured_count(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_some()).count()
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::mediapipe()
    }
}
