//! Blendshape channel definitions
//!
//! The 61 channels follow the ARKit face blendshape set extended with head
//! and eye rotations, in the order the LiveLink face protocol expects them.
//! The ordinal of each channel is its position in the wire payload and must
//! never change.

use crate::CHANNEL_COUNT;

macro_rules! blendshape_channels {
    ($($variant:ident = $ordinal:literal,)*) => {
        /// One named facial-expression or head-rotation weight
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum BlendshapeChannel {
            $($variant = $ordinal,)*
        }

        impl BlendshapeChannel {
            /// All channels in wire order
            pub const ALL: [BlendshapeChannel; CHANNEL_COUNT] = [
                $(BlendshapeChannel::$variant,)*
            ];

            /// ARKit / LiveLink name of the channel
            pub fn name(self) -> &'static str {
                match self {
                    $(BlendshapeChannel::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

blendshape_channels! {
    EyeBlinkLeft = 0,
    EyeLookDownLeft = 1,
    EyeLookInLeft = 2,
    EyeLookOutLeft = 3,
    EyeLookUpLeft = 4,
    EyeSquintLeft = 5,
    EyeWideLeft = 6,
    EyeBlinkRight = 7,
    EyeLookDownRight = 8,
    EyeLookInRight = 9,
    EyeLookOutRight = 10,
    EyeLookUpRight = 11,
    EyeSquintRight = 12,
    EyeWideRight = 13,
    JawForward = 14,
    JawLeft = 15,
    JawRight = 16,
    JawOpen = 17,
    MouthClose = 18,
    MouthFunnel = 19,
    MouthPucker = 20,
    MouthLeft = 21,
    MouthRight = 22,
    MouthSmileLeft = 23,
    MouthSmileRight = 24,
    MouthFrownLeft = 25,
    MouthFrownRight = 26,
    MouthDimpleLeft = 27,
    MouthDimpleRight = 28,
    MouthStretchLeft = 29,
    MouthStretchRight = 30,
    MouthRollLower = 31,
    MouthRollUpper = 32,
    MouthShrugLower = 33,
    MouthShrugUpper = 34,
    MouthPressLeft = 35,
    MouthPressRight = 36,
    MouthLowerDownLeft = 37,
    MouthLowerDownRight = 38,
    MouthUpperUpLeft = 39,
    MouthUpperUpRight = 40,
    BrowDownLeft = 41,
    BrowDownRight = 42,
    BrowInnerUp = 43,
    BrowOuterUpLeft = 44,
    BrowOuterUpRight = 45,
    CheekPuff = 46,
    CheekSquintLeft = 47,
    CheekSquintRight = 48,
    NoseSneerLeft = 49,
    NoseSneerRight = 50,
    TongueOut = 51,
    HeadYaw = 52,
    HeadPitch = 53,
    HeadRoll = 54,
    LeftEyeYaw = 55,
    LeftEyePitch = 56,
    LeftEyeRoll = 57,
    RightEyeYaw = 58,
    RightEyePitch = 59,
    RightEyeRoll = 60,
}

impl BlendshapeChannel {
    /// Parse from wire ordinal
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Position in the wire payload
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Head rotation channels carry radians-ish values in roughly [-1, 1]
    pub fn is_head_rotation(self) -> bool {
        matches!(
            self,
            BlendshapeChannel::HeadYaw | BlendshapeChannel::HeadPitch | BlendshapeChannel::HeadRoll
        )
    }

    /// Per-eye rotation channels
    pub fn is_eye_rotation(self) -> bool {
        (BlendshapeChannel::LeftEyeYaw as u8..=BlendshapeChannel::RightEyeRoll as u8)
            .contains(&(self as u8))
    }

    /// Channels written without temporal filtering.
    ///
    /// Smoothing blinks makes them visibly lag behind the eyes.
    pub fn is_unfiltered(self) -> bool {
        matches!(
            self,
            BlendshapeChannel::EyeBlinkLeft | BlendshapeChannel::EyeBlinkRight
        )
    }

    /// Look up a channel by its ARKit name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for BlendshapeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_match_positions() {
        for (i, channel) in BlendshapeChannel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
            assert_eq!(BlendshapeChannel::from_index(i as u8), Some(*channel));
        }
        assert_eq!(BlendshapeChannel::from_index(61), None);
    }

    #[test]
    fn test_wire_contract_anchors() {
        assert_eq!(BlendshapeChannel::EyeBlinkLeft as u8, 0);
        assert_eq!(BlendshapeChannel::JawOpen as u8, 17);
        assert_eq!(BlendshapeChannel::TongueOut as u8, 51);
        assert_eq!(BlendshapeChannel::HeadYaw as u8, 52);
        assert_eq!(BlendshapeChannel::RightEyeRoll as u8, 60);
    }

    #[test]
    fn test_names() {
        assert_eq!(BlendshapeChannel::MouthSmileLeft.name(), "MouthSmileLeft");
        assert_eq!(
            BlendshapeChannel::from_name("browinnerup"),
            Some(BlendshapeChannel::BrowInnerUp)
        );
        assert_eq!(BlendshapeChannel::from_name("Nope"), None);
    }

    #[test]
    fn test_classification() {
        let rotations = BlendshapeChannel::ALL
            .iter()
            .filter(|c| c.is_head_rotation())
            .count();
        assert_eq!(rotations, 3);

        let eyes = BlendshapeChannel::ALL
            .iter()
            .filter(|c| c.is_eye_rotation())
            .count();
        assert_eq!(eyes, 6);

        assert!(BlendshapeChannel::EyeBlinkRight.is_unfiltered());
        assert!(!BlendshapeChannel::EyeWideRight.is_unfiltered());
    }
}
