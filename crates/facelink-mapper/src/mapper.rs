//! Blendshape mapper

use facelink_core::BlendshapeChannel;
use facelink_geometry::{CanonicalPoints, FaceFeatures, HeadRotation, LandmarkSet};
use facelink_state::AnimationFrame;

use crate::{remap, CalibrationTable};

use BlendshapeChannel as C;

/// Funnel is only visible while pucker stays below this weight
pub const FUNNEL_PUCKER_LIMIT: f32 = 0.5;

/// How a calibrated feature drives its channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Weight grows with the feature
    Direct,
    /// Weight shrinks as the feature grows
    Inverted,
}

type FeatureFn = fn(&FaceFeatures) -> f32;

/// Channels driven by exactly one calibrated feature, in evaluation order
const FEATURE_RULES: &[(BlendshapeChannel, Response, FeatureFn)] = &[
    // Mouth
    (C::JawOpen, Response::Direct, |f| f.jaw_open_ratio),
    (C::MouthClose, Response::Direct, |f| f.mouth_center_nose - f.mouth_open),
    (C::MouthSmileLeft, Response::Inverted, |f| f.smile_left),
    (C::MouthSmileRight, Response::Inverted, |f| f.smile_right),
    (C::MouthFrownLeft, Response::Inverted, |f| f.frown_left),
    (C::MouthFrownRight, Response::Inverted, |f| f.frown_right),
    (C::MouthLeft, Response::Direct, |f| f.center_stretch_left),
    (C::MouthRight, Response::Inverted, |f| f.center_stretch_right),
    (C::JawLeft, Response::Inverted, |f| f.jaw_lateral),
    (C::JawRight, Response::Direct, |f| f.jaw_lateral),
    (C::MouthPucker, Response::Inverted, |f| f.mouth_width),
    (C::MouthRollLower, Response::Inverted, |f| f.lower_lip_roll),
    (C::MouthRollUpper, Response::Inverted, |f| f.upper_lip_roll),
    (C::MouthShrugUpper, Response::Inverted, |f| f.upper_lip_nose),
    (C::MouthShrugLower, Response::Inverted, |f| f.shrug_lower),
    (C::MouthLowerDownLeft, Response::Inverted, |f| f.lower_down_left),
    (C::MouthLowerDownRight, Response::Inverted, |f| f.lower_down_right),
    (C::MouthPressLeft, Response::Inverted, |f| f.press_left),
    (C::MouthPressRight, Response::Inverted, |f| f.press_right),
    // Eyes
    (C::EyeBlinkLeft, Response::Inverted, |f| f.eye_open_left),
    (C::EyeBlinkRight, Response::Inverted, |f| f.eye_open_right),
    (C::EyeWideLeft, Response::Direct, |f| f.eye_open_left),
    (C::EyeWideRight, Response::Direct, |f| f.eye_open_right),
    (C::EyeSquintLeft, Response::Inverted, |f| f.squint_left),
    (C::EyeSquintRight, Response::Inverted, |f| f.squint_right),
    // Brows and cheeks
    (C::BrowDownLeft, Response::Inverted, |f| f.brow_left),
    (C::BrowOuterUpLeft, Response::Direct, |f| f.brow_left),
    (C::BrowDownRight, Response::Inverted, |f| f.brow_right),
    (C::BrowOuterUpRight, Response::Direct, |f| f.brow_right),
    (C::BrowInnerUp, Response::Direct, |f| f.inner_brow),
    (C::CheekSquintLeft, Response::Inverted, |f| f.cheek_squint_left),
    (C::CheekSquintRight, Response::Inverted, |f| f.cheek_squint_right),
];

/// Turns landmark geometry into calibrated channel weights
#[derive(Debug, Clone, Default)]
pub struct BlendshapeMapper {
    calibration: CalibrationTable,
    points: CanonicalPoints,
}

impl BlendshapeMapper {
    pub fn new(calibration: CalibrationTable, points: CanonicalPoints) -> Self {
        Self {
            calibration,
            points,
        }
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    pub fn calibration_mut(&mut self) -> &mut CalibrationTable {
        &mut self.calibration
    }

    pub fn points(&self) -> &CanonicalPoints {
        &self.points
    }

    /// Measure the metric landmarks and write every mapped channel
    pub fn map(&self, metric: &LandmarkSet, frame: &mut AnimationFrame) -> FaceFeatures {
        let features = FaceFeatures::measure(metric, &self.points);
        self.apply(&features, frame);
        features
    }

    /// Calibrated weight of a single-feature channel, `None` if unconfigured
    pub fn weight(&self, channel: BlendshapeChannel, features: &FaceFeatures) -> Option<f32> {
        let (_, response, feature) = FEATURE_RULES.iter().find(|(c, _, _)| *c == channel)?;
        let value = feature(features);
        match response {
            Response::Direct => self.calibration.remap(channel, value),
            Response::Inverted => self.calibration.remap_inverted(channel, value),
        }
    }

    /// Write all channels derivable from `features` into `frame`
    pub fn apply(&self, features: &FaceFeatures, frame: &mut AnimationFrame) {
        for &(channel, _, _) in FEATURE_RULES {
            if let Some(weight) = self.weight(channel, features) {
                frame.apply(channel, weight);
            }
        }

        let smile_left = self.weight(C::MouthSmileLeft, features);
        let smile_right = self.weight(C::MouthSmileRight, features);

        // Dimples follow the raw smile at half strength
        if let Some(smile) = smile_left {
            frame.apply(C::MouthDimpleLeft, smile / 2.0);
        }
        if let Some(smile) = smile_right {
            frame.apply(C::MouthDimpleRight, smile / 2.0);
        }

        self.apply_stretch(
            C::MouthStretchLeft,
            features.stretch_left,
            smile_left,
            self.weight(C::MouthLeft, features),
            frame,
        );
        self.apply_stretch(
            C::MouthStretchRight,
            features.stretch_right,
            smile_right,
            self.weight(C::MouthRight, features),
            frame,
        );

        // Funnel and pucker are visually exclusive
        if self.calibration.is_configured(C::MouthFunnel) {
            if frame.get(C::MouthPucker) < FUNNEL_PUCKER_LIMIT {
                if let Some(funnel) = self
                    .calibration
                    .remap_inverted(C::MouthFunnel, features.mouth_width)
                {
                    frame.apply(C::MouthFunnel, funnel);
                }
            } else {
                frame.apply(C::MouthFunnel, 0.0);
            }
        }

        // The mesh has no separate sneer signal; mirror the cheek squint
        if self.calibration.is_configured(C::CheekSquintLeft) {
            let cheek = frame.get(C::CheekSquintLeft);
            frame.apply(C::NoseSneerLeft, cheek);
        }
        if self.calibration.is_configured(C::CheekSquintRight) {
            let cheek = frame.get(C::CheekSquintRight);
            frame.apply(C::NoseSneerRight, cheek);
        }

        tracing::trace!(
            jaw_open = frame.get(C::JawOpen),
            blink_left = frame.get(C::EyeBlinkLeft),
            blink_right = frame.get(C::EyeBlinkRight),
            "mapped blendshapes"
        );
    }

    /// Stretch range moves with how much the corner is already smiling or
    /// pulled sideways.
    fn apply_stretch(
        &self,
        channel: BlendshapeChannel,
        stretch: f32,
        smile: Option<f32>,
        side: Option<f32>,
        frame: &mut AnimationFrame,
    ) {
        if !self.calibration.is_configured(channel) {
            return;
        }
        let (Some(smile), Some(side)) = (smile, side) else {
            return;
        };
        let normal = -0.7 + 0.42 * smile + 0.36 * side;
        let max = -0.45 + 0.45 * smile + 0.36 * side;
        frame.apply(channel, remap(stretch, normal, max));
    }

    /// Write head rotation channels (filtered)
    pub fn apply_head_rotation(&self, rotation: &HeadRotation, frame: &mut AnimationFrame) {
        if !rotation.is_finite() {
            return;
        }
        frame.apply(C::HeadPitch, rotation.pitch);
        frame.apply(C::HeadYaw, rotation.yaw);
        frame.apply(C::HeadRoll, rotation.roll);
    }
}
