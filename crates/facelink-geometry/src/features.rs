//! Geometric features measured on the metric landmark view
//!
//! Each field of [`FaceFeatures`] is one raw signal the mapper calibrates
//! into a blendshape weight. Units are those of the metric mesh, except the
//! ratios which are dimensionless.

use crate::{CanonicalPoints, Landmark, LandmarkSet};

/// Denominators smaller than this are treated as collapsed
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Eye lid-to-width ratio of a fully open eye (Kalidokit calibration)
pub const EYE_OPEN_MAX_RATIO: f32 = 0.285;

/// Upper clamp of the normalized eye openness ratio
pub const EYE_OPEN_CLAMP: f32 = 2.0;

/// Divide, returning 0 when the denominator collapses or the result is not finite
#[inline]
pub fn safe_ratio(numerator: f32, denominator: f32) -> f32 {
    if denominator.abs() < DEGENERATE_EPSILON || !denominator.is_finite() {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

#[inline]
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Average lid opening of one eye relative to its width.
///
/// `eye` is an 8-point contour: two corners, three upper lid points, three
/// lower lid points.
pub fn eye_lid_ratio(set: &LandmarkSet, eye: &[usize; 8]) -> f32 {
    let width = set.distance(eye[0], eye[1]);
    let outer = set.distance(eye[2], eye[5]);
    let mid = set.distance(eye[3], eye[6]);
    let inner = set.distance(eye[4], eye[7]);
    safe_ratio((outer + mid + inner) / 3.0, width)
}

/// Eye openness normalized against a fully open eye, clamped to [0, 2]
pub fn eye_open_ratio(set: &LandmarkSet, eye: &[usize; 8]) -> f32 {
    (eye_lid_ratio(set, eye) / EYE_OPEN_MAX_RATIO).clamp(0.0, EYE_OPEN_CLAMP)
}

/// All raw signals for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaceFeatures {
    // Mouth shape
    pub mouth_width: f32,
    pub mouth_open: f32,
    pub mouth_center_nose: f32,
    pub jaw_open_ratio: f32,

    // Vertical lip-corner displacements
    pub smile_left: f32,
    pub smile_right: f32,
    pub frown_left: f32,
    pub frown_right: f32,

    // Horizontal displacements
    pub stretch_left: f32,
    pub stretch_right: f32,
    pub center_stretch_left: f32,
    pub center_stretch_right: f32,
    pub jaw_lateral: f32,

    // Lip distances
    pub lower_lip_roll: f32,
    pub upper_lip_roll: f32,
    pub upper_lip_nose: f32,
    pub shrug_lower: f32,
    pub lower_down_left: f32,
    pub lower_down_right: f32,
    pub press_left: f32,
    pub press_right: f32,

    // Eyes
    pub eye_open_left: f32,
    pub eye_open_right: f32,
    pub squint_left: f32,
    pub squint_right: f32,

    // Brows and cheeks
    pub brow_left: f32,
    pub brow_right: f32,
    pub inner_brow: f32,
    pub cheek_squint_left: f32,
    pub cheek_squint_right: f32,
}

impl FaceFeatures {
    /// Measure every feature on one landmark set
    pub fn measure(set: &LandmarkSet, points: &CanonicalPoints) -> FaceFeatures {
        let p = |i: usize| set.point(i);
        let pair = |ix: [usize; 2]| set.distance(ix[0], ix[1]);

        let upper_lip = p(points.upper_lip);
        let lower_lip = p(points.lower_lip);
        let corner_left = p(points.mouth_corner_left);
        let corner_right = p(points.mouth_corner_right);
        let nose_tip = p(points.nose_tip);
        let chin = p(points.lowest_chin);
        let lowest_lip = p(points.lowest_lip);

        let mouth_center = upper_lip.midpoint(&lower_lip);
        let mouth_open = upper_lip.distance(&lower_lip);
        let head_height = p(points.upper_head).distance(&chin);

        let stretch_left_point = p(points.mouth_left_stretch);
        let stretch_right_point = p(points.mouth_right_stretch);

        let features = FaceFeatures {
            mouth_width: corner_left.distance(&corner_right),
            mouth_open,
            mouth_center_nose: mouth_center.distance(&nose_tip),
            jaw_open_ratio: safe_ratio(chin.distance(&nose_tip), head_height),

            smile_left: upper_lip.y - corner_left.y,
            smile_right: upper_lip.y - corner_right.y,
            frown_left: (corner_left - p(points.mouth_frown_left)).y,
            frown_right: (corner_right - p(points.mouth_frown_right)).y,

            stretch_left: corner_left.x - stretch_left_point.x,
            stretch_right: stretch_right_point.x - corner_right.x,
            center_stretch_left: mouth_center.x - stretch_left_point.x,
            center_stretch_right: mouth_center.x - stretch_right_point.x,
            jaw_lateral: nose_tip.x - chin.x,

            lower_lip_roll: lower_lip.distance(&lowest_lip),
            upper_lip_roll: upper_lip.distance(&p(points.upper_outer_lip)),
            upper_lip_nose: nose_tip.y - p(points.uppest_lip).y,
            shrug_lower: lowest_lip.distance(&p(points.over_upper_lip)),
            lower_down_left: pair(points.lower_down_left) + mouth_open * 0.5,
            lower_down_right: pair(points.lower_down_right) + mouth_open * 0.5,
            press_left: (pair(points.left_upper_press) + pair(points.left_lower_press)) / 2.0,
            press_right: (pair(points.right_upper_press) + pair(points.right_lower_press)) / 2.0,

            eye_open_left: eye_open_ratio(set, &points.eye_left),
            eye_open_right: eye_open_ratio(set, &points.eye_right),
            squint_left: pair(points.squint_left),
            squint_right: pair(points.squint_right),

            brow_left: brow_distance(set, points.left_brow, &points.left_brow_lower),
            brow_right: brow_distance(set, points.right_brow, &points.right_brow_lower),
            inner_brow: p(points.upper_nose).distance(&p(points.inner_brow)),
            cheek_squint_left: pair(points.cheek_squint_left),
            cheek_squint_right: pair(points.cheek_squint_right),
        };

        features.sanitized()
    }

    /// Replace any non-finite field with 0
    pub fn sanitized(mut self) -> FaceFeatures {
        for value in self.values_mut() {
            *value = finite_or_zero(*value);
        }
        self
    }

    fn values_mut(&mut self) -> [&mut f32; 30] {
        [
            &mut self.mouth_width,
            &mut self.mouth_open,
            &mut self.mouth_center_nose,
            &mut self.jaw_open_ratio,
            &mut self.smile_left,
            &mut self.smile_right,
            &mut self.frown_left,
            &mut self.frown_right,
            &mut self.stretch_left,
            &mut self.stretch_right,
            &mut self.center_stretch_left,
            &mut self.center_stretch_right,
            &mut self.jaw_lateral,
            &mut self.lower_lip_roll,
            &mut self.upper_lip_roll,
            &mut self.upper_lip_nose,
            &mut self.shrug_lower,
            &mut self.lower_down_left,
            &mut self.lower_down_right,
            &mut self.press_left,
            &mut self.press_right,
            &mut self.eye_open_left,
            &mut self.eye_open_right,
            &mut self.squint_left,
            &mut self.squint_right,
            &mut self.brow_left,
            &mut self.brow_right,
            &mut self.inner_brow,
            &mut self.cheek_squint_left,
            &mut self.cheek_squint_right,
        ]
    }

    /// True when every field is finite
    pub fn is_finite(&self) -> bool {
        let mut copy = *self;
        copy.values_mut().iter().all(|v| v.is_finite())
    }
}

fn brow_distance(set: &LandmarkSet, brow: usize, lower: &[usize; 3]) -> f32 {
    let below: Landmark = set.centroid(lower);
    set.point(brow).distance(&below)
}
