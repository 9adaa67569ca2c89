//! Synthetic face meshes
//!
//! Builds a 468-point landmark set where only the canonical points carry
//! geometry. The geometry is laid out so that, with the default MediaPipe
//! calibration, the driven channels come out equal to the expression
//! parameters (jaw open, smile, blinks). Everything else sits at a neutral
//! pose.

use std::f32::consts::TAU;

use rand::Rng;

use facelink_core::{FacelinkResult, MIN_LANDMARKS};
use facelink_geometry::{
    CanonicalPoints, FaceLandmarks, HeadRotation, Landmark, LandmarkSet, EYE_OPEN_MAX_RATIO,
};

/// Vertical distance from nose tip to forehead point
const HEAD_TOP: f32 = 10.0;
/// Eye width, corner to corner
const EYE_WIDTH: f32 = 3.0;
const EYE_HEIGHT: f32 = 4.5;
const MOUTH_Y: f32 = -3.0;
const MOUTH_HALF_WIDTH: f32 = 2.3;

/// Expression parameters, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Expression {
    pub jaw_open: f32,
    pub smile: f32,
    pub blink_left: f32,
    pub blink_right: f32,
}

impl Expression {
    pub fn blink(amount: f32) -> Self {
        Expression {
            blink_left: amount,
            blink_right: amount,
            ..Default::default()
        }
    }

    fn clamped(self) -> Self {
        Expression {
            jaw_open: self.jaw_open.clamp(0.0, 1.0),
            smile: self.smile.clamp(0.0, 1.0),
            blink_left: self.blink_left.clamp(0.0, 1.0),
            blink_right: self.blink_right.clamp(0.0, 1.0),
        }
    }
}

/// A face the tests can pose
#[derive(Debug, Clone)]
pub struct SyntheticFace {
    pub expression: Expression,
    pub rotation: HeadRotation,
    points: CanonicalPoints,
}

impl SyntheticFace {
    pub fn neutral() -> Self {
        Self::with_expression(Expression::default())
    }

    pub fn with_expression(expression: Expression) -> Self {
        SyntheticFace {
            expression: expression.clamped(),
            rotation: HeadRotation::default(),
            points: CanonicalPoints::MEDIAPIPE,
        }
    }

    pub fn with_rotation(mut self, rotation: HeadRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Smoothly cycling expression, one full cycle per `period` seconds
    pub fn animated(t: f32, period: f32) -> Self {
        let phase = if period > 0.0 { TAU * t / period } else { 0.0 };
        let wave = |offset: f32| 0.5 - 0.5 * (phase + offset).cos();
        // Blink briefly once per cycle
        let blink = if wave(0.0) > 0.95 { 1.0 } else { 0.0 };

        Self::with_expression(Expression {
            jaw_open: wave(0.0),
            smile: wave(TAU / 3.0),
            blink_left: blink,
            blink_right: blink,
        })
        .with_rotation(HeadRotation::new(
            0.1 * phase.sin(),
            0.3 * (phase * 0.5).sin(),
            0.05 * phase.cos(),
        ))
    }

    /// Metric landmarks
    pub fn metric(&self) -> Vec<Landmark> {
        let e = self.expression;
        let p = &self.points;
        let mut mesh = vec![Landmark::zero(); MIN_LANDMARKS];
        let mut put = |index: usize, x: f32, y: f32| mesh[index] = Landmark::new(x, y, 0.0);

        put(p.nose_tip, 0.0, 0.0);
        put(p.upper_nose, 0.0, 4.0);
        put(p.upper_head, 0.0, HEAD_TOP);
        put(p.inner_brow, 0.0, 6.4);

        // jaw ratio = chin / (head + chin)
        let ratio = 0.5 + 0.05 * e.jaw_open;
        put(p.lowest_chin, 0.0, -HEAD_TOP * ratio / (1.0 - ratio));

        let open = 1.2 * e.jaw_open;
        let upper_lip = MOUTH_Y + open / 2.0;
        let lower_lip = MOUTH_Y - open / 2.0;
        put(p.upper_lip, 0.0, upper_lip);
        put(p.lower_lip, 0.0, lower_lip);
        put(p.upper_outer_lip, 0.0, upper_lip + 0.32);
        put(p.uppest_lip, 0.0, upper_lip + 0.8);
        put(p.over_upper_lip, 0.0, upper_lip + 1.5);
        put(p.lowest_lip, 0.0, lower_lip - 0.55);
        put(p.under_lip, 0.0, lower_lip - 1.0);

        // smile = upper lip y - corner y, calibrated over [-0.25, 0]
        let corner_y = upper_lip + 0.25 * e.smile;
        put(p.mouth_corner_left, MOUTH_HALF_WIDTH, corner_y);
        put(p.mouth_corner_right, -MOUTH_HALF_WIDTH, corner_y);
        put(p.mouth_frown_left, MOUTH_HALF_WIDTH, corner_y - 0.4);
        put(p.mouth_frown_right, -MOUTH_HALF_WIDTH, corner_y - 0.4);
        put(p.mouth_left_stretch, 3.4, MOUTH_Y);
        put(p.mouth_right_stretch, -1.5, MOUTH_Y);

        for (pair, x, gap) in [
            (p.left_upper_press, 1.6, 0.45),
            (p.left_lower_press, 1.6, 0.45),
            (p.right_upper_press, -1.6, 0.45),
            (p.right_lower_press, -1.6, 0.45),
            (p.lower_down_left, 1.2, 1.7),
            (p.lower_down_right, -1.2, 1.7),
            (p.squint_left, 3.0, 0.44),
            (p.squint_right, -3.0, 0.44),
            (p.cheek_squint_left, 4.2, 0.63),
            (p.cheek_squint_right, -4.2, 0.63),
        ] {
            put(pair[0], x, 0.0);
            put(pair[1], x, -gap);
        }

        for (brow, lower, x) in [
            (p.left_brow, p.left_brow_lower, 3.0),
            (p.right_brow, p.right_brow_lower, -3.0),
        ] {
            put(brow, x, 6.2);
            for (i, &index) in lower.iter().enumerate() {
                put(index, x + (i as f32 - 1.0) * 0.5, 5.0);
            }
        }

        for (eye, cx, blink) in [
            (p.eye_left, 3.0, e.blink_left),
            (p.eye_right, -3.0, e.blink_right),
        ] {
            // Open ratio 0.7 at rest, 0.4 fully closed
            let open_ratio = 0.7 - 0.3 * blink;
            let lid = open_ratio * EYE_OPEN_MAX_RATIO * EYE_WIDTH / 2.0;
            let half = EYE_WIDTH / 2.0;
            put(eye[0], cx - half, EYE_HEIGHT);
            put(eye[1], cx + half, EYE_HEIGHT);
            for (k, dx) in [-0.75f32, 0.0, 0.75].into_iter().enumerate() {
                put(eye[2 + k], cx + dx, EYE_HEIGHT + lid);
                put(eye[5 + k], cx + dx, EYE_HEIGHT - lid);
            }
        }

        mesh
    }

    /// Both landmark views; the normalized view maps the face into [0, 1]
    pub fn landmarks(&self) -> FacelinkResult<FaceLandmarks> {
        let metric = self.metric();
        let normalized = metric
            .iter()
            .map(|l| Landmark::new(0.5 + l.x / 40.0, 0.5 - l.y / 40.0, l.z / 40.0))
            .collect();
        to_landmarks(metric, normalized)
    }

    /// Landmarks with uniform noise of up to `amplitude` on every axis
    pub fn jittered<R: Rng>(&self, rng: &mut R, amplitude: f32) -> FacelinkResult<FaceLandmarks> {
        let mut jitter = |l: &Landmark| {
            Landmark::new(
                l.x + rng.gen_range(-amplitude..=amplitude),
                l.y + rng.gen_range(-amplitude..=amplitude),
                l.z + rng.gen_range(-amplitude..=amplitude),
            )
        };
        let metric: Vec<Landmark> = self.metric().iter().map(&mut jitter).collect();
        let normalized = metric
            .iter()
            .map(|l| Landmark::new(0.5 + l.x / 40.0, 0.5 - l.y / 40.0, l.z / 40.0))
            .collect();
        to_landmarks(metric, normalized)
    }

    /// Row-major 4x4 pose transform whose rotation decomposes to `rotation`
    pub fn pose_transform(&self) -> [[f32; 4]; 4] {
        let r = rotation_matrix(-self.rotation.pitch, self.rotation.yaw, self.rotation.roll);
        [
            [r[0][0], r[0][1], r[0][2], 0.0],
            [r[1][0], r[1][1], r[1][2], 0.0],
            [r[2][0], r[2][1], r[2][2], -40.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}

fn to_landmarks(metric: Vec<Landmark>, normalized: Vec<Landmark>) -> FacelinkResult<FaceLandmarks> {
    Ok(FaceLandmarks::new(
        LandmarkSet::new(metric)?,
        LandmarkSet::new(normalized)?,
    ))
}

/// Rz(z) * Ry(y) * Rx(x)
pub fn rotation_matrix(x: f32, y: f32, z: f32) -> [[f32; 3]; 3] {
    let (sx, cx) = x.sin_cos();
    let (sy, cy) = y.sin_cos();
    let (sz, cz) = z.sin_cos();
    [
        [cz * cy, cz * sy * sx - sz * cx, cz * sy * cx + sz * sx],
        [sz * cy, sz * sy * sx + cz * cx, sz * sy * cx - cz * sx],
        [-sy, cy * sx, cy * cx],
    ]
}
