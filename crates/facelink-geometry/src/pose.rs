//! Head rotation from a face pose matrix
//!
//! The landmark source may supply the rigid transform that maps the
//! canonical face onto the detected one. Its rotation part is decomposed
//! into static-frame XYZ Euler angles.

/// Below this the decomposition is in gimbal lock
const GIMBAL_EPSILON: f32 = 4.0 * f32::EPSILON;

/// Head orientation in radians
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadRotation {
    /// Nodding, positive looking up
    pub pitch: f32,
    /// Turning left/right
    pub yaw: f32,
    /// Tilting towards a shoulder
    pub roll: f32,
}

impl HeadRotation {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Decompose a row-major 3x3 rotation matrix.
    ///
    /// The X angle is negated into pitch so that a raised chin is positive.
    pub fn from_matrix(m: &[[f32; 3]; 3]) -> Self {
        let (x, y, z) = euler_sxyz(m);
        let rotation = Self {
            pitch: -x,
            yaw: y,
            roll: z,
        };
        if rotation.is_finite() {
            rotation
        } else {
            Self::default()
        }
    }

    /// Use the upper-left 3x3 block of a 4x4 pose transform
    pub fn from_pose_transform(m: &[[f32; 4]; 4]) -> Self {
        let rotation = [
            [m[0][0], m[0][1], m[0][2]],
            [m[1][0], m[1][1], m[1][2]],
            [m[2][0], m[2][1], m[2][2]],
        ];
        Self::from_matrix(&rotation)
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// Static-frame XYZ Euler decomposition
fn euler_sxyz(m: &[[f32; 3]; 3]) -> (f32, f32, f32) {
    let cy = (m[0][0] * m[0][0] + m[1][0] * m[1][0]).sqrt();
    if cy > GIMBAL_EPSILON {
        let ax = m[2][1].atan2(m[2][2]);
        let ay = (-m[2][0]).atan2(cy);
        let az = m[1][0].atan2(m[0][0]);
        (ax, ay, az)
    } else {
        let ax = (-m[1][2]).atan2(m[1][1]);
        let ay = (-m[2][0]).atan2(cy);
        (ax, ay, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const IDENTITY: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    fn rot_x(a: f32) -> [[f32; 3]; 3] {
        [[1.0, 0.0, 0.0], [0.0, a.cos(), -a.sin()], [0.0, a.sin(), a.cos()]]
    }

    fn rot_y(a: f32) -> [[f32; 3]; 3] {
        [[a.cos(), 0.0, a.sin()], [0.0, 1.0, 0.0], [-a.sin(), 0.0, a.cos()]]
    }

    fn rot_z(a: f32) -> [[f32; 3]; 3] {
        [[a.cos(), -a.sin(), 0.0], [a.sin(), a.cos(), 0.0], [0.0, 0.0, 1.0]]
    }

    #[test]
    fn test_identity_is_neutral() {
        assert_eq!(HeadRotation::from_matrix(&IDENTITY), HeadRotation::default());
    }

    #[test]
    fn test_single_axis_rotations() {
        let r = HeadRotation::from_matrix(&rot_x(0.3));
        assert!((r.pitch + 0.3).abs() < 1e-5);
        assert!(r.yaw.abs() < 1e-5 && r.roll.abs() < 1e-5);

        let r = HeadRotation::from_matrix(&rot_y(-0.2));
        assert!((r.yaw + 0.2).abs() < 1e-5);

        let r = HeadRotation::from_matrix(&rot_z(0.4));
        assert!((r.roll - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_gimbal_lock_is_finite() {
        let r = HeadRotation::from_matrix(&rot_y(FRAC_PI_2));
        assert!(r.is_finite());
        assert!((r.yaw - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn test_pose_transform_uses_rotation_block() {
        let r = rot_z(0.25);
        let m = [
            [r[0][0], r[0][1], r[0][2], 5.0],
            [r[1][0], r[1][1], r[1][2], -3.0],
            [r[2][0], r[2][1], r[2][2], 40.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let rotation = HeadRotation::from_pose_transform(&m);
        assert!((rotation.roll - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_nan_matrix_is_neutral() {
        let m = [[f32::NAN; 3]; 3];
        assert_eq!(HeadRotation::from_matrix(&m), HeadRotation::default());
    }
}
