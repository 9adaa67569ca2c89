//! Canonical point table
//!
//! Indices into the MediaPipe canonical face model (468-point topology).
//! Eye contours list 8 points: the two corners, then three upper lid points
//! and the three lower lid points facing them.

/// Named facial regions mapped to landmark indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPoints {
    pub eye_right: [usize; 8],
    pub eye_left: [usize; 8],
    pub nose_tip: usize,
    pub upper_nose: usize,
    pub upper_head: usize,
    pub lowest_chin: usize,

    // Lips
    pub uppest_lip: usize,
    pub upper_outer_lip: usize,
    pub upper_lip: usize,
    pub lower_lip: usize,
    pub lowest_lip: usize,
    pub under_lip: usize,
    pub over_upper_lip: usize,

    // Mouth corners and surroundings
    pub mouth_corner_left: usize,
    pub mouth_corner_right: usize,
    pub mouth_frown_left: usize,
    pub mouth_frown_right: usize,
    pub mouth_left_stretch: usize,
    pub mouth_right_stretch: usize,
    pub left_upper_press: [usize; 2],
    pub left_lower_press: [usize; 2],
    pub right_upper_press: [usize; 2],
    pub right_lower_press: [usize; 2],
    pub lower_down_left: [usize; 2],
    pub lower_down_right: [usize; 2],

    // Eyes, brows, cheeks
    pub squint_left: [usize; 2],
    pub squint_right: [usize; 2],
    pub left_brow: usize,
    pub left_brow_lower: [usize; 3],
    pub right_brow: usize,
    pub right_brow_lower: [usize; 3],
    pub inner_brow: usize,
    pub cheek_squint_left: [usize; 2],
    pub cheek_squint_right: [usize; 2],
}

impl CanonicalPoints {
    /// MediaPipe face mesh topology
    pub const MEDIAPIPE: CanonicalPoints = CanonicalPoints {
        eye_right: [33, 133, 160, 159, 158, 144, 145, 153],
        eye_left: [263, 362, 387, 386, 385, 373, 374, 380],
        nose_tip: 1,
        upper_nose: 6,
        upper_head: 10,
        lowest_chin: 152,

        uppest_lip: 0,
        upper_outer_lip: 12,
        upper_lip: 13,
        lower_lip: 14,
        lowest_lip: 17,
        under_lip: 18,
        over_upper_lip: 164,

        mouth_corner_left: 291,
        mouth_corner_right: 61,
        mouth_frown_left: 422,
        mouth_frown_right: 202,
        mouth_left_stretch: 287,
        mouth_right_stretch: 57,
        left_upper_press: [40, 80],
        left_lower_press: [88, 91],
        right_upper_press: [270, 310],
        right_lower_press: [318, 321],
        lower_down_left: [424, 319],
        lower_down_right: [204, 89],

        squint_left: [253, 450],
        squint_right: [23, 230],
        left_brow: 257,
        left_brow_lower: [283, 282, 295],
        right_brow: 27,
        right_brow_lower: [53, 52, 65],
        inner_brow: 9,
        cheek_squint_left: [359, 342],
        cheek_squint_right: [130, 113],
    };

    /// Every index referenced by the table
    pub fn indices(&self) -> Vec<usize> {
        let mut all = Vec::with_capacity(80);
        all.extend_from_slice(&self.eye_right);
        all.extend_from_slice(&self.eye_left);
        all.extend_from_slice(&[
            self.nose_tip,
            self.upper_nose,
            self.upper_head,
            self.lowest_chin,
            self.uppest_lip,
            self.upper_outer_lip,
            self.upper_lip,
            self.lower_lip,
            self.lowest_lip,
            self.under_lip,
            self.over_upper_lip,
            self.mouth_corner_left,
            self.mouth_corner_right,
            self.mouth_frown_left,
            self.mouth_frown_right,
            self.mouth_left_stretch,
            self.mouth_right_stretch,
            self.left_brow,
            self.right_brow,
            self.inner_brow,
        ]);
        for pair in [
            self.left_upper_press,
            self.left_lower_press,
            self.right_upper_press,
            self.right_lower_press,
            self.lower_down_left,
            self.lower_down_right,
            self.squint_left,
            self.squint_right,
            self.cheek_squint_left,
            self.cheek_squint_right,
        ] {
            all.extend_from_slice(&pair);
        }
        all.extend_from_slice(&self.left_brow_lower);
        all.extend_from_slice(&self.right_brow_lower);
        all
    }

    /// Highest index referenced by the table
    pub fn max_index(&self) -> usize {
        self.indices().into_iter().max().unwrap_or(0)
    }
}

impl Default for CanonicalPoints {
    fn default() -> Self {
        Self::MEDIAPIPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelink_core::MIN_LANDMARKS;

    #[test]
    fn test_table_fits_canonical_mesh() {
        assert!(CanonicalPoints::MEDIAPIPE.max_index() < MIN_LANDMARKS);
    }

    #[test]
    fn test_eye_contours_have_eight_points() {
        let table = CanonicalPoints::default();
        assert_eq!(table.eye_left.len(), 8);
        assert_eq!(table.eye_right.len(), 8);
        assert_eq!(table.eye_right[0], 33);
        assert_eq!(table.eye_left[0], 263);
    }
}
