//! Landmark points and landmark sets

use std::ops::{Add, Div, Sub};

use facelink_core::{FacelinkError, FacelinkResult, MIN_LANDMARKS};

/// A single tracked face point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(&self, other: &Landmark) -> Landmark {
        (*self + *other) / 2.0
    }

    /// Centroid of a group of points (zero for an empty group)
    pub fn centroid(points: &[Landmark]) -> Landmark {
        if points.is_empty() {
            return Landmark::zero();
        }
        let sum = points.iter().fold(Landmark::zero(), |acc, p| acc + *p);
        sum / points.len() as f32
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Landmark {
    type Output = Landmark;

    fn add(self, rhs: Landmark) -> Landmark {
        Landmark::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Landmark {
    type Output = Landmark;

    fn sub(self, rhs: Landmark) -> Landmark {
        Landmark::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Div<f32> for Landmark {
    type Output = Landmark;

    fn div(self, rhs: f32) -> Landmark {
        Landmark::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl From<[f32; 3]> for Landmark {
    fn from(p: [f32; 3]) -> Self {
        Landmark::new(p[0], p[1], p[2])
    }
}

/// An immutable set of landmarks for one processed video frame
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    /// Wrap a detector output, rejecting meshes smaller than the canonical topology
    pub fn new(points: Vec<Landmark>) -> FacelinkResult<Self> {
        if points.len() < MIN_LANDMARKS {
            return Err(FacelinkError::NotEnoughLandmarks {
                expected: MIN_LANDMARKS,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Build from raw `[x, y, z]` triples
    pub fn from_xyz(points: &[[f32; 3]]) -> FacelinkResult<Self> {
        Self::new(points.iter().copied().map(Landmark::from).collect())
    }

    /// Landmark at `index`.
    ///
    /// Out-of-range indices yield the origin so a bad table entry degrades
    /// to a neutral measurement instead of a panic.
    #[inline]
    pub fn point(&self, index: usize) -> Landmark {
        self.points.get(index).copied().unwrap_or_default()
    }

    /// Distance between two indexed landmarks
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        self.point(a).distance(&self.point(b))
    }

    /// Centroid of several indexed landmarks
    pub fn centroid(&self, indices: &[usize]) -> Landmark {
        let points: Vec<Landmark> = indices.iter().map(|&i| self.point(i)).collect();
        Landmark::centroid(&points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }
}

/// Which of the two parallel landmark views to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LandmarkView {
    /// Reconstructed metric-space mesh (centimetre scale)
    #[default]
    Metric,
    /// Image-space mesh normalized to [0, 1] by the detector
    Normalized,
}

/// Both landmark views the detector supplies for one frame
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    pub metric: LandmarkSet,
    pub normalized: LandmarkSet,
}

impl FaceLandmarks {
    pub fn new(metric: LandmarkSet, normalized: LandmarkSet) -> Self {
        Self { metric, normalized }
    }

    /// Select a view
    pub fn view(&self, view: LandmarkView) -> &LandmarkSet {
        match view {
            LandmarkView::Metric => &self.metric,
            LandmarkView::Normalized => &self.normalized,
        }
    }

    /// Uniform index accessor over either view
    pub fn landmark(&self, index: usize, view: LandmarkView) -> Landmark {
        self.view(view).point(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(n: usize) -> Vec<Landmark> {
        (0..n).map(|i| Landmark::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_landmark_distance() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.midpoint(&b), Landmark::new(1.5, 2.0, 0.0));
    }

    #[test]
    fn test_centroid_of_empty_is_zero() {
        assert_eq!(Landmark::centroid(&[]), Landmark::zero());
    }

    #[test]
    fn test_set_rejects_small_mesh() {
        let err = LandmarkSet::new(mesh(100)).unwrap_err();
        assert!(matches!(
            err,
            FacelinkError::NotEnoughLandmarks {
                expected: 468,
                actual: 100
            }
        ));
    }

    #[test]
    fn test_set_accepts_refined_mesh() {
        let set = LandmarkSet::new(mesh(478)).unwrap();
        assert_eq!(set.len(), 478);
        assert_eq!(set.point(477).x, 477.0);
        assert_eq!(set.point(10_000), Landmark::zero());
        assert_eq!(set.distance(2, 5), 3.0);
    }

    #[test]
    fn test_views() {
        let metric = LandmarkSet::new(mesh(468)).unwrap();
        let normalized = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0); 468]).unwrap();
        let face = FaceLandmarks::new(metric, normalized);

        assert_eq!(face.landmark(7, LandmarkView::Metric).x, 7.0);
        assert_eq!(face.landmark(7, LandmarkView::Normalized).x, 0.5);
    }
}
