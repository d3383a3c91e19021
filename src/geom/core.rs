use std::ops::{Add, Mul, Sub};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector along the Z axis (local "up" for projected footprints).
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 0.0 {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Component-wise check that every coordinate is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.mul_scalar(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Vector from `other` to `self`.
    #[must_use]
    pub const fn sub_point(self, other: Self) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, rhs: Vec3) -> Self::Output {
        self.add_vec(rhs)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BBox
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point3,
    pub max: Point3,
}

impl BBox {
    #[must_use]
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Bounding box of a raw position buffer, `None` when it is empty.
    #[must_use]
    pub fn from_positions(positions: &[[f64; 3]]) -> Option<Self> {
        let mut iter = positions.iter().copied().map(Point3::from_array);
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), Self::expand_point))
    }

    /// Center point of the bounding box.
    #[must_use]
    pub fn center(self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Size (dimensions) of the bounding box.
    #[must_use]
    pub fn size(self) -> Vec3 {
        self.max.sub_point(self.min)
    }

    #[must_use]
    pub fn expand_point(self, p: Point3) -> Self {
        Self::new(
            Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        )
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        self.expand_point(other.min).expand_point(other.max)
    }

    /// The same box moved by `offset`.
    #[must_use]
    pub fn translated(self, offset: Vec3) -> Self {
        Self::new(self.min.add_vec(offset), self.max.add_vec(offset))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for geometric operations.
///
/// Projected footprints live in meters, so the defaults are absolute metric
/// tolerances. `Tolerance::default_geom()` (1e-9) is scaled by the footprint
/// extent where a relative tolerance is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default geometric tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn default_geom() -> Self {
        Self::DEFAULT
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_of_axes_is_right_handed() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vec3::Z);
    }

    #[test]
    fn normalized_rejects_zero_vector() {
        assert!(Vec3::ZERO.normalized().is_none());
        let n = Vec3::new(3.0, 4.0, 0.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bbox_from_positions_and_center() {
        let bbox = BBox::from_positions(&[[-2.0, 0.0, 0.0], [4.0, 10.0, 0.0], [1.0, 5.0, 0.0]])
            .unwrap();
        assert_eq!(bbox.min, Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(4.0, 10.0, 0.0));
        assert_eq!(bbox.center(), Point3::new(1.0, 5.0, 0.0));
        assert_eq!(bbox.size(), Vec3::new(6.0, 10.0, 0.0));
    }

    #[test]
    fn bbox_from_empty_positions_is_none() {
        assert!(BBox::from_positions(&[]).is_none());
    }

    #[test]
    fn bbox_union_and_translate() {
        let a = BBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let b = BBox::new(Point3::new(2.0, -1.0, 0.0), Point3::new(3.0, 0.5, 0.0));
        let u = a.union(b);
        assert_eq!(u.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Point3::new(3.0, 1.0, 0.0));

        let moved = u.translated(Vec3::new(-1.5, 0.0, 0.0));
        assert_eq!(moved.center(), Point3::ORIGIN);
    }

    #[test]
    fn tolerance_defaults() {
        assert_eq!(Tolerance::default(), Tolerance::default_geom());
        assert!((Tolerance::new(1e-3).eps_squared() - 1e-6).abs() < 1e-18);
    }
}
