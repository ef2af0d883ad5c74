//! Shared geometry for tap and ghost-click matching.

use serde::{Deserialize, Serialize};

/// A point in the host's coordinate space (e.g. viewport pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// True if `other` lies within `radius` (inclusive) of this point.
    pub fn is_within(&self, other: Point, radius: f64) -> bool {
        self.distance_to(other) <= radius
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Clicks synthesized without a pointer (keyboard activation, scripted
    /// `click()`) are reported at the origin.
    pub fn is_origin(&self) -> bool {
        self.x < 1.0 && self.y < 1.0
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(10.0, 10.0);
        let b = Point::new(13.0, 14.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert!(a.is_within(b, 5.0));
        assert!(!a.is_within(b, 4.9));
    }

    #[test]
    fn test_origin() {
        assert!(Point::new(0.0, 0.0).is_origin());
        assert!(Point::new(0.5, 0.9).is_origin());
        assert!(!Point::new(0.0, 10.0).is_origin());
        assert!(!Point::new(10.0, 10.0).is_origin());
    }

    #[test]
    fn test_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY).is_finite());
    }
}
