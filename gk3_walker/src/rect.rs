use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle on the ground plane (world X/Z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
}

impl WorldRect {
    pub fn new(x: f32, z: f32, width: f32, depth: f32) -> Self {
        Self { x, z, width, depth }
    }

    /// Builds a rect spanning two opposite corners, in any order.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        let min_x = a.0.min(b.0);
        let min_z = a.1.min(b.1);
        Self {
            x: min_x,
            z: min_z,
            width: (a.0 - b.0).abs(),
            depth: (a.1 - b.1).abs(),
        }
    }

    /// Edges are inclusive on the min side and exclusive on the max side.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.x && x < self.x + self.width && z >= self.z && z < self.z + self.depth
    }

    pub fn contains_world(&self, point: Vec3) -> bool {
        self.contains(point.x, point.z)
    }

    /// True when the two rects share some area. Rects that only touch along
    /// an edge do not overlap.
    pub fn overlaps(&self, other: &WorldRect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.z < other.z + other.depth
            && other.z < self.z + self.depth
    }

    /// Finite origin and strictly positive extent. Anything else contains no
    /// point at all.
    pub fn has_area(&self) -> bool {
        [self.x, self.z, self.width, self.depth]
            .iter()
            .all(|value| value.is_finite())
            && self.width > 0.0
            && self.depth > 0.0
    }
}

/// A named exclusion rect as stored by a region and declared in configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRect {
    pub name: String,
    #[serde(flatten)]
    pub rect: WorldRect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let rect = WorldRect::new(10.0, 20.0, 5.0, 5.0);
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(14.9, 24.9));
        assert!(!rect.contains(15.0, 22.0));
        assert!(!rect.contains(12.0, 25.0));
        assert!(!rect.contains(9.9, 22.0));
    }

    #[test]
    fn overlap_needs_shared_area() {
        let rect = WorldRect::new(10.0, 10.0, 10.0, 10.0);
        assert!(rect.overlaps(&WorldRect::new(19.0, 19.0, 5.0, 5.0)));
        assert!(rect.overlaps(&WorldRect::new(12.0, 12.0, 1.0, 1.0)));
        assert!(rect.overlaps(&WorldRect::new(0.0, 0.0, 40.0, 40.0)));
        // shared edge only
        assert!(!rect.overlaps(&WorldRect::new(20.0, 10.0, 5.0, 10.0)));
        assert!(!rect.overlaps(&WorldRect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn degenerate_rects_have_no_area() {
        assert!(WorldRect::new(-5.0, -5.0, 1.0, 2.0).has_area());
        assert!(!WorldRect::new(0.0, 0.0, 0.0, 2.0).has_area());
        assert!(!WorldRect::new(0.0, 0.0, 3.0, -2.0).has_area());
        assert!(!WorldRect::new(f32::NAN, 0.0, 3.0, 2.0).has_area());
        assert!(!WorldRect::new(0.0, 0.0, f32::INFINITY, 2.0).has_area());
    }

    #[test]
    fn corners_normalize() {
        let rect = WorldRect::from_corners((8.0, 2.0), (3.0, 6.0));
        assert_eq!(rect, WorldRect::new(3.0, 2.0, 5.0, 4.0));
        assert!(rect.contains_world(Vec3::new(4.0, 100.0, 3.0)));
    }
}
