//! Axis-aligned bounds of fragments, nodes and selections

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box, the identity of [`BoundingBox::union`]
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Smallest box holding every point; empty for no points
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |acc, point| {
            Self::new(acc.min.min(point), acc.max.max(point))
        })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extents
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// Radius of the enclosing sphere
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Grow by `amount` on every side
    pub fn expand_by_scalar(&self, amount: f32) -> BoundingBox {
        let margin = Vec3::splat(amount);
        Self::new(self.min - margin, self.max + margin)
    }

    /// World bounds of a local box placed at `position` with `orientation`.
    ///
    /// The result encloses the eight rotated corners, so it can be looser
    /// than the tightest fit.
    pub fn placed(&self, position: Vec3, orientation: Quat) -> BoundingBox {
        if !self.is_valid() {
            return *self;
        }
        let matrix = Mat4::from_rotation_translation(orientation, position);
        let (lo, hi) = (self.min, self.max);
        Self::from_points((0..8).map(|corner| {
            let pick = |bit: u32, lo: f32, hi: f32| if corner & bit == 0 { lo } else { hi };
            matrix.transform_point3(Vec3::new(
                pick(1, lo.x, hi.x),
                pick(2, lo.y, hi.y),
                pick(4, lo.z, hi.z),
            ))
        }))
    }

    /// False for the empty box
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
