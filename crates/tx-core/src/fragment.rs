//! Fragment transforms

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a single fragment in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentTransform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for FragmentTransform {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

impl FragmentTransform {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Same orientation, position moved by `delta`
    pub fn translated(&self, delta: Vec3) -> Self {
        Self::new(self.position + delta, self.orientation)
    }

    /// Rotates the fragment rigidly about `pivot`.
    ///
    /// The position offset from the pivot is rotated by `rotation` and the
    /// orientation is left-multiplied, so successive increments compose in
    /// world space.
    pub fn rotated_about(&self, pivot: Vec3, rotation: Quat) -> Self {
        let position = rotation * (self.position - pivot) + pivot;
        let orientation = (rotation * self.orientation).normalize();
        Self::new(position, orientation)
    }

    /// Orientation as XYZ euler angles in radians
    pub fn euler_xyz(&self) -> Vec3 {
        let (x, y, z) = self.orientation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rotate_about_pivot() {
        let frag = FragmentTransform::from_position(Vec3::new(2.0, 0.0, 0.0));
        let rotated = frag.rotated_about(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_z(PI));
        assert!(rotated.position.abs_diff_eq(Vec3::ZERO, 1e-5));
        assert_relative_eq!(rotated.euler_xyz().z.abs(), PI, epsilon = 1e-4);
    }

    #[test]
    fn test_rotate_about_own_position_keeps_position() {
        let frag = FragmentTransform::from_position(Vec3::new(3.0, -1.0, 2.0));
        let rotated = frag.rotated_about(frag.position, Quat::from_rotation_x(FRAC_PI_2));
        assert!(rotated.position.abs_diff_eq(frag.position, 1e-6));
        assert!(
            rotated
                .orientation
                .abs_diff_eq(Quat::from_rotation_x(FRAC_PI_2), 1e-6)
        );
    }

    #[test]
    fn test_translated() {
        let frag = FragmentTransform::from_position(Vec3::ONE).translated(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(frag.position, Vec3::new(1.0, 6.0, 1.0));
    }
}
