//! Gizmo handle axes

use glam::Vec3;
use tx_core::GizmoConfig;

/// Which handle is hovered, grabbed or being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GizmoAxis {
    /// No handle
    #[default]
    None,
    /// X axis handle
    X,
    /// Y axis handle
    Y,
    /// Z axis handle
    Z,
    /// Center handle moving in the camera-facing plane
    Screen,
}

impl GizmoAxis {
    /// The three principal axes
    pub const PRINCIPAL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    /// Index used as vertex `axis_id`, -1 for none
    pub fn to_index(&self) -> i32 {
        match self {
            GizmoAxis::None => -1,
            GizmoAxis::X => 0,
            GizmoAxis::Y => 1,
            GizmoAxis::Z => 2,
            GizmoAxis::Screen => 3,
        }
    }

    /// Unit direction of a principal axis, zero otherwise
    pub fn direction(&self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
            GizmoAxis::None | GizmoAxis::Screen => Vec3::ZERO,
        }
    }

    /// Base color of the handle
    pub fn color(&self, config: &GizmoConfig) -> [f32; 3] {
        match self {
            GizmoAxis::X => config.x_axis_color,
            GizmoAxis::Y => config.y_axis_color,
            GizmoAxis::Z => config.z_axis_color,
            GizmoAxis::None | GizmoAxis::Screen => [0.9, 0.9, 0.9],
        }
    }
}
