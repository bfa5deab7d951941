//! Gizmo geometry and picking constants
//!
//! Sizes here are relative to the gizmo scale unless noted otherwise.
//! Colors and size factors that users may want to tune live in
//! [`tx_core::GizmoConfig`] instead.

/// Translate handle geometry
pub mod handle {
    /// Arrow shaft radius
    pub const SHAFT_RADIUS: f32 = 0.02;
    /// Arrow head radius
    pub const HEAD_RADIUS: f32 = 0.06;
    /// Arrow head length
    pub const HEAD_LENGTH: f32 = 0.15;
    /// Number of segments for cylindrical geometry
    pub const SEGMENTS: u32 = 8;
    /// Segments of the center sphere
    pub const CENTER_SEGMENTS: u32 = 12;
}

/// Rotate gizmo geometry
pub mod ring {
    /// Segments of the picker sphere
    pub const PICKER_SEGMENTS: u32 = 32;
    /// Picker and angle line color (RGB)
    pub const PICKER_COLOR: [f32; 3] = [1.0, 1.0, 0.0];
}

/// Ray picking
pub mod picking {
    /// Denominator below which a ray is treated as parallel to a plane
    pub const PARALLEL_EPSILON: f32 = 1e-6;
    /// Maximum sphere tracing steps against a ring
    pub const MAX_TRACE_STEPS: u32 = 256;
    /// Distance (relative to ring radius) at which sphere tracing reports a hit
    pub const TRACE_HIT_EPSILON: f32 = 1e-4;
}

/// Overlay scene names
pub mod overlay {
    /// Scene holding the translate anchor handle
    pub const TRANSLATE_SCENE: &str = "translate-gizmo";
    /// Scene holding the rotate rings, picker and angle line
    pub const ROTATE_SCENE: &str = "rotate-gizmo";
}

/// Camera defaults
pub mod camera {
    /// Default vertical field of view in degrees
    pub const DEFAULT_FOV_DEGREES: f32 = 40.0;
    /// Default near clipping plane
    pub const DEFAULT_NEAR: f32 = 0.1;
    /// Default far clipping plane
    pub const DEFAULT_FAR: f32 = 100000.0;
    /// Distance multiplier applied to the bounding radius when fitting
    pub const FIT_DISTANCE_FACTOR: f32 = 2.5;
}
