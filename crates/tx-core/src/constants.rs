//! Global constants for tx-core

/// Length below which a vector is treated as zero (axes, directions)
pub const VECTOR_EPSILON: f32 = 1e-6;

/// Margin added around the selection bounds when fitting the view
pub const FIT_VIEW_MARGIN: f32 = 3.0;

/// Default delay before a released rotate gizmo stops swallowing selection events
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Default free-rotate sensitivity (degrees per pixel of pointer motion)
pub const DEFAULT_FREE_ROTATE_DEGREES_PER_PIXEL: f32 = 1.0;
