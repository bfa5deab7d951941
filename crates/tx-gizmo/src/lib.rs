//! Transform Gizmos
//!
//! Gizmo geometry, ray picking and the overlay host the transform tools
//! draw into.
//!
//! # Architecture
//!
//! - [`render::RenderHost`] - Overlay surface provided by the host renderer
//! - [`translate_handle::TranslateHandle`] - Draggable anchor (arrows + center)
//! - [`rotate_gizmo::RotateGizmo`] - Three rings with picker and angle line
//! - [`camera::Camera`] - Orbit camera producing pointer rays
//!
//! # Module Structure
//!
//! ```text
//! tx-gizmo/
//! ├── axis.rs              # GizmoAxis
//! ├── camera.rs            # Orbit camera, WorldUp, screen rays
//! ├── collision.rs         # Ray vs plane, sphere, cylinder, arc torus
//! ├── geometry.rs          # Torus, sphere, line and arrow meshes
//! ├── material.rs          # Two-state gizmo material
//! ├── render.rs            # RenderHost and HeadlessRenderer
//! ├── translate_handle.rs  # Translate anchor handle
//! └── rotate_gizmo.rs      # Rotate rings
//! ```

pub mod axis;
pub mod camera;
pub mod collision;
pub mod constants;
pub mod geometry;
pub mod material;
pub mod render;
pub mod rotate_gizmo;
pub mod translate_handle;

pub use axis::GizmoAxis;
pub use camera::{Camera, Projection, WorldUp};
pub use collision::{ArcTorus, Plane, Ray};
pub use geometry::{GizmoVertex, MeshData, Topology};
pub use material::GizmoMaterial;
pub use render::{HeadlessRenderer, OverlayId, OverlayState, RenderHost, SharedRenderer};
pub use rotate_gizmo::{RingHit, RingStep, RotateGizmo};
pub use translate_handle::TranslateHandle;
