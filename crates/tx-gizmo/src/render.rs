//! Overlay render host
//!
//! The gizmos draw into named overlay scenes owned by the host renderer.
//! [`RenderHost`] is the whole surface they need; [`HeadlessRenderer`]
//! records every call and is what tests and the demo binary run against.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Mat4;
use parking_lot::Mutex;

use crate::geometry::MeshData;
use crate::material::GizmoMaterial;

/// Handle of an overlay mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Per-frame state of an overlay mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayState {
    /// Local-to-world transform
    pub transform: Mat4,
    /// Current material
    pub material: GizmoMaterial,
    /// Whether the mesh is drawn
    pub visible: bool,
}

/// Overlay drawing surface provided by the host
pub trait RenderHost {
    /// Create an (empty) overlay scene; creating an existing scene is a no-op
    fn create_overlay_scene(&mut self, scene: &str);

    /// Remove an overlay scene and every mesh in it
    fn remove_overlay_scene(&mut self, scene: &str);

    /// Add a mesh to an overlay scene
    fn add_overlay(&mut self, scene: &str, mesh: MeshData, state: OverlayState) -> OverlayId;

    /// Update transform, material or visibility of a mesh
    fn update_overlay(&mut self, id: OverlayId, state: OverlayState);

    /// Ask for a redraw of the scene and its overlays
    fn request_redraw(&mut self);
}

/// Render host shared between the tools
pub type SharedRenderer = Arc<Mutex<dyn RenderHost + Send>>;

/// Overlay mesh recorded by [`HeadlessRenderer`]
#[derive(Debug, Clone)]
pub struct RecordedOverlay {
    /// Owning overlay scene
    pub scene: String,
    /// Geometry as submitted
    pub mesh: MeshData,
    /// Latest state
    pub state: OverlayState,
}

/// Render host that only records what it is asked to draw
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    scenes: BTreeMap<String, Vec<OverlayId>>,
    overlays: BTreeMap<OverlayId, RecordedOverlay>,
    next_id: u64,
    uploaded_bytes: usize,
}

impl HeadlessRenderer {
    /// Create an empty renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an overlay scene exists
    pub fn has_scene(&self, scene: &str) -> bool {
        self.scenes.contains_key(scene)
    }

    /// Look up a live overlay
    pub fn overlay(&self, id: OverlayId) -> Option<&RecordedOverlay> {
        self.overlays.get(&id)
    }

    /// Number of live overlays across all scenes
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Number of visible overlays in a scene
    pub fn visible_count(&self, scene: &str) -> usize {
        self.scenes.get(scene).map_or(0, |ids| {
            ids.iter()
                .filter_map(|id| self.overlays.get(id))
                .filter(|overlay| overlay.state.visible)
                .count()
        })
    }

    /// Total vertex bytes submitted so far
    pub fn uploaded_bytes(&self) -> usize {
        self.uploaded_bytes
    }
}

impl RenderHost for HeadlessRenderer {
    fn create_overlay_scene(&mut self, scene: &str) {
        self.scenes.entry(scene.to_string()).or_default();
    }

    fn remove_overlay_scene(&mut self, scene: &str) {
        if let Some(ids) = self.scenes.remove(scene) {
            for id in ids {
                self.overlays.remove(&id);
            }
        }
    }

    fn add_overlay(&mut self, scene: &str, mesh: MeshData, state: OverlayState) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.uploaded_bytes += mesh.vertex_bytes().len();
        self.scenes.entry(scene.to_string()).or_default().push(id);
        self.overlays.insert(
            id,
            RecordedOverlay {
                scene: scene.to_string(),
                mesh,
                state,
            },
        );
        id
    }

    fn update_overlay(&mut self, id: OverlayId, state: OverlayState) {
        match self.overlays.get_mut(&id) {
            Some(overlay) => overlay.state = state,
            None => tracing::debug!("Update for removed overlay {:?} ignored", id),
        }
    }

    fn request_redraw(&mut self) {
        tracing::trace!("Overlay redraw requested");
    }
}
