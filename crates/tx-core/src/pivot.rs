//! Pivot and per-fragment offset tracking
//!
//! The pivot and every fragment's offset from it are captured once, when a
//! selection arrives, and stay frozen until the next selection event. Both
//! tools read them; nothing else writes them. Recomputing the pivot while a
//! drag moves the fragments would make rotations non-rigid.

use glam::Vec3;

use crate::bounds::BoundingBox;
use crate::error::SceneError;
use crate::ids::FragmentId;
use crate::scene::Scene;
use crate::selection::Selection;

/// Which bounds the pivot is the center of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotSource {
    /// Union of the selected nodes' bounding boxes (translate)
    NodeBounds,
    /// Union of the selected fragments' world bounds (rotate)
    FragmentBounds,
}

/// Pivot state captured for one selection
#[derive(Debug, Clone)]
pub struct FrozenPivot {
    selection: Selection,
    pivot: Vec3,
    bounds: BoundingBox,
    /// `pivot - position` per fragment, in selection order
    offsets: Vec<(FragmentId, Vec3)>,
}

impl FrozenPivot {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn offsets(&self) -> &[(FragmentId, Vec3)] {
        &self.offsets
    }

    pub fn offset(&self, fragment: FragmentId) -> Option<Vec3> {
        self.offsets
            .iter()
            .find(|(id, _)| *id == fragment)
            .map(|(_, offset)| *offset)
    }
}

/// Owner of the frozen pivot
#[derive(Debug, Default)]
pub struct PivotTracker {
    frozen: Option<FrozenPivot>,
}

impl PivotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture pivot and offsets for a fresh selection.
    ///
    /// An empty selection is treated as no selection: the tracker is cleared
    /// and `None` is returned.
    pub fn on_selection_changed<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        selection: Selection,
        source: PivotSource,
    ) -> Result<Option<&FrozenPivot>, SceneError> {
        self.frozen = None;
        if selection.is_empty() {
            tracing::debug!("Selection resolved to no fragments, pivot cleared");
            return Ok(None);
        }

        let bounds = match source {
            PivotSource::NodeBounds => {
                let mut bounds = BoundingBox::empty();
                for &node in &selection.node_ids {
                    match scene.bounding_box(selection.model, node) {
                        Ok(node_bounds) => bounds = bounds.union(&node_bounds),
                        Err(SceneError::NoGeometry { .. }) => {}
                        Err(e) => return Err(e),
                    }
                }
                bounds
            }
            PivotSource::FragmentBounds => {
                scene.fragments_bounding_box(selection.model, &selection.fragment_ids)?
            }
        };
        if !bounds.is_valid() {
            return Ok(None);
        }

        let pivot = bounds.center();
        let mut offsets = Vec::with_capacity(selection.fragment_ids.len());
        for &fragment in &selection.fragment_ids {
            let transform = scene.read_transform(selection.model, fragment)?;
            offsets.push((fragment, pivot - transform.position));
        }
        let world_offset = pivot - scene.model_translation(selection.model)?;

        tracing::debug!(
            "Pivot frozen at {:?} for {} fragments",
            pivot,
            offsets.len()
        );
        self.frozen = Some(FrozenPivot {
            selection: selection.with_world_offset(world_offset),
            pivot,
            bounds,
            offsets,
        });
        Ok(self.frozen.as_ref())
    }

    /// Drop pivot and offsets. Returns true if something was being tracked,
    /// meaning the gizmo has to be torn down.
    pub fn on_selection_cleared(&mut self) -> bool {
        self.frozen.take().is_some()
    }

    pub fn frozen(&self) -> Option<&FrozenPivot> {
        self.frozen.as_ref()
    }

    pub fn pivot(&self) -> Option<Vec3> {
        self.frozen.as_ref().map(FrozenPivot::pivot)
    }

    pub fn is_tracking(&self) -> bool {
        self.frozen.is_some()
    }
}
