//! Scene access for the transform tools
//!
//! The tools never own scene geometry. They see it through two narrow
//! traits:
//!
//! - [`SceneAdapter`] resolves nodes into fragments and bounding boxes.
//! - [`FragmentStore`] reads and writes fragment transforms and receives the
//!   redraw notification after a batch of writes.
//!
//! [`InMemoryScene`] implements both for tests, the demo binary and hosts
//! without a renderer of their own.

mod memory;
mod model;

use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;

pub use memory::{InMemoryScene, SceneFile, SceneFileError};
pub use model::{Fragment, SceneModel, SceneNode};

use crate::bounds::BoundingBox;
use crate::error::SceneError;
use crate::fragment::FragmentTransform;
use crate::ids::{FragmentId, ModelId, NodeId};
use crate::selection::Selection;

/// Geometry and selection queries against the host scene graph
pub trait SceneAdapter {
    /// Root node of a model
    fn root_node(&self, model: ModelId) -> Result<NodeId, SceneError>;

    /// World translation applied to the whole model
    fn model_translation(&self, model: ModelId) -> Result<Vec3, SceneError>;

    /// `node` and all of its descendants, parents before children
    fn subtree_nodes(&self, model: ModelId, node: NodeId) -> Result<Vec<NodeId>, SceneError>;

    /// Fragments attached directly to `node`
    fn node_fragments(&self, model: ModelId, node: NodeId)
    -> Result<Vec<FragmentId>, SceneError>;

    /// Every fragment of a model
    fn model_fragments(&self, model: ModelId) -> Result<Vec<FragmentId>, SceneError>;

    /// World-space bounds of a single fragment
    fn fragment_bounds(
        &self,
        model: ModelId,
        fragment: FragmentId,
    ) -> Result<BoundingBox, SceneError>;

    /// Selections currently reported by the host
    fn current_selection(&self) -> Vec<Selection>;

    /// Fragments of `node` and its whole subtree.
    ///
    /// Fails with [`SceneError::NoGeometry`] when the subtree holds no fragment.
    fn resolve_descendants(
        &self,
        model: ModelId,
        node: NodeId,
    ) -> Result<Vec<FragmentId>, SceneError> {
        let mut fragments = Vec::new();
        for id in self.subtree_nodes(model, node)? {
            fragments.extend(self.node_fragments(model, id)?);
        }
        if fragments.is_empty() {
            return Err(SceneError::NoGeometry { model, node });
        }
        Ok(fragments)
    }

    /// World bounds of `node` including its subtree
    fn bounding_box(&self, model: ModelId, node: NodeId) -> Result<BoundingBox, SceneError> {
        let mut bounds = BoundingBox::empty();
        for fragment in self.resolve_descendants(model, node)? {
            bounds = bounds.union(&self.fragment_bounds(model, fragment)?);
        }
        Ok(bounds)
    }

    /// Union of the world bounds of the given fragments
    fn fragments_bounding_box(
        &self,
        model: ModelId,
        fragments: &[FragmentId],
    ) -> Result<BoundingBox, SceneError> {
        let mut bounds = BoundingBox::empty();
        for &fragment in fragments {
            bounds = bounds.union(&self.fragment_bounds(model, fragment)?);
        }
        Ok(bounds)
    }
}

/// Read/write access to fragment transforms
pub trait FragmentStore {
    /// Current transform of a fragment. Any transform still pending on the
    /// renderer side is resolved before it is returned.
    fn read_transform(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
    ) -> Result<FragmentTransform, SceneError>;

    /// Writes a transform back and marks the fragment dirty
    fn write_transform(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
        transform: FragmentTransform,
    ) -> Result<(), SceneError>;

    /// Requests a single scene redraw
    fn scene_updated(&mut self);
}

/// A scene that can both be queried and mutated
pub trait Scene: SceneAdapter + FragmentStore {}

impl<T: SceneAdapter + FragmentStore + ?Sized> Scene for T {}

pub type SharedScene = Arc<Mutex<dyn Scene + Send>>;
