//! Selection snapshots

use glam::Vec3;

use crate::config::SelectionScope;
use crate::error::SceneError;
use crate::ids::{FragmentId, ModelId, NodeId};
use crate::scene::SceneAdapter;

/// Nodes picked in one model, as handed to the programmatic API
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSelection {
    pub model: ModelId,
    pub node_ids: Vec<NodeId>,
}

impl NodeSelection {
    pub fn new(model: ModelId, node_ids: impl Into<Vec<NodeId>>) -> Self {
        Self {
            model,
            node_ids: node_ids.into(),
        }
    }
}

/// Snapshot of one model's selection for the duration of an interaction
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub model: ModelId,
    /// Logical nodes, in pick order
    pub node_ids: Vec<NodeId>,
    /// Fragments the nodes resolve to, without duplicates
    pub fragment_ids: Vec<FragmentId>,
    /// Pivot minus the model translation, filled in when the pivot is frozen
    pub world_offset: Vec3,
}

impl Selection {
    /// Resolve `node_ids` into their fragments.
    ///
    /// Nodes without geometry contribute nothing; unknown nodes are an error.
    pub fn resolve<S: SceneAdapter + ?Sized>(
        scene: &S,
        model: ModelId,
        node_ids: Vec<NodeId>,
    ) -> Result<Self, SceneError> {
        let mut fragment_ids: Vec<FragmentId> = Vec::new();
        for &node in &node_ids {
            match scene.resolve_descendants(model, node) {
                Ok(fragments) => {
                    for fragment in fragments {
                        if !fragment_ids.contains(&fragment) {
                            fragment_ids.push(fragment);
                        }
                    }
                }
                Err(SceneError::NoGeometry { .. }) => {
                    tracing::debug!("{} has no geometry, skipped", node);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Self {
            model,
            node_ids,
            fragment_ids,
            world_offset: Vec3::ZERO,
        })
    }

    /// Every fragment of the model, anchored at its root node
    pub fn whole_model<S: SceneAdapter + ?Sized>(
        scene: &S,
        model: ModelId,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            model,
            node_ids: vec![scene.root_node(model)?],
            fragment_ids: scene.model_fragments(model)?,
            world_offset: Vec3::ZERO,
        })
    }

    /// Apply a selection scope
    pub fn scoped<S: SceneAdapter + ?Sized>(
        self,
        scene: &S,
        scope: SelectionScope,
    ) -> Result<Self, SceneError> {
        match scope {
            SelectionScope::Picked => Ok(self),
            SelectionScope::WholeModel => Self::whole_model(scene, self.model),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragment_ids.is_empty()
    }

    pub fn with_world_offset(mut self, world_offset: Vec3) -> Self {
        self.world_offset = world_offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{InMemoryScene, SceneModel};

    #[test]
    fn test_resolve_deduplicates_nested_nodes() {
        let mut model = SceneModel::new("m");
        let root = model.root();
        let arm = model.add_node(root, "arm").unwrap();
        let (hand, _) = model.add_part(arm, "hand", Vec3::X).unwrap();
        model.add_part(arm, "elbow", Vec3::Y).unwrap();
        let mut scene = InMemoryScene::new();
        let id = scene.add_model(model);

        let selection = Selection::resolve(&scene, id, vec![arm, hand]).unwrap();
        assert_eq!(selection.fragment_ids.len(), 2);
        assert_eq!(selection.node_ids, vec![arm, hand]);
    }

    #[test]
    fn test_empty_nodes_resolve_to_empty_selection() {
        let mut model = SceneModel::new("m");
        let root = model.root();
        let empty = model.add_node(root, "empty").unwrap();
        let mut scene = InMemoryScene::new();
        let id = scene.add_model(model);

        let selection = Selection::resolve(&scene, id, vec![empty]).unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_whole_model_scope() {
        let mut model = SceneModel::new("m");
        let root = model.root();
        let (a, _) = model.add_part(root, "a", Vec3::X).unwrap();
        model.add_part(root, "b", Vec3::Y).unwrap();
        let mut scene = InMemoryScene::new();
        let id = scene.add_model(model);

        let picked = Selection::resolve(&scene, id, vec![a]).unwrap();
        let widened = picked.scoped(&scene, SelectionScope::WholeModel).unwrap();
        assert_eq!(widened.node_ids, vec![root]);
        assert_eq!(widened.fragment_ids.len(), 2);
    }
}
