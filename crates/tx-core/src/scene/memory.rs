//! In-memory scene implementing both adapter traits

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::model::SceneModel;
use super::{FragmentStore, SceneAdapter};
use crate::bounds::BoundingBox;
use crate::error::SceneError;
use crate::fragment::FragmentTransform;
use crate::ids::{FragmentId, ModelId, NodeId};
use crate::selection::Selection;

/// On-disk scene description (RON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    pub models: Vec<SceneModel>,
}

/// Scene file errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneFileError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid node tree: {0}")]
    Tree(#[from] SceneError),
}

/// Scene held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryScene {
    models: BTreeMap<ModelId, SceneModel>,
    selection: Vec<Selection>,
    dirty: BTreeSet<(ModelId, FragmentId)>,
    redraw_requests: usize,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model, returns its id
    pub fn add_model(&mut self, model: SceneModel) -> ModelId {
        let id = model.id;
        tracing::debug!("Adding model '{}' ({})", model.name, id);
        self.models.insert(id, model);
        id
    }

    pub fn model(&self, id: ModelId) -> Result<&SceneModel, SceneError> {
        self.models.get(&id).ok_or(SceneError::UnknownModel(id))
    }

    pub fn model_mut(&mut self, id: ModelId) -> Result<&mut SceneModel, SceneError> {
        self.models.get_mut(&id).ok_or(SceneError::UnknownModel(id))
    }

    pub fn models(&self) -> impl Iterator<Item = &SceneModel> {
        self.models.values()
    }

    /// Select nodes of one model, replacing the current selection.
    ///
    /// Returns the new selection list (what a selection-changed event carries).
    pub fn select(
        &mut self,
        model: ModelId,
        nodes: &[NodeId],
    ) -> Result<Vec<Selection>, SceneError> {
        if nodes.is_empty() {
            self.selection.clear();
            return Ok(Vec::new());
        }
        let selection = Selection::resolve(&*self, model, nodes.to_vec())?;
        self.selection = vec![selection];
        Ok(self.selection.clone())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Stage a transform the way a renderer-side animation cache would.
    /// The next read resolves it.
    pub fn stage_transform(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
        transform: FragmentTransform,
    ) -> Result<(), SceneError> {
        self.model_mut(model)?.fragment_mut(fragment)?.pending = Some(transform);
        Ok(())
    }

    /// Committed transform without resolving pending state
    pub fn transform(
        &self,
        model: ModelId,
        fragment: FragmentId,
    ) -> Result<FragmentTransform, SceneError> {
        Ok(self.model(model)?.fragment(fragment)?.transform)
    }

    /// Fragments written since the last call
    pub fn take_dirty(&mut self) -> Vec<(ModelId, FragmentId)> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    pub fn redraw_requests(&self) -> usize {
        self.redraw_requests
    }

    /// Load a scene from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SceneFileError::Io(e.to_string()))?;
        Self::load_from_str(&content)
    }

    pub fn load_from_str(content: &str) -> Result<Self, SceneFileError> {
        let file: SceneFile =
            ron::from_str(content).map_err(|e| SceneFileError::Deserialize(e.to_string()))?;
        let mut scene = Self::new();
        for mut model in file.models {
            model.relink()?;
            scene.add_model(model);
        }
        Ok(scene)
    }

    /// Save all models to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneFileError> {
        let file = SceneFile {
            models: self.models.values().cloned().collect(),
        };
        let content = ron::ser::to_string_pretty(&file, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneFileError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SceneFileError::Io(e.to_string()))
    }
}

impl SceneAdapter for InMemoryScene {
    fn root_node(&self, model: ModelId) -> Result<NodeId, SceneError> {
        Ok(self.model(model)?.root())
    }

    fn model_translation(&self, model: ModelId) -> Result<Vec3, SceneError> {
        Ok(self.model(model)?.translation)
    }

    fn subtree_nodes(&self, model: ModelId, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        self.model(model)?.subtree(node)
    }

    fn node_fragments(
        &self,
        model: ModelId,
        node: NodeId,
    ) -> Result<Vec<FragmentId>, SceneError> {
        Ok(self.model(model)?.node(node)?.fragments.clone())
    }

    fn model_fragments(&self, model: ModelId) -> Result<Vec<FragmentId>, SceneError> {
        Ok(self.model(model)?.fragment_ids().collect())
    }

    fn fragment_bounds(
        &self,
        model: ModelId,
        fragment: FragmentId,
    ) -> Result<BoundingBox, SceneError> {
        Ok(self.model(model)?.fragment(fragment)?.world_bounds())
    }

    fn current_selection(&self) -> Vec<Selection> {
        self.selection.clone()
    }
}

impl FragmentStore for InMemoryScene {
    fn read_transform(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
    ) -> Result<FragmentTransform, SceneError> {
        let frag = self.model_mut(model)?.fragment_mut(fragment)?;
        if let Some(pending) = frag.pending.take() {
            frag.transform = pending;
        }
        Ok(frag.transform)
    }

    fn write_transform(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
        transform: FragmentTransform,
    ) -> Result<(), SceneError> {
        let frag = self.model_mut(model)?.fragment_mut(fragment)?;
        frag.pending = None;
        frag.transform = transform;
        self.dirty.insert((model, fragment));
        Ok(())
    }

    fn scene_updated(&mut self) {
        self.redraw_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_part_scene() -> (InMemoryScene, ModelId, NodeId, NodeId) {
        let mut model = SceneModel::new("pair");
        let root = model.root();
        let (a, _) = model.add_part(root, "a", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let (b, _) = model.add_part(root, "b", Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let mut scene = InMemoryScene::new();
        let id = scene.add_model(model);
        (scene, id, a, b)
    }

    #[test]
    fn test_resolve_descendants_and_bounds() {
        let (scene, model, a, _) = two_part_scene();
        let root = scene.root_node(model).unwrap();
        assert_eq!(scene.resolve_descendants(model, root).unwrap().len(), 2);
        assert_eq!(scene.resolve_descendants(model, a).unwrap().len(), 1);

        let bounds = scene.bounding_box(model, root).unwrap();
        assert!(bounds.center().abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(bounds.size().abs_diff_eq(Vec3::new(3.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn test_node_without_geometry_is_rejected() {
        let (mut scene, model, _, _) = two_part_scene();
        let root = scene.root_node(model).unwrap();
        let empty = scene.model_mut(model).unwrap().add_node(root, "empty").unwrap();
        let err = scene.resolve_descendants(model, empty).unwrap_err();
        assert_eq!(err, SceneError::NoGeometry { model, node: empty });
        assert!(scene.bounding_box(model, empty).is_err());
    }

    #[test]
    fn test_read_resolves_pending_transform() {
        let (mut scene, model, _, _) = two_part_scene();
        let frag = FragmentId(0);
        let staged = FragmentTransform::from_position(Vec3::new(7.0, 0.0, 0.0));
        scene.stage_transform(model, frag, staged).unwrap();
        assert_eq!(scene.transform(model, frag).unwrap().position.x, 1.0);
        assert_eq!(scene.read_transform(model, frag).unwrap(), staged);
        assert_eq!(scene.transform(model, frag).unwrap(), staged);
    }

    #[test]
    fn test_write_marks_dirty() {
        let (mut scene, model, _, _) = two_part_scene();
        scene
            .write_transform(model, FragmentId(1), FragmentTransform::default())
            .unwrap();
        assert_eq!(scene.take_dirty(), vec![(model, FragmentId(1))]);
        assert!(scene.take_dirty().is_empty());
    }

    #[test]
    fn test_select_and_clear() {
        let (mut scene, model, a, b) = two_part_scene();
        let selections = scene.select(model, &[a, b]).unwrap();
        assert_eq!(selections[0].fragment_ids.len(), 2);
        assert_eq!(scene.current_selection().len(), 1);
        assert!(scene.select(model, &[]).unwrap().is_empty());
        assert!(scene.current_selection().is_empty());
    }

    #[test]
    fn test_scene_file_round_trip() {
        let (scene, model, _, _) = two_part_scene();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");
        scene.save(&path).unwrap();

        let loaded = InMemoryScene::load(&path).unwrap();
        let root = loaded.root_node(model).unwrap();
        assert_eq!(loaded.resolve_descendants(model, root).unwrap().len(), 2);
    }

    fn scene_with_children(root: &[u32], a: &[u32]) -> String {
        let ids = |children: &[u32]| {
            children
                .iter()
                .map(|id| format!("NodeId({id})"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            r#"(models: [(
                name: "loop",
                root: NodeId(1),
                nodes: {{
                    NodeId(1): (name: "root", children: [{}]),
                    NodeId(2): (name: "a", children: [{}]),
                    NodeId(3): (name: "b"),
                }},
            )])"#,
            ids(root),
            ids(a)
        )
    }

    #[test]
    fn test_scene_file_tree_is_validated() {
        let scene = InMemoryScene::load_from_str(&scene_with_children(&[2, 3], &[])).unwrap();
        let model = scene.models().next().unwrap();
        assert_eq!(model.subtree(model.root()).unwrap().len(), 3);
        assert_eq!(model.node(NodeId(2)).unwrap().parent, Some(NodeId(1)));

        // Back edge to the root
        let err = InMemoryScene::load_from_str(&scene_with_children(&[2], &[1])).unwrap_err();
        assert!(matches!(err, SceneFileError::Tree(SceneError::MalformedTree { .. })));
        // Same child listed twice
        let err = InMemoryScene::load_from_str(&scene_with_children(&[2, 3], &[3])).unwrap_err();
        assert!(matches!(err, SceneFileError::Tree(SceneError::MalformedTree { .. })));
        // Unknown child
        let err = InMemoryScene::load_from_str(&scene_with_children(&[2, 9], &[])).unwrap_err();
        assert!(matches!(err, SceneFileError::Tree(SceneError::UnknownNode { .. })));
    }

    #[test]
    fn test_detached_cycle_is_rejected() {
        let content = r#"(models: [(
            name: "loop",
            root: NodeId(1),
            nodes: {
                NodeId(1): (name: "root"),
                NodeId(2): (name: "a", children: [NodeId(3)]),
                NodeId(3): (name: "b", children: [NodeId(2)]),
            },
        )])"#;
        let err = InMemoryScene::load_from_str(content).unwrap_err();
        assert!(matches!(err, SceneFileError::Tree(SceneError::MalformedTree { .. })));
    }
}
