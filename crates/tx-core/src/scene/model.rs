//! Scene model: a node tree with fragments hanging off its nodes

use std::collections::{BTreeMap, BTreeSet};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::error::SceneError;
use crate::fragment::FragmentTransform;
use crate::ids::{FragmentId, ModelId, NodeId};

fn unit_bounds() -> BoundingBox {
    BoundingBox::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
}

/// Logical node of the model tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub fragments: Vec<FragmentId>,
}

/// Renderable fragment owned by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub node: NodeId,
    pub transform: FragmentTransform,
    /// Bounds in the fragment's local frame
    #[serde(default = "unit_bounds")]
    pub local_bounds: BoundingBox,
    /// Transform staged by the renderer but not yet resolved
    #[serde(skip)]
    pub(crate) pending: Option<FragmentTransform>,
}

impl Fragment {
    /// World bounds at the current transform
    pub fn world_bounds(&self) -> BoundingBox {
        let transform = self.pending.unwrap_or(self.transform);
        self.local_bounds
            .placed(transform.position, transform.orientation)
    }
}

/// A loaded model (scene graph)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneModel {
    #[serde(default)]
    pub id: ModelId,
    pub name: String,
    /// World translation of the whole model
    #[serde(default)]
    pub translation: Vec3,
    root: NodeId,
    nodes: BTreeMap<NodeId, SceneNode>,
    #[serde(default)]
    fragments: Vec<Fragment>,
}

impl SceneModel {
    /// Create a model holding only a root node
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let root = NodeId(1);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            SceneNode {
                name: name.clone(),
                ..Default::default()
            },
        );
        Self {
            id: ModelId::new(),
            name,
            translation: Vec3::ZERO,
            root,
            nodes,
            fragments: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a child node under `parent`
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        let next = self.nodes.keys().next_back().map_or(1, |id| id.0 + 1);
        let id = NodeId(next);
        self.node_mut(parent)?.children.push(id);
        self.nodes.insert(
            id,
            SceneNode {
                name: name.into(),
                parent: Some(parent),
                ..Default::default()
            },
        );
        Ok(id)
    }

    /// Attach a fragment to `node`
    pub fn add_fragment(
        &mut self,
        node: NodeId,
        transform: FragmentTransform,
        local_bounds: BoundingBox,
    ) -> Result<FragmentId, SceneError> {
        let id = FragmentId(self.fragments.len() as u32);
        self.node_mut(node)?.fragments.push(id);
        self.fragments.push(Fragment {
            node,
            transform,
            local_bounds,
            pending: None,
        });
        Ok(id)
    }

    /// Convenience: a leaf node under `parent` with one unit-sized fragment at `position`
    pub fn add_part(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        position: Vec3,
    ) -> Result<(NodeId, FragmentId), SceneError> {
        let node = self.add_node(parent, name)?;
        let fragment = self.add_fragment(
            node,
            FragmentTransform::new(position, Quat::IDENTITY),
            unit_bounds(),
        )?;
        Ok((node, fragment))
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::UnknownNode {
            model: self.id,
            node: id,
        })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        let model = self.id;
        self.nodes
            .get_mut(&id)
            .ok_or(SceneError::UnknownNode { model, node: id })
    }

    pub fn fragment(&self, id: FragmentId) -> Result<&Fragment, SceneError> {
        self.fragments
            .get(id.index())
            .ok_or(SceneError::UnknownFragment {
                model: self.id,
                fragment: id,
            })
    }

    pub(crate) fn fragment_mut(&mut self, id: FragmentId) -> Result<&mut Fragment, SceneError> {
        let model = self.id;
        self.fragments
            .get_mut(id.index())
            .ok_or(SceneError::UnknownFragment {
                model,
                fragment: id,
            })
    }

    pub fn fragment_ids(&self) -> impl Iterator<Item = FragmentId> + '_ {
        (0..self.fragments.len()).map(|i| FragmentId(i as u32))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// `node` and every descendant in pre-order.
    ///
    /// Walks an explicit stack so deep trees cannot exhaust the call stack.
    pub fn subtree(&self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        self.node(node)?;
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            let current = self.node(id)?;
            stack.extend(current.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Rebuild parent links and fragment ownership after deserialization.
    ///
    /// Children lists must form a tree: every child exists, is listed once,
    /// is not the root, and hangs below the root.
    pub(crate) fn relink(&mut self) -> Result<(), SceneError> {
        let model = self.id;
        let links: Vec<(NodeId, NodeId)> = self
            .nodes
            .iter()
            .flat_map(|(id, node)| node.children.iter().map(move |child| (*id, *child)))
            .collect();

        let mut linked = BTreeSet::new();
        for &(_, child) in &links {
            if !self.nodes.contains_key(&child) {
                return Err(SceneError::UnknownNode { model, node: child });
            }
            if child == self.root || !linked.insert(child) {
                return Err(SceneError::MalformedTree { model, node: child });
            }
        }
        // With one parent per node, a cycle can only live outside the root's tree
        let reached: BTreeSet<NodeId> = self.subtree(self.root)?.into_iter().collect();
        if let Some(&node) = linked.iter().find(|id| !reached.contains(id)) {
            return Err(SceneError::MalformedTree { model, node });
        }

        for (parent, child) in links {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = Some(parent);
            }
        }
        for (index, fragment) in self.fragments.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&fragment.node) {
                let id = FragmentId(index as u32);
                if !node.fragments.contains(&id) {
                    node.fragments.push(id);
                }
            }
        }
        Ok(())
    }
}
