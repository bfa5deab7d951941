//! Error types

use crate::ids::{FragmentId, ModelId, NodeId};

/// Lookups against the scene graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("Unknown model: {0}")]
    UnknownModel(ModelId),
    #[error("Unknown node {node} in model {model}")]
    UnknownNode { model: ModelId, node: NodeId },
    #[error("Unknown fragment {fragment} in model {model}")]
    UnknownFragment { model: ModelId, fragment: FragmentId },
    #[error("No geometry, invalid node id? ({node} in model {model})")]
    NoGeometry { model: ModelId, node: NodeId },
    #[error("Node {node} in model {model} is linked twice or outside the root's tree")]
    MalformedTree { model: ModelId, node: NodeId },
}

/// Programmatic transform failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("Selection is empty")]
    EmptySelection,
    #[error("Non-finite {0} vector")]
    NonFiniteVector(&'static str),
    #[error("Rotation axis has zero length")]
    ZeroAxis,
    #[error("Non-finite rotation angle")]
    NonFiniteAngle,
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("{failed} of {total} sub-operations failed")]
    Partial { failed: usize, total: usize },
}

/// Configuration file errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
