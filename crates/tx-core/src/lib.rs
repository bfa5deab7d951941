//! Transform core
//!
//! Scene-side plumbing shared by the translate and rotate tools.
//!
//! # Module Structure
//!
//! ```text
//! tx-core/
//! ├── ids.rs          # ModelId, NodeId, FragmentId
//! ├── bounds.rs       # Axis-aligned bounding boxes
//! ├── fragment.rs     # Fragment transforms (position + orientation)
//! ├── scene/          # Adapter traits and the in-memory scene
//! ├── selection.rs    # Selection snapshots and scopes
//! ├── applier.rs      # Batched fragment transform writes
//! ├── pivot.rs        # Pivot and per-fragment offset tracking
//! ├── events.rs       # Typed event bus
//! ├── config.rs       # Tool configuration (RON)
//! └── error.rs        # Error types
//! ```

pub mod applier;
pub mod bounds;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fragment;
pub mod ids;
pub mod pivot;
pub mod scene;
pub mod selection;

pub use applier::FragmentApplier;
pub use bounds::BoundingBox;
pub use config::{
    GizmoConfig, Modifier, RotateConfig, SelectionScope, TransformConfig, TranslateConfig,
};
pub use error::{ConfigError, SceneError, TransformError};
pub use events::{
    EventBus, EventKind, SharedEventBus, SubscriptionId, TransformEvent, publish,
    shared_event_bus,
};
pub use fragment::FragmentTransform;
pub use ids::{FragmentId, ModelId, NodeId};
pub use pivot::{FrozenPivot, PivotSource, PivotTracker};
pub use scene::{
    FragmentStore, InMemoryScene, Scene, SceneAdapter, SceneFileError, SceneModel, SceneNode,
    SharedScene,
};
pub use selection::{NodeSelection, Selection};
