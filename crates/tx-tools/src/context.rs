//! Shared state handed to the tools

use std::sync::Arc;

use parking_lot::Mutex;
use tx_core::{SharedEventBus, SharedScene, TransformConfig, shared_event_bus};
use tx_gizmo::{Camera, SharedRenderer};

pub type SharedCamera = Arc<Mutex<Camera>>;

/// Create a new shared camera
pub fn create_shared_camera(camera: Camera) -> SharedCamera {
    Arc::new(Mutex::new(camera))
}

/// Context for the tools and the programmatic API
///
/// Cloning is cheap: every field but the config is a shared handle.
#[derive(Clone)]
pub struct ToolContext {
    pub scene: SharedScene,
    pub renderer: SharedRenderer,
    pub camera: SharedCamera,
    pub events: SharedEventBus,
    pub config: Arc<TransformConfig>,
}

impl ToolContext {
    pub fn new(scene: SharedScene, renderer: SharedRenderer, camera: SharedCamera) -> Self {
        Self {
            scene,
            renderer,
            camera,
            events: shared_event_bus(),
            config: Arc::new(TransformConfig::default()),
        }
    }

    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = Arc::new(config);
        self
    }
}
