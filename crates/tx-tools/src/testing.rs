//! Shared fixtures for the tool tests

use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;
use tx_core::{
    EventKind, FragmentId, InMemoryScene, ModelId, NodeId, SceneModel, Selection, SharedScene,
    TransformConfig, TransformEvent,
};
use tx_gizmo::{Camera, HeadlessRenderer, SharedRenderer};

use crate::context::{ToolContext, create_shared_camera};
use crate::tool::PointerEvent;

pub struct Fixture {
    pub scene: Arc<Mutex<InMemoryScene>>,
    pub renderer: Arc<Mutex<HeadlessRenderer>>,
    pub ctx: ToolContext,
    pub model: ModelId,
    pub nodes: Vec<NodeId>,
    pub fragments: Vec<FragmentId>,
    pub events: Arc<Mutex<Vec<TransformEvent>>>,
}

impl Fixture {
    pub fn select(&self, nodes: &[NodeId]) -> Vec<Selection> {
        self.scene.lock().select(self.model, nodes).unwrap()
    }

    pub fn select_all(&self) -> Vec<Selection> {
        self.select(&self.nodes)
    }

    /// Pointer event at the screen projection of a world point
    pub fn screen(&self, world: Vec3) -> PointerEvent {
        let screen = self.ctx.camera.lock().world_to_screen(world).unwrap();
        PointerEvent::new(screen.x, screen.y)
    }

    pub fn position(&self, index: usize) -> Vec3 {
        self.scene
            .lock()
            .transform(self.model, self.fragments[index])
            .unwrap()
            .position
    }

    pub fn events_of(&self, kind: EventKind) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    pub fn last_event(&self) -> Option<TransformEvent> {
        self.events.lock().last().cloned()
    }
}

/// One leaf node per position under the model root, a camera looking down
/// at the origin from slightly behind, and settling disabled.
pub fn fixture(positions: &[Vec3], config: TransformConfig) -> Fixture {
    let mut model = SceneModel::new("fixture");
    let root = model.root();
    let (nodes, fragments) = positions
        .iter()
        .enumerate()
        .map(|(i, p)| model.add_part(root, format!("part{i}"), *p).unwrap())
        .unzip();
    let mut memory = InMemoryScene::new();
    let model = memory.add_model(model);

    let scene = Arc::new(Mutex::new(memory));
    let renderer = Arc::new(Mutex::new(HeadlessRenderer::new()));
    let mut camera = Camera::new(800.0, 600.0);
    camera.position = Vec3::new(0.0, -4.0, 20.0);
    camera.target = Vec3::ZERO;
    camera.far = 100.0;

    let shared_scene: SharedScene = scene.clone();
    let shared_renderer: SharedRenderer = renderer.clone();
    let ctx = ToolContext::new(shared_scene, shared_renderer, create_shared_camera(camera))
        .with_config(config);

    let events = Arc::new(Mutex::new(Vec::new()));
    for kind in [
        EventKind::SelectionChanged,
        EventKind::TranslateChanged,
        EventKind::RotateChanged,
        EventKind::SelectionCleared,
    ] {
        let sink = events.clone();
        ctx.events
            .lock()
            .subscribe(kind, move |event: &TransformEvent| sink.lock().push(event.clone()));
    }

    Fixture {
        scene,
        renderer,
        ctx,
        model,
        nodes,
        fragments,
        events,
    }
}

pub fn test_config() -> TransformConfig {
    let mut config = TransformConfig::default();
    config.rotate.settle_delay_ms = 0;
    config
}

/// Parts at (-1, 0, 0) and (1, 0, 0)
pub fn pair_fixture() -> Fixture {
    fixture(&[-Vec3::X, Vec3::X], test_config())
}
