//! Translate tool
//!
//! A picked selection freezes a pivot at the center of the selected nodes'
//! bounds and records each fragment's offset from it. The handle sits at the
//! pivot; while it is dragged every fragment is placed at `anchor - offset`,
//! so the fragments never drift relative to each other no matter how many
//! move events arrive.
//!
//! The free functions [`apply_relative`] and [`apply_absolute`] are the
//! programmatic counterparts, used by [`crate::api::TransformApi`].

use std::collections::BTreeSet;

use glam::Vec3;
use tx_core::{
    FragmentApplier, FragmentId, NodeSelection, PivotSource, PivotTracker, Scene, SceneError,
    Selection, TransformError, TransformEvent, publish,
};
use tx_gizmo::{GizmoAxis, TranslateHandle};

use crate::context::ToolContext;
use crate::tool::{PointerEvent, Tool};

pub const TRANSLATE_TOOL: &str = "transform-translate";

/// Interaction state, independent of whether the tool is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslateState {
    /// No selection tracked
    #[default]
    Inactive,
    /// Selection tracked, handle shown
    Armed,
    /// Handle grabbed
    Dragging,
}

pub struct TranslateTool {
    ctx: ToolContext,
    active: bool,
    state: TranslateState,
    tracker: PivotTracker,
    handle: TranslateHandle,
}

impl TranslateTool {
    pub fn new(ctx: ToolContext) -> Self {
        let handle = TranslateHandle::new(&ctx.config);
        Self {
            ctx,
            active: false,
            state: TranslateState::Inactive,
            tracker: PivotTracker::new(),
            handle,
        }
    }

    pub fn state(&self) -> TranslateState {
        self.state
    }

    pub fn tracker(&self) -> &PivotTracker {
        &self.tracker
    }

    pub fn handle(&self) -> &TranslateHandle {
        &self.handle
    }

    fn select(&mut self, selection: Selection) {
        let frozen = {
            let mut scene = self.ctx.scene.lock();
            let scoped = selection.scoped(&*scene, self.ctx.config.selection_scope);
            match scoped.and_then(|selection| {
                self.tracker
                    .on_selection_changed(&mut *scene, selection, PivotSource::NodeBounds)
                    .map(|frozen| frozen.cloned())
            }) {
                Ok(frozen) => frozen,
                Err(e) => {
                    tracing::warn!("Selection ignored: {}", e);
                    None
                }
            }
        };
        let Some(frozen) = frozen else {
            self.clear_selection();
            return;
        };

        {
            let mut renderer = self.ctx.renderer.lock();
            self.handle
                .attach(&mut *renderer, frozen.pivot(), frozen.bounds().max_extent());
            renderer.request_redraw();
        }
        self.state = TranslateState::Armed;
        publish(
            &self.ctx.events,
            &TransformEvent::SelectionChanged(frozen.selection().clone()),
        );
    }

    fn clear_selection(&mut self) {
        let tracked = self.tracker.on_selection_cleared();
        if self.handle.is_attached() {
            let mut renderer = self.ctx.renderer.lock();
            self.handle.detach(&mut *renderer);
            renderer.request_redraw();
        }
        self.state = TranslateState::Inactive;
        if tracked {
            publish(&self.ctx.events, &TransformEvent::SelectionCleared);
        }
    }

    /// Place every tracked fragment at `anchor - offset`
    fn apply_drag(&mut self, anchor: Vec3) {
        let Some(frozen) = self.tracker.frozen() else {
            return;
        };
        let model = frozen.selection().model;
        {
            let mut scene = self.ctx.scene.lock();
            let mut applier = FragmentApplier::new(&mut *scene);
            for &(fragment, offset) in frozen.offsets() {
                if let Err(e) = applier.set_position(model, fragment, anchor - offset) {
                    tracing::warn!("Failed to move {}: {}", fragment, e);
                }
            }
            applier.finish();
        }
        publish(
            &self.ctx.events,
            &TransformEvent::TranslateChanged {
                model,
                translation: anchor - frozen.pivot(),
                pivot: frozen.pivot(),
            },
        );
    }

    fn ray(&self, event: &PointerEvent) -> (tx_gizmo::Ray, Vec3) {
        let camera = self.ctx.camera.lock();
        (camera.screen_to_ray(event.x, event.y), camera.forward())
    }
}

impl Tool for TranslateTool {
    fn name(&self) -> &'static str {
        TRANSLATE_TOOL
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self) {
        tracing::info!("Translate tool activated");
        self.active = true;
        self.state = TranslateState::Inactive;
    }

    fn deactivate(&mut self) {
        tracing::info!("Translate tool deactivated");
        {
            let mut renderer = self.ctx.renderer.lock();
            self.handle.detach(&mut *renderer);
            renderer.request_redraw();
        }
        self.tracker.on_selection_cleared();
        self.state = TranslateState::Inactive;
        self.active = false;
    }

    fn handle_button_down(&mut self, event: &PointerEvent) -> bool {
        if self.state != TranslateState::Armed {
            return false;
        }
        let (ray, forward) = self.ray(event);
        let axis = self
            .handle
            .begin_drag(&mut *self.ctx.renderer.lock(), &ray, forward);
        if axis == GizmoAxis::None {
            return false;
        }
        self.state = TranslateState::Dragging;
        true
    }

    fn handle_button_up(&mut self, _event: &PointerEvent) -> bool {
        if self.state != TranslateState::Dragging {
            return false;
        }
        self.handle.end_drag(&mut *self.ctx.renderer.lock());
        // Offsets stay as captured: the next drag starts from the new anchor
        self.state = TranslateState::Armed;
        true
    }

    fn handle_mouse_move(&mut self, event: &PointerEvent) -> bool {
        let (ray, _) = self.ray(event);
        match self.state {
            TranslateState::Dragging => {
                let anchor = self.handle.drag_to(&mut *self.ctx.renderer.lock(), &ray);
                if let Some(anchor) = anchor {
                    self.apply_drag(anchor);
                }
                true
            }
            TranslateState::Armed => {
                self.handle.hover(&mut *self.ctx.renderer.lock(), &ray);
                false
            }
            TranslateState::Inactive => false,
        }
    }

    fn handle_selection_changed(&mut self, selections: &[Selection]) -> bool {
        if !self.active {
            return false;
        }
        if self.state == TranslateState::Dragging {
            self.handle.end_drag(&mut *self.ctx.renderer.lock());
        }
        match selections.first() {
            Some(selection) => self.select(selection.clone()),
            None => self.clear_selection(),
        }
        false
    }
}

fn validate(selection: &NodeSelection, vector: Vec3) -> Result<(), TransformError> {
    if selection.node_ids.is_empty() {
        return Err(TransformError::EmptySelection);
    }
    if !vector.is_finite() {
        return Err(TransformError::NonFiniteVector("translation"));
    }
    Ok(())
}

/// Add `translation` to every fragment under the selected nodes.
///
/// Everything is resolved before the first write, so a lookup failure leaves
/// the scene untouched. Returns the number of fragments moved.
pub fn apply_relative<S: Scene + ?Sized>(
    applier: &mut FragmentApplier<'_, S>,
    selection: &NodeSelection,
    translation: Vec3,
) -> Result<usize, TransformError> {
    validate(selection, translation)?;

    let model = selection.model;
    let mut fragments: Vec<FragmentId> = Vec::new();
    for &node in &selection.node_ids {
        for fragment in applier.store().resolve_descendants(model, node)? {
            if !fragments.contains(&fragment) {
                fragments.push(fragment);
            }
        }
    }

    for &fragment in &fragments {
        applier.translate(model, fragment, translation)?;
    }
    tracing::debug!(
        "Translated {} fragments by {:?}",
        fragments.len(),
        translation
    );
    Ok(fragments.len())
}

/// Move every node under the selection so that its own subtree bounds are
/// centered at `target`.
///
/// Each node's direct fragments are shifted by `target - center`, where
/// `center` is that node's subtree bounds center before anything moved.
pub fn apply_absolute<S: Scene + ?Sized>(
    applier: &mut FragmentApplier<'_, S>,
    selection: &NodeSelection,
    target: Vec3,
) -> Result<usize, TransformError> {
    validate(selection, target)?;

    let model = selection.model;
    let mut visited = BTreeSet::new();
    let mut moves: Vec<(FragmentId, Vec3)> = Vec::new();
    for &root in &selection.node_ids {
        // Rejects roots without any geometry
        applier.store().resolve_descendants(model, root)?;

        for node in applier.store().subtree_nodes(model, root)? {
            if !visited.insert(node) {
                continue;
            }
            let direct = applier.store().node_fragments(model, node)?;
            if direct.is_empty() {
                continue;
            }
            let center = match applier.store().bounding_box(model, node) {
                Ok(bounds) => bounds.center(),
                Err(SceneError::NoGeometry { .. }) => continue,
                Err(e) => return Err(e.into()),
            };
            let delta = target - center;
            moves.extend(direct.into_iter().map(|fragment| (fragment, delta)));
        }
    }

    for &(fragment, delta) in &moves {
        applier.translate(model, fragment, delta)?;
    }
    tracing::debug!("Placed {} fragments at {:?}", moves.len(), target);
    Ok(moves.len())
}
