//! Rotate tool
//!
//! Picking a selection freezes the pivot at the center of the selected
//! fragments' bounds and shows three rings around it. Dragging a ring
//! rotates every fragment about the frozen pivot by the angle swept since
//! the previous move; holding the free-rotate modifier and dragging anywhere
//! tumbles the selection about an axis perpendicular to the pointer motion.
//!
//! While a ring is held, and for a short settle delay after it is released,
//! new selections coming from the host are rejected: the click that ends
//! a drag would otherwise re-pick whatever lies under the pointer. Clearing
//! the selection always goes through and tears the gizmo down.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use glam::{Quat, Vec2, Vec3};
use tx_core::constants::{FIT_VIEW_MARGIN, VECTOR_EPSILON};
use tx_core::{
    FragmentApplier, Modifier, PivotSource, PivotTracker, Selection, TransformEvent, publish,
};
use tx_gizmo::{Ray, RotateGizmo};

use crate::context::ToolContext;
use crate::tool::{Key, PointerButton, PointerEvent, Tool};

pub const ROTATE_TOOL: &str = "transform-rotate";

pub struct RotateTool {
    ctx: ToolContext,
    active: bool,
    tracker: PivotTracker,
    gizmo: Option<RotateGizmo>,
    modifiers: HashSet<Modifier>,
    /// Last pointer position of a free rotation
    free_drag: Option<Vec2>,
    settle_until: Option<Instant>,
}

impl RotateTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            ctx,
            active: false,
            tracker: PivotTracker::new(),
            gizmo: None,
            modifiers: HashSet::new(),
            free_drag: None,
            settle_until: None,
        }
    }

    pub fn gizmo(&self) -> Option<&RotateGizmo> {
        self.gizmo.as_ref()
    }

    pub fn tracker(&self) -> &PivotTracker {
        &self.tracker
    }

    /// A ring is held or was released less than the settle delay ago
    pub fn is_engaged(&self) -> bool {
        self.gizmo.as_ref().is_some_and(RotateGizmo::is_engaged)
            || self
                .settle_until
                .is_some_and(|deadline| Instant::now() < deadline)
    }

    pub fn is_free_dragging(&self) -> bool {
        self.free_drag.is_some()
    }

    fn ray(&self, event: &PointerEvent) -> Ray {
        self.ctx.camera.lock().screen_to_ray(event.x, event.y)
    }

    fn select(&mut self, selection: Selection) {
        let frozen = {
            let mut scene = self.ctx.scene.lock();
            let scoped = selection.scoped(&*scene, self.ctx.config.selection_scope);
            match scoped.and_then(|selection| {
                self.tracker
                    .on_selection_changed(&mut *scene, selection, PivotSource::FragmentBounds)
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

        let world_up = self.ctx.camera.lock().world_up();
        let size = frozen.bounds().max_extent() * self.ctx.config.gizmo.size_factor;
        {
            let mut renderer = self.ctx.renderer.lock();
            if let Some(mut old) = self.gizmo.take() {
                old.detach(&mut *renderer);
            }
            let mut gizmo =
                RotateGizmo::new(&self.ctx.config.gizmo, frozen.pivot(), size, world_up);
            gizmo.attach(&mut *renderer);
            renderer.request_redraw();
            self.gizmo = Some(gizmo);
        }

        if self.ctx.config.fit_view_on_select {
            let bounds = frozen.bounds().expand_by_scalar(FIT_VIEW_MARGIN);
            self.ctx.camera.lock().fit_bounds(&bounds);
        }

        publish(
            &self.ctx.events,
            &TransformEvent::SelectionChanged(frozen.selection().clone()),
        );
    }

    /// Drop the selection and the gizmo. Returns true if a selection was tracked.
    fn teardown(&mut self) -> bool {
        let tracked = self.tracker.on_selection_cleared();
        self.free_drag = None;
        self.settle_until = None;
        if let Some(mut gizmo) = self.gizmo.take() {
            let mut renderer = self.ctx.renderer.lock();
            gizmo.detach(&mut *renderer);
            renderer.request_redraw();
        }
        tracked
    }

    fn clear_selection(&mut self) {
        if self.teardown() {
            publish(&self.ctx.events, &TransformEvent::SelectionCleared);
        }
    }

    /// Rotate every tracked fragment about the frozen pivot: position
    /// `q * (p - pivot) + pivot`, orientation `q * o`.
    fn rotate_fragments(&mut self, axis: Vec3, angle: f32) {
        let Some(frozen) = self.tracker.frozen() else {
            return;
        };
        let model = frozen.selection().model;
        let pivot = frozen.pivot();
        let rotation = Quat::from_axis_angle(axis, angle);

        let mut first = None;
        {
            let mut scene = self.ctx.scene.lock();
            let mut applier = FragmentApplier::new(&mut *scene);
            for &fragment in &frozen.selection().fragment_ids {
                match applier.rotate_about(model, fragment, pivot, rotation) {
                    Ok(transform) => {
                        first.get_or_insert(transform);
                    }
                    Err(e) => tracing::warn!("Failed to rotate {}: {}", fragment, e),
                }
            }
            applier.finish();
        }

        publish(
            &self.ctx.events,
            &TransformEvent::RotateChanged {
                model,
                axis,
                angle,
                orientation_euler: first.map_or(Vec3::ZERO, |transform| transform.euler_xyz()),
            },
        );
    }

    /// Tumble the selection after the pointer moved from `last` to `current`
    fn free_rotate(&mut self, last: Vec2, current: Vec2) {
        self.free_drag = Some(current);

        let offset = Vec2::new(last.x - current.x, current.y - last.y);
        let angle = (offset.length() * self.ctx.config.rotate.free_rotate_degrees_per_pixel)
            .to_radians();
        if angle == 0.0 {
            return;
        }

        let (eye, up) = {
            let camera = self.ctx.camera.lock();
            (camera.position - camera.target, camera.up)
        };
        let sideways = up.cross(eye.normalize_or_zero()).normalize_or_zero() * offset.x;
        let lift = up.normalize_or_zero() * offset.y;
        let axis = (lift + sideways).cross(eye).normalize_or_zero();
        if axis.length_squared() < VECTOR_EPSILON {
            return;
        }
        self.rotate_fragments(axis, angle);
    }
}

impl Tool for RotateTool {
    fn name(&self) -> &'static str {
        ROTATE_TOOL
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self) {
        tracing::info!("Rotate tool activated");
        self.active = true;
    }

    fn deactivate(&mut self) {
        tracing::info!("Rotate tool deactivated");
        self.teardown();
        self.modifiers.clear();
        self.active = false;
    }

    fn handle_button_down(&mut self, event: &PointerEvent) -> bool {
        let ray = self.ray(event);
        if let Some(gizmo) = self.gizmo.as_mut()
            && gizmo.engage(&mut *self.ctx.renderer.lock(), &ray).is_some()
        {
            self.settle_until = None;
            return true;
        }

        if event.button == PointerButton::Left
            && self
                .modifiers
                .contains(&self.ctx.config.rotate.free_rotate_modifier)
            && self.tracker.is_tracking()
        {
            self.free_drag = Some(event.position());
            return true;
        }
        false
    }

    fn handle_button_up(&mut self, event: &PointerEvent) -> bool {
        if let Some(gizmo) = self.gizmo.as_mut()
            && gizmo.is_engaged()
        {
            gizmo.release(&mut *self.ctx.renderer.lock());
            let delay = Duration::from_millis(self.ctx.config.rotate.settle_delay_ms);
            self.settle_until = Some(Instant::now() + delay);
        }
        if event.button == PointerButton::Left {
            self.free_drag = None;
        }
        false
    }

    fn handle_mouse_move(&mut self, event: &PointerEvent) -> bool {
        let ray = self.ray(event);
        if let Some(gizmo) = self.gizmo.as_mut() {
            if gizmo.is_engaged() {
                let step = gizmo.drag(&mut *self.ctx.renderer.lock(), &ray);
                if let Some(step) = step
                    && step.angle != 0.0
                {
                    self.rotate_fragments(step.axis, step.angle);
                }
                return true;
            }
            gizmo.hover(&mut *self.ctx.renderer.lock(), &ray);
        }

        if let Some(last) = self.free_drag {
            self.free_rotate(last, event.position());
            return true;
        }
        false
    }

    fn handle_key_down(&mut self, key: Key) -> bool {
        if let Key::Modifier(modifier) = key {
            self.modifiers.insert(modifier);
        }
        false
    }

    fn handle_key_up(&mut self, key: Key) -> bool {
        if let Key::Modifier(modifier) = key {
            self.modifiers.remove(&modifier);
        }
        false
    }

    fn handle_selection_changed(&mut self, selections: &[Selection]) -> bool {
        if !self.active {
            return false;
        }
        let Some(selection) = selections.first() else {
            self.clear_selection();
            return false;
        };
        if self.is_engaged() {
            if let Some(gizmo) = self.gizmo.as_mut()
                && gizmo.is_engaged()
            {
                gizmo.release(&mut *self.ctx.renderer.lock());
            }
            self.settle_until = None;
            tracing::debug!("Selection change rejected while the gizmo is engaged");
            return true;
        }
        self.select(selection.clone());
        false
    }
}
