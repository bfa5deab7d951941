//! Translate anchor handle
//!
//! Three axis arrows and a center sphere placed at the anchor. The handle
//! only computes where the anchor goes; moving fragments is up to its owner.
//! During a drag the anchor position is derived from the grab point each
//! time, so repeated moves never accumulate error.

use glam::{Mat4, Quat, Vec3};
use tx_core::{GizmoConfig, TransformConfig, TranslateConfig};

use crate::axis::GizmoAxis;
use crate::collision::{Plane, Ray, ray_cylinder_intersection, ray_sphere_intersection};
use crate::constants::handle::CENTER_SEGMENTS;
use crate::constants::overlay::TRANSLATE_SCENE;
use crate::geometry::{generate_arrow, generate_sphere};
use crate::material::GizmoMaterial;
use crate::render::{OverlayId, OverlayState, RenderHost};

/// Handle grabbed at pointer-down
#[derive(Debug, Clone, Copy)]
struct HandleDrag {
    axis: GizmoAxis,
    plane: Plane,
    grab_point: Vec3,
    start_position: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct HandlePart {
    axis: GizmoAxis,
    overlay: OverlayId,
    material: GizmoMaterial,
}

/// Draggable anchor used by the translate tool
#[derive(Debug)]
pub struct TranslateHandle {
    config: TranslateConfig,
    gizmo: GizmoConfig,
    position: Vec3,
    scale: f32,
    hovered: GizmoAxis,
    drag: Option<HandleDrag>,
    parts: Vec<HandlePart>,
}

impl TranslateHandle {
    /// Create a detached handle
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            config: config.translate.clone(),
            gizmo: config.gizmo.clone(),
            position: Vec3::ZERO,
            scale: 1.0,
            hovered: GizmoAxis::None,
            drag: None,
            parts: Vec::new(),
        }
    }

    /// Show the handle at `position`, sized after the selection
    pub fn attach(&mut self, renderer: &mut dyn RenderHost, position: Vec3, selection_size: f32) {
        if self.is_attached() {
            self.detach(renderer);
        }
        self.position = position;
        self.scale = (selection_size * self.config.handle_scale).max(self.config.min_handle_scale);

        renderer.create_overlay_scene(TRANSLATE_SCENE);
        for axis in GizmoAxis::PRINCIPAL {
            let material = GizmoMaterial::from_config(axis.color(&self.gizmo), &self.gizmo);
            let mesh = generate_arrow(
                axis.direction(),
                self.config.arrow_length,
                material.rgba(),
                axis.to_index() as u32,
            );
            let overlay = renderer.add_overlay(TRANSLATE_SCENE, mesh, self.state(material));
            self.parts.push(HandlePart {
                axis,
                overlay,
                material,
            });
        }

        let axis = GizmoAxis::Screen;
        let material = GizmoMaterial::from_config(axis.color(&self.gizmo), &self.gizmo);
        let mesh = generate_sphere(
            self.config.center_radius,
            CENTER_SEGMENTS,
            CENTER_SEGMENTS,
            material.rgba(),
            axis.to_index() as u32,
        );
        let overlay = renderer.add_overlay(TRANSLATE_SCENE, mesh, self.state(material));
        self.parts.push(HandlePart {
            axis,
            overlay,
            material,
        });

        tracing::debug!("Translate handle attached at {:?}", position);
        renderer.request_redraw();
    }

    /// Remove the handle and forget any drag in progress
    pub fn detach(&mut self, renderer: &mut dyn RenderHost) {
        if !self.is_attached() {
            return;
        }
        renderer.remove_overlay_scene(TRANSLATE_SCENE);
        self.parts.clear();
        self.drag = None;
        self.hovered = GizmoAxis::None;
        renderer.request_redraw();
    }

    /// Whether the handle is shown
    pub fn is_attached(&self) -> bool {
        !self.parts.is_empty()
    }

    /// Anchor position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// World size of the handle
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Closest handle hit by `ray`
    pub fn hit_test(&self, ray: &Ray) -> GizmoAxis {
        if !self.is_attached() {
            return GizmoAxis::None;
        }
        let length = self.config.arrow_length * self.scale;
        let radius = self.config.arrow_hit_radius * self.scale;

        let mut closest_axis = GizmoAxis::None;
        let mut closest_dist = f32::MAX;

        for axis in GizmoAxis::PRINCIPAL {
            let end = self.position + axis.direction() * length;
            if let Some(dist) = ray_cylinder_intersection(ray, self.position, end, radius)
                && dist < closest_dist
            {
                closest_dist = dist;
                closest_axis = axis;
            }
        }

        let center_radius = self.config.center_radius * self.scale;
        if let Some(dist) = ray_sphere_intersection(ray, self.position, center_radius)
            && dist <= closest_dist
        {
            closest_axis = GizmoAxis::Screen;
        }

        closest_axis
    }

    /// Track the handle under the pointer and highlight it
    pub fn hover(&mut self, renderer: &mut dyn RenderHost, ray: &Ray) -> GizmoAxis {
        if self.drag.is_some() {
            return self.hovered;
        }
        let axis = self.hit_test(ray);
        if axis != self.hovered {
            self.hovered = axis;
            self.refresh(renderer);
            renderer.request_redraw();
        }
        axis
    }

    /// Grab the handle under `ray`.
    ///
    /// Returns the grabbed axis, [`GizmoAxis::None`] when nothing was hit.
    pub fn begin_drag(
        &mut self,
        renderer: &mut dyn RenderHost,
        ray: &Ray,
        camera_forward: Vec3,
    ) -> GizmoAxis {
        let axis = self.hit_test(ray);
        if axis == GizmoAxis::None {
            return axis;
        }
        let plane = Plane::from_point_normal(self.position, drag_plane_normal(axis, camera_forward));
        let Some(grab_point) = plane.intersect(ray) else {
            return GizmoAxis::None;
        };

        self.drag = Some(HandleDrag {
            axis,
            plane,
            grab_point,
            start_position: self.position,
        });
        self.hovered = axis;
        self.refresh(renderer);
        renderer.request_redraw();
        tracing::debug!("Translate handle grabbed on {:?}", axis);
        axis
    }

    /// Move the anchor after the pointer. Returns the new anchor position.
    pub fn drag_to(&mut self, renderer: &mut dyn RenderHost, ray: &Ray) -> Option<Vec3> {
        let drag = self.drag?;
        let point = drag.plane.intersect(ray)?;
        let delta = point - drag.grab_point;

        let motion = match drag.axis {
            GizmoAxis::Screen => delta,
            axis => {
                let dir = axis.direction();
                dir * delta.dot(dir)
            }
        };

        self.position = drag.start_position + motion;
        self.refresh(renderer);
        Some(self.position)
    }

    /// Release the handle. Returns false if no drag was in progress.
    pub fn end_drag(&mut self, renderer: &mut dyn RenderHost) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.hovered = GizmoAxis::None;
        self.refresh(renderer);
        renderer.request_redraw();
        true
    }

    fn state(&self, material: GizmoMaterial) -> OverlayState {
        OverlayState {
            transform: Mat4::from_scale_rotation_translation(
                Vec3::splat(self.scale),
                Quat::IDENTITY,
                self.position,
            ),
            material,
            visible: true,
        }
    }

    fn refresh(&self, renderer: &mut dyn RenderHost) {
        for part in &self.parts {
            let material = part.material.with_highlight(part.axis == self.hovered);
            renderer.update_overlay(part.overlay, self.state(material));
        }
    }
}

/// Normal of the drag plane for an axis.
///
/// Principal axes drag in the world plane containing the axis that faces the
/// camera most; the center handle drags in the camera-facing plane.
pub fn drag_plane_normal(axis: GizmoAxis, camera_forward: Vec3) -> Vec3 {
    match axis {
        GizmoAxis::X => {
            if camera_forward.y.abs() > camera_forward.z.abs() {
                Vec3::Y
            } else {
                Vec3::Z
            }
        }
        GizmoAxis::Y => {
            if camera_forward.x.abs() > camera_forward.z.abs() {
                Vec3::X
            } else {
                Vec3::Z
            }
        }
        GizmoAxis::Z => {
            if camera_forward.x.abs() > camera_forward.y.abs() {
                Vec3::X
            } else {
                Vec3::Y
            }
        }
        GizmoAxis::Screen | GizmoAxis::None => -camera_forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRenderer;

    fn attached() -> (TranslateHandle, HeadlessRenderer) {
        let mut renderer = HeadlessRenderer::new();
        let mut handle = TranslateHandle::new(&TransformConfig::default());
        // Scale 0.6 * 10 = 6
        handle.attach(&mut renderer, Vec3::ZERO, 10.0);
        (handle, renderer)
    }

    fn down_at(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 50.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_attach_and_detach() {
        let (mut handle, mut renderer) = attached();
        assert_eq!(handle.scale(), 6.0);
        assert_eq!(renderer.visible_count(TRANSLATE_SCENE), 4);
        handle.detach(&mut renderer);
        assert!(!handle.is_attached());
        assert!(!renderer.has_scene(TRANSLATE_SCENE));
        assert_eq!(handle.hit_test(&down_at(3.0, 0.0)), GizmoAxis::None);
    }

    #[test]
    fn test_hit_test_arrows_and_center() {
        let (handle, _) = attached();
        assert_eq!(handle.hit_test(&down_at(3.0, 0.0)), GizmoAxis::X);
        assert_eq!(handle.hit_test(&down_at(0.0, 3.0)), GizmoAxis::Y);
        assert_eq!(handle.hit_test(&down_at(0.0, 0.0)), GizmoAxis::Screen);
        assert_eq!(handle.hit_test(&down_at(3.0, 3.0)), GizmoAxis::None);
        let side = Ray::new(Vec3::new(50.0, 0.0, 3.0), Vec3::NEG_X);
        assert_eq!(handle.hit_test(&side), GizmoAxis::Z);
    }

    #[test]
    fn test_axis_drag_projects_onto_axis() {
        let (mut handle, mut renderer) = attached();
        let axis = handle.begin_drag(&mut renderer, &down_at(3.0, 0.0), Vec3::NEG_Z);
        assert_eq!(axis, GizmoAxis::X);

        let moved = handle.drag_to(&mut renderer, &down_at(5.0, 7.0)).unwrap();
        assert!(moved.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));

        // Absolute from the grab point: going back restores the start
        let back = handle.drag_to(&mut renderer, &down_at(3.0, 0.0)).unwrap();
        assert!(back.abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(handle.end_drag(&mut renderer));
        assert!(!handle.end_drag(&mut renderer));
    }

    #[test]
    fn test_center_drag_moves_in_view_plane() {
        let (mut handle, mut renderer) = attached();
        handle.begin_drag(&mut renderer, &down_at(0.1, 0.1), Vec3::NEG_Z);
        let moved = handle.drag_to(&mut renderer, &down_at(2.1, -0.9)).unwrap();
        assert!(moved.abs_diff_eq(Vec3::new(2.0, -1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_hover_highlights_axis() {
        let (mut handle, mut renderer) = attached();
        assert_eq!(handle.hover(&mut renderer, &down_at(0.0, 3.0)), GizmoAxis::Y);
        let lit = handle
            .parts
            .iter()
            .filter(|part| {
                renderer
                    .overlay(part.overlay)
                    .is_some_and(|o| o.state.material.is_highlighted())
            })
            .count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_drag_plane_contains_axis() {
        for forward in [Vec3::NEG_Z, Vec3::new(-1.0, -1.0, -0.2).normalize()] {
            for axis in GizmoAxis::PRINCIPAL {
                let normal = drag_plane_normal(axis, forward);
                assert_eq!(normal.dot(axis.direction()), 0.0);
            }
        }
    }
}
