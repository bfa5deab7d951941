//! Rotate gizmo: three rings around the pivot
//!
//! Each ring carries its rotation axis, a solid used for picking and a
//! full-circle highlight copy shown while it is grabbed. Once a ring is
//! grabbed, pointer rays are intersected with the ring's picking plane (the
//! infinite plane through the pivot, perpendicular to the axis) and every
//! move yields one incremental angle.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Mat4, Quat, Vec3};
use tx_core::GizmoConfig;
use tx_core::constants::VECTOR_EPSILON;

use crate::axis::GizmoAxis;
use crate::camera::WorldUp;
use crate::collision::{ArcTorus, Plane, Ray, ray_arc_torus_intersection};
use crate::constants::overlay::ROTATE_SCENE;
use crate::constants::ring::{PICKER_COLOR, PICKER_SEGMENTS};
use crate::geometry::{generate_line, generate_sphere, generate_torus};
use crate::material::GizmoMaterial;
use crate::render::{OverlayId, OverlayState, RenderHost};

/// Ring placement for a world-up convention: axis, local-to-world rotation
/// of the torus and its swept arc.
///
/// The ring around the up axis is a closed circle, the other two are half
/// circles.
pub fn ring_layout(world_up: WorldUp) -> [(GizmoAxis, Quat, f32); 3] {
    match world_up {
        WorldUp::Y => [
            (GizmoAxis::X, Quat::from_rotation_y(FRAC_PI_2), PI),
            (GizmoAxis::Y, Quat::from_rotation_x(FRAC_PI_2), TAU),
            (GizmoAxis::Z, Quat::IDENTITY, PI),
        ],
        WorldUp::Z => [
            (
                GizmoAxis::X,
                Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(FRAC_PI_2),
                PI,
            ),
            (GizmoAxis::Y, Quat::from_rotation_x(FRAC_PI_2), PI),
            (GizmoAxis::Z, Quat::IDENTITY, TAU),
        ],
    }
}

/// A ring under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingHit {
    /// Axis of the ring
    pub axis: GizmoAxis,
    /// World point on the ring solid
    pub point: Vec3,
    /// Ray parameter of the hit
    pub distance: f32,
}

/// One incremental rotation produced by a ring drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingStep {
    /// Unit rotation axis
    pub axis: Vec3,
    /// Signed angle in radians
    pub angle: f32,
}

impl RingStep {
    /// The step as a quaternion
    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle)
    }
}

#[derive(Debug, Clone)]
struct Ring {
    axis: GizmoAxis,
    torus: ArcTorus,
    plane: Plane,
    material: GizmoMaterial,
    solid: Option<OverlayId>,
    highlight: Option<OverlayId>,
}

#[derive(Debug, Clone, Copy)]
struct Engagement {
    ring: usize,
    last_dir: Vec3,
}

/// Rotate gizmo anchored at a frozen pivot
#[derive(Debug)]
pub struct RotateGizmo {
    config: GizmoConfig,
    center: Vec3,
    size: f32,
    world_up: WorldUp,
    rings: Vec<Ring>,
    picker: Option<OverlayId>,
    angle_line: Option<OverlayId>,
    picker_material: GizmoMaterial,
    engaged: Option<Engagement>,
}

impl RotateGizmo {
    /// Build the rings for a pivot and gizmo size (not yet shown)
    pub fn new(config: &GizmoConfig, center: Vec3, size: f32, world_up: WorldUp) -> Self {
        let radius = size * config.ring_radius_factor;
        let tube = size * config.ring_tube_factor;
        let rings = ring_layout(world_up)
            .into_iter()
            .map(|(axis, orientation, arc)| Ring {
                axis,
                torus: ArcTorus {
                    center,
                    orientation,
                    radius,
                    tube,
                    arc,
                },
                plane: Plane::from_point_normal(center, axis.direction()),
                material: GizmoMaterial::from_config(axis.color(config), config),
                solid: None,
                highlight: None,
            })
            .collect();

        Self {
            config: config.clone(),
            center,
            size,
            world_up,
            rings,
            picker: None,
            angle_line: None,
            picker_material: GizmoMaterial::new(
                PICKER_COLOR,
                1.0,
                config.highlight_color,
                config.highlight_opacity,
            ),
            engaged: None,
        }
    }

    /// Pivot the rings turn around
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Gizmo size
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Ring radius in world units
    pub fn ring_radius(&self) -> f32 {
        self.size * self.config.ring_radius_factor
    }

    /// Up convention the rings were laid out for
    pub fn world_up(&self) -> WorldUp {
        self.world_up
    }

    /// Whether the overlay is shown
    pub fn is_attached(&self) -> bool {
        self.picker.is_some()
    }

    /// Whether a ring is grabbed
    pub fn is_engaged(&self) -> bool {
        self.engaged.is_some()
    }

    /// Add rings, highlight rings, picker and angle line to the overlay
    pub fn attach(&mut self, renderer: &mut dyn RenderHost) {
        if self.is_attached() {
            return;
        }
        renderer.create_overlay_scene(ROTATE_SCENE);

        let radial = self.config.tube_segments;
        let tubular = self.config.ring_segments;
        for ring in &mut self.rings {
            let id = ring.axis.to_index() as u32;
            let placement = Mat4::from_rotation_translation(ring.torus.orientation, self.center);

            let solid = generate_torus(
                ring.torus.radius,
                ring.torus.tube,
                radial,
                tubular,
                ring.torus.arc,
                ring.material.rgba(),
                id,
            );
            ring.solid = Some(renderer.add_overlay(
                ROTATE_SCENE,
                solid,
                OverlayState {
                    transform: placement,
                    material: ring.material,
                    visible: true,
                },
            ));

            let lit = ring.material.with_highlight(true);
            let highlight = generate_torus(
                ring.torus.radius,
                ring.torus.tube,
                radial,
                tubular,
                TAU,
                lit.rgba(),
                id,
            );
            ring.highlight = Some(renderer.add_overlay(
                ROTATE_SCENE,
                highlight,
                OverlayState {
                    transform: placement,
                    material: lit,
                    visible: false,
                },
            ));
        }

        let picker = generate_sphere(
            self.size * self.config.picker_radius_factor,
            PICKER_SEGMENTS,
            PICKER_SEGMENTS,
            self.picker_material.rgba(),
            GizmoAxis::None.to_index() as u32,
        );
        self.picker = Some(renderer.add_overlay(
            ROTATE_SCENE,
            picker,
            OverlayState {
                transform: Mat4::from_translation(self.center),
                material: self.picker_material,
                visible: false,
            },
        ));

        // Unit segment along +X, stretched onto center -> picker
        let line = generate_line(
            Vec3::ZERO,
            Vec3::X,
            self.picker_material.rgba(),
            GizmoAxis::None.to_index() as u32,
        );
        self.angle_line = Some(renderer.add_overlay(
            ROTATE_SCENE,
            line,
            OverlayState {
                transform: Mat4::from_translation(self.center),
                material: self.picker_material,
                visible: false,
            },
        ));

        tracing::debug!(
            "Rotate gizmo attached at {:?} (size {}, {:?} up)",
            self.center,
            self.size,
            self.world_up
        );
        renderer.request_redraw();
    }

    /// Remove the overlay and drop any engagement
    pub fn detach(&mut self, renderer: &mut dyn RenderHost) {
        if !self.is_attached() {
            return;
        }
        renderer.remove_overlay_scene(ROTATE_SCENE);
        for ring in &mut self.rings {
            ring.solid = None;
            ring.highlight = None;
        }
        self.picker = None;
        self.angle_line = None;
        self.engaged = None;
        renderer.request_redraw();
    }

    /// Closest ring solid hit by `ray`
    pub fn hit_test(&self, ray: &Ray) -> Option<RingHit> {
        let tolerance = self.size * self.config.ring_hit_tolerance;
        let mut closest: Option<RingHit> = None;
        for ring in &self.rings {
            let pick = ArcTorus {
                tube: ring.torus.tube + tolerance,
                ..ring.torus
            };
            if let Some(distance) = ray_arc_torus_intersection(ray, &pick)
                && closest.is_none_or(|hit| distance < hit.distance)
            {
                closest = Some(RingHit {
                    axis: ring.axis,
                    point: ray.at(distance),
                    distance,
                });
            }
        }
        closest
    }

    /// Show the picker where the pointer touches a ring. No-op while engaged.
    pub fn hover(&mut self, renderer: &mut dyn RenderHost, ray: &Ray) -> Option<RingHit> {
        if self.engaged.is_some() || !self.is_attached() {
            return None;
        }
        let hit = self.hit_test(ray);
        self.set_angle_line(renderer, None);
        self.set_picker(renderer, hit.map(|hit| hit.point));
        renderer.request_redraw();
        hit
    }

    /// Grab the ring under `ray`.
    ///
    /// The ring solid decides whether a ring is hit. The starting direction
    /// is taken where the same ray crosses the ring's picking plane, the
    /// surface [`RotateGizmo::drag`] measures against, so dragging back to
    /// the grab point nets zero rotation. The solid's hit point, projected
    /// onto the plane, is used only when the ray runs parallel to it.
    pub fn engage(&mut self, renderer: &mut dyn RenderHost, ray: &Ray) -> Option<GizmoAxis> {
        if !self.is_attached() {
            return None;
        }
        let Some(hit) = self.hit_test(ray) else {
            self.set_picker(renderer, None);
            renderer.request_redraw();
            return None;
        };
        let ring = self.rings.iter().position(|ring| ring.axis == hit.axis)?;

        // Angles are measured in the picking plane from here on
        let plane = self.rings[ring].plane;
        let in_plane = plane
            .intersect(ray)
            .unwrap_or_else(|| hit.point - plane.normal * plane.signed_distance(hit.point));
        let last_dir = (in_plane - self.center).normalize_or_zero();
        if last_dir.length_squared() < VECTOR_EPSILON {
            return None;
        }

        for (index, other) in self.rings.iter().enumerate() {
            if let Some(solid) = other.solid {
                renderer.update_overlay(solid, self.ring_state(other, false, false));
            }
            if let Some(highlight) = other.highlight {
                renderer.update_overlay(highlight, self.ring_state(other, true, index == ring));
            }
        }
        self.set_picker(renderer, Some(hit.point));
        self.set_angle_line(renderer, Some(hit.point));
        renderer.request_redraw();

        self.engaged = Some(Engagement { ring, last_dir });
        tracing::debug!("Ring {:?} grabbed", hit.axis);
        Some(hit.axis)
    }

    /// Follow the pointer with the grabbed ring.
    ///
    /// Returns the rotation since the previous call, `None` when not engaged
    /// or when the ray misses the picking plane.
    pub fn drag(&mut self, renderer: &mut dyn RenderHost, ray: &Ray) -> Option<RingStep> {
        let engagement = self.engaged?;
        let ring = &self.rings[engagement.ring];
        let axis = ring.axis.direction();

        let step = ring.plane.intersect(ray).and_then(|point| {
            let dir = (point - self.center).normalize_or_zero();
            if dir.length_squared() < VECTOR_EPSILON {
                return None;
            }
            Some((dir, signed_angle(engagement.last_dir, dir, axis)))
        });

        let result = step.map(|(dir, angle)| {
            self.engaged = Some(Engagement {
                last_dir: dir,
                ..engagement
            });
            let picker = self.center + dir * self.ring_radius();
            self.set_picker(renderer, Some(picker));
            self.set_angle_line(renderer, Some(picker));
            RingStep { axis, angle }
        });
        renderer.request_redraw();
        result
    }

    /// Let go of the ring: all rings back to normal, picker and line hidden
    pub fn release(&mut self, renderer: &mut dyn RenderHost) {
        self.engaged = None;
        if !self.is_attached() {
            return;
        }
        self.set_picker(renderer, None);
        self.set_angle_line(renderer, None);
        for ring in &self.rings {
            if let Some(solid) = ring.solid {
                renderer.update_overlay(solid, self.ring_state(ring, false, true));
            }
            if let Some(highlight) = ring.highlight {
                renderer.update_overlay(highlight, self.ring_state(ring, true, false));
            }
        }
        renderer.request_redraw();
    }

    fn ring_state(&self, ring: &Ring, highlighted: bool, visible: bool) -> OverlayState {
        OverlayState {
            transform: Mat4::from_rotation_translation(ring.torus.orientation, self.center),
            material: ring.material.with_highlight(highlighted),
            visible,
        }
    }

    fn set_picker(&self, renderer: &mut dyn RenderHost, position: Option<Vec3>) {
        if let Some(picker) = self.picker {
            renderer.update_overlay(
                picker,
                OverlayState {
                    transform: Mat4::from_translation(position.unwrap_or(self.center)),
                    material: self.picker_material,
                    visible: position.is_some(),
                },
            );
        }
    }

    fn set_angle_line(&self, renderer: &mut dyn RenderHost, end: Option<Vec3>) {
        let Some(line) = self.angle_line else {
            return;
        };
        let offset = end.map_or(Vec3::ZERO, |end| end - self.center);
        let length = offset.length();
        let visible = length > VECTOR_EPSILON;
        let transform = if visible {
            Mat4::from_scale_rotation_translation(
                Vec3::splat(length),
                Quat::from_rotation_arc(Vec3::X, offset / length),
                self.center,
            )
        } else {
            Mat4::from_translation(self.center)
        };
        renderer.update_overlay(
            line,
            OverlayState {
                transform,
                material: self.picker_material,
                visible,
            },
        );
    }
}

/// Signed angle from `from` to `to` around `axis`.
///
/// The sign is that of `(from × to) · axis` and is zero when the cross
/// product has no component along the axis.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let cross = from.cross(to);
    let along = cross.dot(axis);
    let sign = if along > 0.0 {
        1.0
    } else if along < 0.0 {
        -1.0
    } else {
        0.0
    };
    sign * cross.length().atan2(from.dot(to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRenderer;
    use approx::assert_relative_eq;

    fn gizmo(world_up: WorldUp) -> (RotateGizmo, HeadlessRenderer) {
        let mut renderer = HeadlessRenderer::new();
        // Ring radius 0.8 * 2.5 = 2
        let mut gizmo = RotateGizmo::new(&GizmoConfig::default(), Vec3::ZERO, 2.5, world_up);
        gizmo.attach(&mut renderer);
        (gizmo, renderer)
    }

    fn down_at(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 50.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_layout_normals_match_axes() {
        for world_up in [WorldUp::Y, WorldUp::Z] {
            for (axis, orientation, _) in ring_layout(world_up) {
                let normal = orientation * Vec3::Z;
                assert_relative_eq!(normal.dot(axis.direction()).abs(), 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_up_ring_is_closed() {
        let arc = |world_up, axis| {
            ring_layout(world_up)
                .into_iter()
                .find(|(ring, _, _)| *ring == axis)
                .map(|(_, _, arc)| arc)
        };
        assert_eq!(arc(WorldUp::Y, GizmoAxis::Y), Some(TAU));
        assert_eq!(arc(WorldUp::Y, GizmoAxis::X), Some(PI));
        assert_eq!(arc(WorldUp::Z, GizmoAxis::Z), Some(TAU));
        assert_eq!(arc(WorldUp::Z, GizmoAxis::Y), Some(PI));
    }

    #[test]
    fn test_attach_shows_only_solids() {
        let (mut gizmo, mut renderer) = gizmo(WorldUp::Z);
        // 3 solids + 3 highlights + picker + line
        assert_eq!(renderer.overlay_count(), 8);
        assert_eq!(renderer.visible_count(ROTATE_SCENE), 3);
        gizmo.detach(&mut renderer);
        assert_eq!(renderer.overlay_count(), 0);
        assert!(gizmo.hit_test(&down_at(1.2, 1.6)).is_some());
        assert!(gizmo.engage(&mut renderer, &down_at(1.2, 1.6)).is_none());
    }

    #[test]
    fn test_hit_test_picks_z_ring_from_above() {
        let (gizmo, _) = gizmo(WorldUp::Z);
        let hit = gizmo.hit_test(&down_at(1.2, -1.6)).unwrap();
        assert_eq!(hit.axis, GizmoAxis::Z);
        assert!(gizmo.hit_test(&down_at(0.0, 0.5)).is_none());
    }

    #[test]
    fn test_engage_swaps_solids_for_highlight() {
        let (mut gizmo, mut renderer) = gizmo(WorldUp::Z);
        assert_eq!(
            gizmo.engage(&mut renderer, &down_at(1.2, 1.6)),
            Some(GizmoAxis::Z)
        );
        assert!(gizmo.is_engaged());
        // highlight ring + picker + angle line
        assert_eq!(renderer.visible_count(ROTATE_SCENE), 3);

        gizmo.release(&mut renderer);
        assert!(!gizmo.is_engaged());
        assert_eq!(renderer.visible_count(ROTATE_SCENE), 3);
        assert!(gizmo.drag(&mut renderer, &down_at(-1.6, 1.2)).is_none());
    }

    #[test]
    fn test_drag_quarter_turn() {
        let (mut gizmo, mut renderer) = gizmo(WorldUp::Z);
        gizmo.engage(&mut renderer, &down_at(1.2, 1.6)).unwrap();
        let step = gizmo.drag(&mut renderer, &down_at(-1.6, 1.2)).unwrap();
        assert!(step.axis.abs_diff_eq(Vec3::Z, 1e-6));
        assert_relative_eq!(step.angle, FRAC_PI_2, epsilon = 1e-5);

        let back = gizmo.drag(&mut renderer, &down_at(1.2, 1.6)).unwrap();
        assert_relative_eq!(back.angle, -FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_closed_loop_nets_zero() {
        let (mut gizmo, mut renderer) = gizmo(WorldUp::Z);
        gizmo.engage(&mut renderer, &down_at(1.2, 1.6)).unwrap();
        let path = [(1.5, 1.8), (2.5, 2.0), (2.2, 0.8), (1.0, 0.9), (1.2, 1.6)];
        let total: f32 = path
            .iter()
            .filter_map(|&(x, y)| gizmo.drag(&mut renderer, &down_at(x, y)))
            .map(|step| step.angle)
            .sum();
        assert!(total.abs() < 1e-5);
    }

    #[test]
    fn test_oblique_grab_does_not_jump() {
        let (mut gizmo, mut renderer) = gizmo(WorldUp::Z);
        let on_ring = Vec3::new(1.2, 1.6, 0.0);
        let ray = Ray::new(on_ring + Vec3::new(5.0, 0.0, 50.0), Vec3::new(-5.0, 0.0, -50.0));
        // The solid is hit on its surface, off the ring's center line
        let hit = gizmo.hit_test(&ray).unwrap();
        assert_eq!(hit.axis, GizmoAxis::Z);
        assert!(!hit.point.abs_diff_eq(on_ring, 1e-4));

        gizmo.engage(&mut renderer, &ray).unwrap();
        let step = gizmo.drag(&mut renderer, &ray).unwrap();
        assert_eq!(step.angle, 0.0);
    }

    #[test]
    fn test_signed_angle_is_zero_for_parallel() {
        assert_eq!(signed_angle(Vec3::X, Vec3::X, Vec3::Z), 0.0);
        assert_relative_eq!(signed_angle(Vec3::X, Vec3::Y, Vec3::Z), FRAC_PI_2);
        assert_relative_eq!(signed_angle(Vec3::Y, Vec3::X, Vec3::Z), -FRAC_PI_2);
    }
}
