//! Ray picking against gizmo handles
//!
//! Analytic tests for planes, spheres and finite cylinders, plus a sphere
//! tracer for partial tori (the rotate rings).

use glam::{Quat, Vec3};

use crate::constants::picking::{MAX_TRACE_STEPS, PARALLEL_EPSILON, TRACE_HIT_EPSILON};

/// A picking ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Infinite plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Any point on the plane
    pub point: Vec3,
    /// Unit normal
    pub normal: Vec3,
}

impl Plane {
    /// Plane through `point` with the given normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Signed distance from the plane
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.point).dot(self.normal)
    }

    /// Point where `ray` crosses the plane, if it does in front of the origin
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        ray_plane_intersection(ray, self.point, self.normal).map(|t| ray.at(t))
    }
}

/// Ray-plane intersection.
///
/// Returns `None` when the ray is parallel to the plane or the plane lies
/// behind the ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Ray-sphere intersection.
///
/// Returns the nearest non-negative hit. A ray starting inside the sphere
/// hits its far side.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let (near, far) = ray_sphere_span(ray, center, radius)?;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Both ray parameters where the ray crosses a sphere
fn ray_sphere_span(ray: &Ray, center: Vec3, radius: f32) -> Option<(f32, f32)> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    Some((-b - root, -b + root))
}

/// Ray-cylinder intersection.
///
/// Tests a ray against a finite cylinder given by its axis endpoints and
/// radius.
///
/// # Algorithm
///
/// 1. **Infinite cylinder**: project the ray into the plane perpendicular to
///    the cylinder axis and solve the resulting quadratic `at² + bt + c = 0`.
/// 2. **Finite bounds**: keep the hit only if its projection onto the axis
///    lies between `start` and `end`.
///
/// # Returns
///
/// * `Some(t)` - ray parameter of the nearest hit, `ray.at(t)` is the point
/// * `None` - the ray misses, or the cylinder is behind the origin
pub fn ray_cylinder_intersection(ray: &Ray, start: Vec3, end: Vec3, radius: f32) -> Option<f32> {
    let length = (end - start).length();
    if length < PARALLEL_EPSILON {
        return None;
    }
    let axis = (end - start) / length;

    // Components perpendicular to the axis
    let d = ray.direction - axis * ray.direction.dot(axis);
    let o = (ray.origin - start) - axis * (ray.origin - start).dot(axis);

    let a = d.dot(d);
    if a < PARALLEL_EPSILON {
        // Looking straight down the axis
        return None;
    }
    let b = 2.0 * d.dot(o);
    let c = o.dot(o) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    if t < 0.0 {
        return None;
    }

    let projection = (ray.at(t) - start).dot(axis);
    if projection < 0.0 || projection > length {
        return None;
    }

    Some(t)
}

/// A torus, possibly cut to an arc, placed in world space.
///
/// In its local frame the ring lies in the XY plane around the Z axis and
/// the arc runs counter-clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcTorus {
    /// Torus center
    pub center: Vec3,
    /// Local-to-world rotation
    pub orientation: Quat,
    /// Distance from the center to the middle of the tube
    pub radius: f32,
    /// Tube radius
    pub tube: f32,
    /// Swept angle in radians, `TAU` for a closed ring
    pub arc: f32,
}

impl ArcTorus {
    /// Exact distance from `point` to the torus surface (negative inside)
    pub fn distance(&self, point: Vec3) -> f32 {
        let local = self.orientation.inverse() * (point - self.center);
        let rho = local.truncate().length();

        let mut phi = local.y.atan2(local.x);
        if phi < 0.0 {
            phi += std::f32::consts::TAU;
        }

        if self.arc >= std::f32::consts::TAU || phi <= self.arc {
            let dx = rho - self.radius;
            (dx * dx + local.z * local.z).sqrt() - self.tube
        } else {
            let first = Vec3::new(self.radius, 0.0, 0.0);
            let last = Vec3::new(
                self.radius * self.arc.cos(),
                self.radius * self.arc.sin(),
                0.0,
            );
            local.distance(first).min(local.distance(last)) - self.tube
        }
    }

    /// Ring normal in world space
    pub fn normal(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

/// Ray-torus intersection by sphere tracing.
///
/// Marching starts where the ray enters the torus's bounding sphere and
/// stops on a hit, on leaving the sphere or after a fixed number of steps.
pub fn ray_arc_torus_intersection(ray: &Ray, torus: &ArcTorus) -> Option<f32> {
    let bound = torus.radius + torus.tube;
    let (enter, exit) = ray_sphere_span(ray, torus.center, bound)?;
    if exit < 0.0 {
        return None;
    }

    let epsilon = TRACE_HIT_EPSILON * torus.radius.max(torus.tube);
    let mut t = enter.max(0.0);
    for _ in 0..MAX_TRACE_STEPS {
        let d = torus.distance(ray.at(t));
        if d < epsilon {
            return Some(t);
        }
        t += d;
        if t > exit {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_ray_hits_cylinder() {
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z);
        let t = ray_cylinder_intersection(&ray, Vec3::ZERO, Vec3::X, 0.1).unwrap();
        assert_relative_eq!(t, 0.9, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_misses_cylinder() {
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), Vec3::Z);
        assert!(ray_cylinder_intersection(&ray, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_ray_outside_cylinder_bounds() {
        let ray = Ray::new(Vec3::new(2.0, 0.0, 1.0), Vec3::NEG_Z);
        assert!(ray_cylinder_intersection(&ray, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_ray_along_cylinder_axis() {
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        assert!(ray_cylinder_intersection(&ray, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_plane_intersection() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 0.0, 2.0), Vec3::Z);
        let ray = Ray::new(Vec3::new(1.0, 1.0, 10.0), Vec3::NEG_Z);
        let point = plane.intersect(&ray).unwrap();
        assert!(point.abs_diff_eq(Vec3::new(1.0, 1.0, 2.0), 1e-6));

        let parallel = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::X);
        assert!(plane.intersect(&parallel).is_none());
        let behind = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(plane.intersect(&behind).is_none());
    }

    #[test]
    fn test_sphere_from_outside_and_inside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_relative_eq!(
            ray_sphere_intersection(&ray, Vec3::ZERO, 1.0).unwrap(),
            4.0,
            epsilon = 1e-5
        );
        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_relative_eq!(
            ray_sphere_intersection(&inside, Vec3::ZERO, 1.0).unwrap(),
            1.0,
            epsilon = 1e-5
        );
        let miss = Ray::new(Vec3::new(0.0, 3.0, 5.0), Vec3::NEG_Z);
        assert!(ray_sphere_intersection(&miss, Vec3::ZERO, 1.0).is_none());
    }

    fn ring(arc: f32) -> ArcTorus {
        ArcTorus {
            center: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius: 1.0,
            tube: 0.05,
            arc,
        }
    }

    #[test]
    fn test_torus_hit_from_above() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray_arc_torus_intersection(&ray, &ring(TAU)).unwrap();
        assert_relative_eq!(t, 4.95, epsilon = 1e-3);
    }

    #[test]
    fn test_torus_hole_is_not_a_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(ray_arc_torus_intersection(&ray, &ring(TAU)).is_none());
    }

    #[test]
    fn test_half_ring_only_covers_its_arc() {
        let half = ring(PI);
        let upper = Ray::new(Vec3::new(0.0, 1.0, 5.0), Vec3::NEG_Z);
        let lower = Ray::new(Vec3::new(0.0, -1.0, 5.0), Vec3::NEG_Z);
        assert!(ray_arc_torus_intersection(&upper, &half).is_some());
        assert!(ray_arc_torus_intersection(&lower, &half).is_none());
    }

    #[test]
    fn test_oriented_torus() {
        // Ring rotated into the YZ plane
        let torus = ArcTorus {
            orientation: Quat::from_rotation_y(FRAC_PI_2),
            ..ring(TAU)
        };
        assert!(torus.normal().abs_diff_eq(Vec3::X, 1e-6));
        let ray = Ray::new(Vec3::new(5.0, 1.0, 0.0), Vec3::NEG_X);
        let t = ray_arc_torus_intersection(&ray, &torus).unwrap();
        assert_relative_eq!(t, 4.95, epsilon = 1e-3);
    }

    #[test]
    fn test_torus_distance_outside_arc_uses_endpoints() {
        let half = ring(PI);
        // Straight below the center of the missing half
        let d = half.distance(Vec3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(d, 2.0_f32.sqrt() - 0.05, epsilon = 1e-5);
    }
}
