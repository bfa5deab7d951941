//! Gizmo geometry generation
//!
//! Indexed meshes for the overlay handles: tori (optionally cut to an arc),
//! spheres, line segments and translation arrows. Everything is generated
//! in the handle's local frame; placement happens through the overlay
//! transform.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tx_core::BoundingBox;

use crate::constants::handle::{HEAD_LENGTH, HEAD_RADIUS, SEGMENTS, SHAFT_RADIUS};

/// Gizmo vertex data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GizmoVertex {
    /// Local position
    pub position: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
    /// Index of the handle the vertex belongs to
    pub axis_id: u32,
}

/// How the indices are to be assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Triangle list
    Triangles,
    /// Line list
    Lines,
}

/// Indexed mesh handed to the render host
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertices
    pub vertices: Vec<GizmoVertex>,
    /// Indices into `vertices`
    pub indices: Vec<u32>,
    /// Index assembly
    pub topology: Topology,
}

impl MeshData {
    fn new(topology: Topology) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            topology,
        }
    }

    fn push(&mut self, position: Vec3, color: [f32; 4], axis_id: u32) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(GizmoVertex {
            position: position.into(),
            color,
            axis_id,
        });
        index
    }

    /// Raw vertex bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Local-space bounds of the vertices
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }
}

/// Generate a torus in the XY plane around the Z axis.
///
/// `arc` is the swept angle starting at +X; `TAU` closes the ring.
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    arc: f32,
    color: [f32; 4],
    axis_id: u32,
) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * arc;
            let ring = radius + tube * v.cos();
            mesh.push(
                Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin()),
                color,
                axis_id,
            );
        }
    }

    let stride = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// Generate a UV sphere centered at the origin
pub fn generate_sphere(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    color: [f32; 4],
    axis_id: u32,
) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    for y in 0..=height_segments {
        let theta = y as f32 / height_segments as f32 * std::f32::consts::PI;
        for x in 0..=width_segments {
            let phi = x as f32 / width_segments as f32 * TAU;
            mesh.push(
                Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                ),
                color,
                axis_id,
            );
        }
    }

    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * stride + x + 1;
            let b = y * stride + x;
            let c = (y + 1) * stride + x;
            let d = (y + 1) * stride + x + 1;
            if y != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Generate a single line segment
pub fn generate_line(start: Vec3, end: Vec3, color: [f32; 4], axis_id: u32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Lines);
    let a = mesh.push(start, color, axis_id);
    let b = mesh.push(end, color, axis_id);
    mesh.indices.extend_from_slice(&[a, b]);
    mesh
}

/// Generate one arrow (shaft + cone head) of the given length along `direction`
pub fn generate_arrow(direction: Vec3, length: f32, color: [f32; 4], axis_id: u32) -> MeshData {
    let mut mesh = MeshData::new(Topology::Triangles);

    // Built along +Y, then rotated onto the axis
    let rotation = Mat4::from_quat(glam::Quat::from_rotation_arc(
        Vec3::Y,
        direction.normalize_or_zero(),
    ));
    let shaft_radius = SHAFT_RADIUS * length;
    let head_radius = HEAD_RADIUS * length;
    let shaft_end = length - HEAD_LENGTH * length;

    // Shaft cylinder
    let base_index = mesh.vertices.len() as u32;
    for i in 0..=SEGMENTS {
        let angle = (i as f32 / SEGMENTS as f32) * TAU;
        let x = angle.cos() * shaft_radius;
        let z = angle.sin() * shaft_radius;
        mesh.push(rotation.transform_point3(Vec3::new(x, 0.0, z)), color, axis_id);
        mesh.push(
            rotation.transform_point3(Vec3::new(x, shaft_end, z)),
            color,
            axis_id,
        );
    }
    for i in 0..SEGMENTS {
        let i0 = base_index + i * 2;
        let i1 = base_index + i * 2 + 1;
        let i2 = base_index + (i + 1) * 2;
        let i3 = base_index + (i + 1) * 2 + 1;
        mesh.indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
    }

    // Cone head
    let tip = mesh.push(
        rotation.transform_point3(Vec3::new(0.0, length, 0.0)),
        color,
        axis_id,
    );
    for i in 0..=SEGMENTS {
        let angle = (i as f32 / SEGMENTS as f32) * TAU;
        mesh.push(
            rotation.transform_point3(Vec3::new(
                angle.cos() * head_radius,
                shaft_end,
                angle.sin() * head_radius,
            )),
            color,
            axis_id,
        );
    }
    for i in 0..SEGMENTS {
        mesh.indices
            .extend_from_slice(&[tip, tip + 1 + (i + 1), tip + 1 + i]);
    }

    // Cone base cap
    let center = mesh.push(
        rotation.transform_point3(Vec3::new(0.0, shaft_end, 0.0)),
        color,
        axis_id,
    );
    for i in 0..SEGMENTS {
        mesh.indices
            .extend_from_slice(&[center, tip + 1 + i, tip + 1 + (i + 1)]);
    }

    mesh
}
