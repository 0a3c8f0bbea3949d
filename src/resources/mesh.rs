//! Mesh data structures and generation

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::backend::Vertex;

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    /// Calculate triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Create an axis-aligned box centered at the origin
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let mut mesh = Mesh::new("box");
        let half = Vec3::new(width, height, depth) / 2.0;

        // (normal, u axis, v axis) for each face; u x v == normal
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, -Vec3::X, Vec3::Y),
            (Vec3::X, -Vec3::Z, Vec3::Y),
            (-Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, -Vec3::Z),
            (-Vec3::Y, Vec3::X, Vec3::Z),
        ];

        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            let center = normal * half;
            let su = u * half;
            let sv = v * half;
            let corners = [
                (center - su - sv, Vec2::new(0.0, 1.0)),
                (center + su - sv, Vec2::new(1.0, 1.0)),
                (center + su + sv, Vec2::new(1.0, 0.0)),
                (center - su + sv, Vec2::new(0.0, 0.0)),
            ];
            for (position, uv) in corners {
                mesh.vertices.push(Vertex::new(position, normal, uv));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// Create a UV sphere
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut mesh = Mesh::new("sphere");
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        for ring in 0..=height_segments {
            let v = ring as f32 / height_segments as f32;
            let phi = v * PI;

            for segment in 0..=width_segments {
                let u = segment as f32 / width_segments as f32;
                let theta = u * TAU;

                let normal = Vec3::new(
                    -theta.cos() * phi.sin(),
                    phi.cos(),
                    theta.sin() * phi.sin(),
                );
                mesh.vertices
                    .push(Vertex::new(normal * radius, normal, Vec2::new(u, v)));
            }
        }

        let stride = width_segments + 1;
        for ring in 0..height_segments {
            for segment in 0..width_segments {
                let a = ring * stride + segment + 1;
                let b = ring * stride + segment;
                let c = (ring + 1) * stride + segment;
                let d = (ring + 1) * stride + segment + 1;

                if ring != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if ring != height_segments - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        mesh
    }

    /// Create a (p, q) torus knot
    ///
    /// `radius` is the knot radius, `tube` the tube radius.
    pub fn torus_knot(
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    ) -> Self {
        let mut mesh = Mesh::new("torus_knot");
        let tubular_segments = tubular_segments.max(3);
        let radial_segments = radial_segments.max(3);

        let curve = |u: f32| -> Vec3 {
            let cu = u.cos();
            let su = u.sin();
            let qu_over_p = q as f32 / p as f32 * u;
            let cs = qu_over_p.cos();
            Vec3::new(
                radius * (2.0 + cs) * 0.5 * cu,
                radius * (2.0 + cs) * su * 0.5,
                radius * qu_over_p.sin() * 0.5,
            )
        };

        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * p as f32 * TAU;
            let p1 = curve(u);
            let p2 = curve(u + 0.01);

            // Frenet-like frame along the curve
            let t = p2 - p1;
            let n = p2 + p1;
            let b = t.cross(n).normalize();
            let n = b.cross(t).normalize();

            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * TAU;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();

                let position = p1 + n * cx + b * cy;
                let normal = (position - p1).normalize();
                let uv = Vec2::new(
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                );
                mesh.vertices.push(Vertex::new(position, normal, uv));
            }
        }

        let stride = radial_segments + 1;
        for j in 1..=tubular_segments {
            for i in 1..=radial_segments {
                let a = stride * (j - 1) + (i - 1);
                let b = stride * j + (i - 1);
                let c = stride * j + i;
                let d = stride * (j - 1) + i;
                mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        mesh
    }

    /// Create a flat disc in the XY plane facing +Z
    pub fn circle(radius: f32, segments: u32) -> Self {
        let mut mesh = Mesh::new("circle");
        let segments = segments.max(3);

        mesh.vertices
            .push(Vertex::new(Vec3::ZERO, Vec3::Z, Vec2::new(0.5, 0.5)));

        for s in 0..=segments {
            let angle = s as f32 / segments as f32 * TAU;
            let (sin, cos) = angle.sin_cos();
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius * cos, radius * sin, 0.0),
                Vec3::Z,
                Vec2::new((cos + 1.0) / 2.0, (sin + 1.0) / 2.0),
            ));
        }

        for i in 1..=segments {
            mesh.indices.extend_from_slice(&[i, i + 1, 0]);
        }

        mesh
    }
}
