use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// CPU-side triangle mesh. Material color is baked into the vertices.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// UV sphere with the same vertex layout as a `width x height` segment
    /// sphere: `(width + 1) * (height + 1)` vertices, degenerate pole
    /// triangles skipped.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::new();
        let mut grid = Vec::new();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let mut row = Vec::new();

            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * std::f32::consts::TAU;
                let theta = v * std::f32::consts::PI;

                let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());

                row.push(vertices.len() as u32);
                vertices.push(Vertex {
                    position: normal * radius,
                    normal,
                    color: Vec3::ONE,
                });
            }

            grid.push(row);
        }

        let mut indices = Vec::new();

        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }

                if iy != height_segments as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            name: String::from("Sphere"),
            vertices,
            indices,
        }
    }
}
