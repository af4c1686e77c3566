use std::f32::consts::PI;

use crate::resources::mesh::{MeshData, Vertex};

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

impl SphereOptions {
    /// Coarse sphere whose facets enclose the unit sphere, used as the
    /// light-volume proxy.
    #[must_use]
    pub fn light_volume() -> Self {
        Self {
            radius: 1.0 / ((PI / 8.0).cos() * (PI / 16.0).cos()),
            width_segments: 8,
            height_segments: 8,
        }
    }
}

/// UV sphere, counter-clockwise when seen from outside.
#[must_use]
pub fn create_sphere(options: &SphereOptions) -> MeshData {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for y in 0..=height_segments {
        let v_ratio = y as f32 / height_segments as f32;
        // from the south pole up
        let theta = v_ratio * PI;
        let py = -radius * theta.cos();
        let ring_radius = radius * theta.sin();

        for x in 0..=width_segments {
            let u_ratio = x as f32 / width_segments as f32;
            let phi = u_ratio * 2.0 * PI;
            let px = -ring_radius * phi.cos();
            let pz = ring_radius * phi.sin();

            vertices.push(Vertex {
                position: [px, py, pz],
                normal: [px / radius, py / radius, pz / radius],
                // texel rows run top-down
                uv: [u_ratio, 1.0 - v_ratio],
            });
        }
    }

    let stride = width_segments + 1;
    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for y in 0..height_segments {
        for x in 0..width_segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = (y + 1) * stride + x;
            let v3 = v2 + 1;

            // the pole rows produce one degenerate triangle each; rasterization drops them
            indices.extend_from_slice(&[v0, v1, v2, v1, v3, v2]);
        }
    }

    MeshData { vertices, indices }
}
