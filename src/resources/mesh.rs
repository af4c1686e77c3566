//! Triangle meshes.
//!
//! [`MeshData`] is the CPU-side triangle list produced by the scene loader
//! and the procedural primitives. [`Mesh`] is its immutable GPU copy: one
//! interleaved vertex buffer, one `u32` index buffer and the local bounds
//! computed at upload.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::errors::{Result, UmbraError};
use crate::resources::bounds::BoundingBox;
use crate::resources::handle::Owned;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    const POSITION_ONLY: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    /// Full layout used by the geometry pass.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Position-only view of the same buffer, for shadow and stencil draws.
    #[must_use]
    pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::POSITION_ONLY,
        }
    }
}

/// Indexed triangle list in local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Builds an unindexed triangle list from parallel attribute streams, as
    /// exported per face corner.
    pub fn from_corners(positions: &[[f32; 3]], normals: &[[f32; 3]], uvs: &[[f32; 2]]) -> Result<Self> {
        if positions.len() != normals.len() || positions.len() != uvs.len() {
            return Err(UmbraError::InvalidArgument(format!(
                "attribute counts differ: {} positions, {} normals, {} uvs",
                positions.len(),
                normals.len(),
                uvs.len()
            )));
        }
        if positions.len() % 3 != 0 {
            return Err(UmbraError::InvalidArgument(format!(
                "{} corners do not form whole triangles",
                positions.len()
            )));
        }

        let vertices = positions
            .iter()
            .zip(normals)
            .zip(uvs)
            .map(|((&position, &normal), &uv)| Vertex { position, normal, uv })
            .collect::<Vec<_>>();
        let indices = (0..vertices.len() as u32).collect();
        Ok(Self { vertices, indices })
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.position)))
    }
}

/// GPU mesh. Not `Clone`: the buffers have exactly one owner.
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: Owned<wgpu::Buffer>,
    index_buffer: Owned<wgpu::Buffer>,
    index_count: u32,
    bounds: BoundingBox,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Result<Self> {
        let bounds = data
            .bounds()
            .ok_or_else(|| UmbraError::InvalidArgument(format!("mesh '{label}' has no vertices")))?;
        if data.indices.is_empty() {
            return Err(UmbraError::InvalidArgument(format!("mesh '{label}' has no triangles")));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertex_buffer: Owned::new(vertex_buffer),
            index_buffer: Owned::new(index_buffer),
            index_count: data.indices.len() as u32,
            bounds,
        })
    }

    /// Local-space bounds computed at upload.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the buffers at vertex slot 0 and issues one indexed draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let (Some(vertices), Some(indices)) = (self.vertex_buffer.get(), self.index_buffer.get()) else {
            return;
        };
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
