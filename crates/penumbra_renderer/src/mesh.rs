use std::mem;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::{error::RenderError, material::GpuMaterial};

// #[repr(C)] ensures the compiler doesn't reorder fields.
// Pod (Plain Old Data) and Zeroable allow us to cast this struct to raw bytes safely.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    // 1. The Model Matrix (4x4 floats)
    // Moves the object from (0,0,0) to its place in the world.
    pub model: [[f32; 4]; 4],

    // 2. The Normal Matrix (4x4 floats)
    // (Technically 3x3 is enough, but GPUs prefer 4x4 alignment).
    pub normal_matrix: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn from_matrix(model_matrix: Mat4) -> Self {
        // Transpose(Inverse(Model)) keeps normals perpendicular under non-uniform scale.
        let normal_matrix = model_matrix.inverse().transpose();

        Self {
            model: model_matrix.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }
}

// The GPU-Compatible Vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3], // X, Y, Z
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0, // @location(0) in shader
                    format: wgpu::VertexFormat::Float32x3, // position
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: (mem::size_of::<[f32; 3]>() * 2) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// CPU-side indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(RenderError::InvalidAsset(format!(
                "mesh needs a non-empty triangle list, got {} indices",
                self.indices.len()
            )));
        }
        if let Some(bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(RenderError::InvalidAsset(format!(
                "index {bad} out of range for {} vertices",
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Axis-aligned cube centred on the origin, one quad per face.
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        // (normal, tangent u, tangent v) per face
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut mesh = MeshData::default();
        for (n, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv, uv) in [
                (-1.0, -1.0, [0.0, 1.0]),
                (1.0, -1.0, [1.0, 1.0]),
                (1.0, 1.0, [1.0, 0.0]),
                (-1.0, 1.0, [0.0, 0.0]),
            ] {
                let p = [
                    (n[0] + u[0] * su + v[0] * sv) * h,
                    (n[1] + u[1] * su + v[1] * sv) * h,
                    (n[2] + u[2] * su + v[2] * sv) * h,
                ];
                mesh.vertices.push(Vertex::new(p, n, uv));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    /// Upward-facing square in the XZ plane. `uv_repeat` tiles the texture.
    pub fn plane(half_extent: f32, uv_repeat: f32) -> Self {
        let h = half_extent;
        let r = uv_repeat;
        let n = [0.0, 1.0, 0.0];
        MeshData {
            vertices: vec![
                Vertex::new([-h, 0.0, h], n, [0.0, r]),
                Vertex::new([h, 0.0, h], n, [r, r]),
                Vertex::new([h, 0.0, -h], n, [r, 0.0]),
                Vertex::new([-h, 0.0, -h], n, [0.0, 0.0]),
            ],
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }
}

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

/// Shared, read-only mesh + material pair referenced by render items.
pub struct Model {
    pub mesh: GpuMesh,
    pub material: GpuMaterial,
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;

    #[test]
    fn cube_faces_wind_outward() {
        let cube = MeshData::cube(1.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.validate().is_ok());

        for tri in cube.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(cube.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a).normalize();
            let n = Vec3::from(cube.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(n) > 0.99, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn plane_winds_upward() {
        let plane = MeshData::plane(5.0, 4.0);
        let p: Vec<Vec3> = plane.vertices.iter().map(|v| Vec3::from(v.position)).collect();
        let n = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
        assert!(n.dot(Vec3::Y) > 0.99);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mesh = MeshData {
            vertices: vec![Vertex::new([0.0; 3], [0.0, 1.0, 0.0], [0.0; 2])],
            indices: vec![0, 1, 2],
        };
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let uniform = ModelUniform::from_matrix(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)));
        let n = Mat4::from_cols_array_2d(&uniform.normal_matrix) * Vec4::new(1.0, 0.0, 0.0, 0.0);
        assert!((n.x - 0.5).abs() < 1e-6);
    }
}
