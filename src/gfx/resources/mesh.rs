//! Triangle meshes loaded from OBJ files
//!
//! [`MeshData`] is the CPU side (merged vertices and indices of every object in
//! the file); [`Mesh`] owns the uploaded GPU buffers.

use std::{ops::Range, path::Path};

use wgpu::util::DeviceExt;

use crate::{error::AssetError, gfx::scene::vertex::Vertex3D};

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn from_obj(path: &Path) -> Result<Self, AssetError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| AssetError::Model {
            path: path.to_path_buf(),
            source,
        })?;

        let data = Self::from_models(models.iter().map(|m| &m.mesh));
        if data.indices.is_empty() {
            return Err(AssetError::EmptyModel {
                path: path.to_path_buf(),
            });
        }
        Ok(data)
    }

    /// Merges tobj meshes into one vertex/index list.
    pub fn from_models<'a>(meshes: impl Iterator<Item = &'a tobj::Mesh>) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for mesh in meshes {
            let base = vertices.len() as u32;
            let count = mesh.positions.len() / 3;

            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals.clone()
            } else {
                calculate_vertex_normals(&mesh.positions, &mesh.indices)
            };
            let has_tex_coords = mesh.texcoords.len() == count * 2;

            vertices.extend((0..count).map(|i| Vertex3D {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                // OBJ puts v = 0 at the bottom of the image, wgpu at the top
                tex_coords: if has_tex_coords {
                    [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
            }));
            indices.extend(mesh.indices.iter().map(|i| i + base));
        }

        Self { vertices, indices }
    }
}

/// Averages the face normals around each vertex.
pub fn calculate_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];
    let vertex = |i: usize| cgmath::Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);

    for triangle in indices.chunks_exact(3) {
        let (i0, i1, i2) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
        let face = (vertex(i1) - vertex(i0)).cross(vertex(i2) - vertex(i0));

        for &i in &[i0, i1, i2] {
            normals[i * 3] += face.x;
            normals[i * 3 + 1] += face.y;
            normals[i * 3 + 2] += face.z;
        }
    }

    for n in normals.chunks_exact_mut(3) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len > f32::EPSILON {
            n.iter_mut().for_each(|c| *c /= len);
        } else {
            n.copy_from_slice(&[0.0, 1.0, 0.0]);
        }
    }

    normals
}

/// Uploaded mesh ready to draw.
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, data: &MeshData, name: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn quad(with_normals: bool, with_tex_coords: bool) -> tobj::Mesh {
        tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, -1.0],
            normals: if with_normals {
                vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0]
            } else {
                Vec::new()
            },
            texcoords: if with_tex_coords {
                vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.25]
            } else {
                Vec::new()
            },
            indices: vec![0, 1, 2, 0, 2, 3],
            ..Default::default()
        }
    }

    #[test]
    fn test_tex_coords_are_flipped() {
        let mesh = quad(true, true);
        let data = MeshData::from_models(std::iter::once(&mesh));
        assert_eq!(data.vertices[0].tex_coords, [0.0, 1.0]);
        assert_eq!(data.vertices[3].tex_coords, [0.0, 0.75]);
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let mesh = quad(false, false);
        let data = MeshData::from_models(std::iter::once(&mesh));
        for v in &data.vertices {
            let n = cgmath::Vector3::from(v.normal);
            assert!((n.magnitude() - 1.0).abs() < 1e-5);
            assert!((n.y - 1.0).abs() < 1e-5);
            assert_eq!(v.tex_coords, [0.0, 0.0]);
        }
    }

    #[test]
    fn test_merged_models_offset_indices() {
        let a = quad(true, true);
        let b = quad(true, true);
        let data = MeshData::from_models([&a, &b].into_iter());
        assert_eq!(data.vertices.len(), 8);
        assert_eq!(&data.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_missing_obj_is_asset_error() {
        let err = MeshData::from_obj(Path::new("nowhere/missing.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Model { .. }));
    }
}
