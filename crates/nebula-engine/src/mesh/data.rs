use std::path::Path;

use bytemuck::{Pod, Zeroable};

use super::{ply, stl, MeshError};

/// One triangle of a flat mesh: three positions, no shared vertices.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    pub vertices: [[f32; 3]; 3],
}

/// Vertex of an indexed mesh (32 bytes):
///
///  offset  0  position   [f32; 3]
///  offset 12  normal     [f32; 3]
///  offset 24  tex_coord  [f32; 2]
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatMesh {
    pub triangles: Vec<Triangle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMesh {
    pub vertices: Vec<MeshVertex>,
    /// Three indices per face.
    pub indices: Vec<u32>,
}

/// Source format, chosen from the file extension.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MeshFormat {
    Stl,
    Ply,
}

impl MeshFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("stl") {
            Some(MeshFormat::Stl)
        } else if ext.eq_ignore_ascii_case("ply") {
            Some(MeshFormat::Ply)
        } else {
            None
        }
    }
}

/// A loaded, immutable mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum Mesh {
    Flat(FlatMesh),
    Indexed(IndexedMesh),
}

const FLAT_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const INDEXED_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

impl Mesh {
    /// Reads and parses the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let format = MeshFormat::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let bytes = std::fs::read(path).map_err(|source| MeshError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mesh = Self::parse(format, &bytes)?;
        log::info!(
            "loaded {:?} mesh {}: {} vertices, {} triangles",
            format,
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parses an in-memory file.
    pub fn parse(format: MeshFormat, bytes: &[u8]) -> Result<Self, MeshError> {
        let mesh = match format {
            MeshFormat::Stl => Mesh::Flat(stl::parse(bytes)?),
            MeshFormat::Ply => Mesh::Indexed(ply::parse(bytes)?),
        };
        if mesh.triangle_count() == 0 {
            return Err(MeshError::Empty);
        }
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Mesh::Flat(m) => m.triangles.len() * 3,
            Mesh::Indexed(m) => m.vertices.len(),
        }
    }

    /// Bytes per vertex in [`Mesh::vertex_bytes`].
    pub fn stride(&self) -> usize {
        match self {
            Mesh::Flat(_) => std::mem::size_of::<[f32; 3]>(),
            Mesh::Indexed(_) => std::mem::size_of::<MeshVertex>(),
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        match self {
            Mesh::Flat(m) => bytemuck::cast_slice(&m.triangles),
            Mesh::Indexed(m) => bytemuck::cast_slice(&m.vertices),
        }
    }

    /// `u32` index data; `None` for flat meshes.
    pub fn index_bytes(&self) -> Option<&[u8]> {
        match self {
            Mesh::Flat(_) => None,
            Mesh::Indexed(m) => Some(bytemuck::cast_slice(&m.indices)),
        }
    }

    pub fn index_count(&self) -> usize {
        match self {
            Mesh::Flat(_) => 0,
            Mesh::Indexed(m) => m.indices.len(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            Mesh::Flat(m) => m.triangles.len(),
            Mesh::Indexed(m) => m.indices.len() / 3,
        }
    }

    /// Faces after triangulation; equals the triangle count for both formats.
    pub fn face_count(&self) -> usize {
        self.triangle_count()
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, Mesh::Indexed(_))
    }

    /// Vertex buffer layout at this mesh's stride.
    ///
    /// Position is always location 0. Indexed meshes also bind the normal
    /// (location 1, offset 12) and the texture coordinate (location 2,
    /// offset 24).
    pub fn vertex_layout(&self) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = match self {
            Mesh::Flat(_) => &FLAT_ATTRS,
            Mesh::Indexed(_) => &INDEXED_ATTRS,
        };
        wgpu::VertexBufferLayout {
            array_stride: self.stride() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}
