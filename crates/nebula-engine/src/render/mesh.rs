use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

use crate::animation::TransformUniform;
use crate::mesh::Mesh;
use crate::shader::{ProgramDesc, ShaderProgram};

use super::{RenderCtx, RenderTarget};

enum DrawCall {
    /// Flat triangle list; vertices consumed in order.
    Direct { vertex_count: u32 },
    Indexed { ibo: wgpu::Buffer, index_count: u32 },
}

/// Draws a loaded mesh as a triangle list under a transform uniform.
pub struct MeshRenderer {
    program: ShaderProgram,
    vbo: wgpu::Buffer,
    draw: DrawCall,
    transform_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl MeshRenderer {
    /// Fixed-function state the mesh program is linked against.
    ///
    /// The vertex buffer uses [`Mesh::vertex_layout`]. The vertex shader
    /// must read position at location 0 and may read the indexed-mesh
    /// attributes at locations 1 and 2.
    pub fn program_desc(color_format: wgpu::TextureFormat, mesh: &Mesh) -> ProgramDesc {
        ProgramDesc {
            label: "mesh".to_owned(),
            vertex_buffers: vec![mesh.vertex_layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            uniform_sizes: vec![std::mem::size_of::<TransformUniform>() as wgpu::BufferAddress],
            color_format,
        }
    }

    pub fn new(
        device: &wgpu::Device,
        program: ShaderProgram,
        mesh: &Mesh,
        transform: TransformUniform,
    ) -> Result<Self> {
        let bgl = program
            .bind_group_layout()
            .with_context(|| format!("program `{}` has no transform binding", program.label()))?;

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nebula mesh vbo"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let draw = match mesh.index_bytes() {
            Some(indices) => DrawCall::Indexed {
                ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("nebula mesh ibo"),
                    contents: indices,
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.index_count() as u32,
            },
            None => DrawCall::Direct {
                vertex_count: mesh.vertex_count() as u32,
            },
        };

        let transform_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nebula mesh transform ubo"),
            contents: bytemuck::bytes_of(&transform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nebula mesh bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_ubo.as_entire_binding(),
            }],
        });

        log::debug!(
            "uploaded mesh: {} vertices x {} bytes, {} triangles",
            mesh.vertex_count(),
            mesh.stride(),
            mesh.triangle_count()
        );

        Ok(Self {
            program,
            vbo,
            draw,
            transform_ubo,
            bind_group,
        })
    }

    pub fn set_transform(&self, queue: &wgpu::Queue, transform: &TransformUniform) {
        queue.write_buffer(&self.transform_ubo, 0, bytemuck::bytes_of(transform));
    }

    pub fn render(&self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        let mut rpass = target.load_pass("nebula mesh pass", ctx.size);
        rpass.set_pipeline(self.program.pipeline());
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vbo.slice(..));

        match &self.draw {
            DrawCall::Direct { vertex_count } => rpass.draw(0..*vertex_count, 0..1),
            DrawCall::Indexed { ibo, index_count } => {
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..*index_count, 0, 0..1);
            }
        }
    }
}
