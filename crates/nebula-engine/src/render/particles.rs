use wgpu::util::DeviceExt;

use crate::particles::Particle;
use crate::shader::{ProgramDesc, ShaderProgram};

use super::{RenderCtx, RenderTarget};

/// Draws the particle cloud as a point list.
///
/// The vertex buffer is sized once from the initial particles; later uploads
/// overwrite it in place.
pub struct ParticleRenderer {
    program: ShaderProgram,
    vbo: wgpu::Buffer,
    count: u32,
}

impl ParticleRenderer {
    /// Fixed-function state the particle program is linked against.
    pub fn program_desc(color_format: wgpu::TextureFormat) -> ProgramDesc {
        ProgramDesc {
            label: "particles".to_owned(),
            vertex_buffers: vec![Particle::layout()],
            topology: wgpu::PrimitiveTopology::PointList,
            uniform_sizes: Vec::new(),
            color_format,
        }
    }

    pub fn new(device: &wgpu::Device, program: ShaderProgram, particles: &[Particle]) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nebula particle vbo"),
            contents: bytemuck::cast_slice(particles),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        log::debug!("uploaded {} particles ({} bytes)", particles.len(), vbo.size());
        Self {
            program,
            vbo,
            count: particles.len() as u32,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Overwrites the vertex buffer from offset 0.
    ///
    /// Only the first `count()` particles are written; the buffer never grows.
    pub fn upload(&self, queue: &wgpu::Queue, particles: &[Particle]) {
        let n = particles.len().min(self.count as usize);
        if n != particles.len() {
            log::warn!(
                "particle upload truncated from {} to {n}",
                particles.len()
            );
        }
        if n == 0 {
            return;
        }
        queue.write_buffer(&self.vbo, 0, bytemuck::cast_slice(&particles[..n]));
    }

    pub fn render(&self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.count == 0 {
            return;
        }

        let mut rpass = target.load_pass("nebula particle pass", ctx.size);
        rpass.set_pipeline(self.program.pipeline());
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.draw(0..self.count, 0..1);
    }
}
