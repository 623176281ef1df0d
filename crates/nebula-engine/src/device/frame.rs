/// Surface texture, its view and the encoder recording into it.
///
/// Consumed by `Gpu::submit`. The next texture cannot be acquired while
/// this one is alive.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
