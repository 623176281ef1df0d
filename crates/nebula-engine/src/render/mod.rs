//! GPU rendering subsystem.
//!
//! Each renderer owns its program and GPU buffers, created once from CPU
//! data. Per frame a renderer records one load pass into the frame encoder;
//! CPU-side updates are written back with `queue.write_buffer` into the same
//! buffers.
//!
//! Convention: positions are clip-space x/y in [-1, 1]; vertex shaders remap
//! z from [-1, 1] to wgpu's [0, 1] depth range.

mod ctx;
mod mesh;
mod particles;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::MeshRenderer;
pub use particles::ParticleRenderer;
