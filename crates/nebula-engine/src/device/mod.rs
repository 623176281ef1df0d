//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering
//! - collecting device validation errors for the shader linker

mod diagnostics;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use diagnostics::DiagnosticSink;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
