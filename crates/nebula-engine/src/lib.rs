//! nebula engine crate.
//!
//! Platform + GPU runtime, shader compiler/linker, particle and mesh data,
//! and the renderers that draw them.

pub mod animation;
pub mod core;
pub mod device;
pub mod logging;
pub mod mesh;
pub mod particles;
pub mod render;
pub mod shader;
pub mod window;
