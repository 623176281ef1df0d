//! Shader compiler/linker.
//!
//! WGSL sources are loaded per stage (`ShaderKind`), compiled into
//! `ShaderUnit`s and linked into a `ShaderProgram` (a render pipeline).
//! Compile and link failures carry the full device diagnostics and are
//! treated as fatal by callers.

mod error;
mod program;
mod source;

pub use error::ShaderError;
pub use program::{build_program, compile, link, ProgramDesc, ShaderProgram, ShaderUnit};
pub use source::{ShaderKind, ShaderSource};
