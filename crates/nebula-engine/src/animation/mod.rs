//! Mesh transform animation.

mod mesh_animation;

pub use mesh_animation::{AnimationConfig, MeshAnimation, TransformUniform};
