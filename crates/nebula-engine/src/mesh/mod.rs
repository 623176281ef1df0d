//! Mesh loading.
//!
//! Two on-disk formats feed one [`Mesh`] type:
//! - STL (binary or ASCII): a flat triangle list, positions only.
//! - PLY (ASCII or binary): indexed vertices with position, normal and
//!   texture coordinates.
//!
//! Files are parsed fully before anything is uploaded; any error aborts the
//! load without partial data.

mod data;
mod error;
mod ply;
mod stl;

pub use data::{FlatMesh, IndexedMesh, Mesh, MeshFormat, MeshVertex, Triangle};
pub use error::MeshError;
