use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("failed to read mesh `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported mesh format `{}` (expected .stl or .ply)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("malformed {format} header at line {line}: {message}")]
    Header {
        format: &'static str,
        line: usize,
        message: String,
    },

    #[error("malformed {format} data: {message}")]
    Body {
        format: &'static str,
        message: String,
    },

    #[error("{format} data truncated: needed {needed} bytes, found {available}")]
    Truncated {
        format: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u64,
        vertex_count: usize,
    },

    #[error("mesh contains no triangles")]
    Empty,
}

impl MeshError {
    pub(crate) fn header(format: &'static str, line: usize, message: impl Into<String>) -> Self {
        Self::Header {
            format,
            line,
            message: message.into(),
        }
    }

    pub(crate) fn body(format: &'static str, message: impl Into<String>) -> Self {
        Self::Body {
            format,
            message: message.into(),
        }
    }
}
