use std::path::PathBuf;

use super::ShaderKind;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader `{label}` is empty")]
    Empty { label: String },

    #[error("failed to compile {kind} shader `{label}`:\n{}", diagnostics.join("\n"))]
    Compile {
        label: String,
        kind: ShaderKind,
        diagnostics: Vec<String>,
    },

    #[error("failed to link program `{label}`:\n{}", diagnostics.join("\n"))]
    Link {
        label: String,
        diagnostics: Vec<String>,
    },
}
