use std::fmt;
use std::path::Path;

use super::ShaderError;

/// Pipeline stage a shader source is written for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// WGSL function every source of this kind must declare.
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vs_main",
            ShaderKind::Fragment => "fs_main",
        }
    }

    fn stage_attribute(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "@vertex",
            ShaderKind::Fragment => "@fragment",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderKind::Vertex => f.write_str("vertex"),
            ShaderKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// WGSL text for one stage, checked for its entry point.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    kind: ShaderKind,
    label: String,
    text: String,
}

impl ShaderSource {
    /// Reads a WGSL file. The file name becomes the label used in diagnostics.
    pub fn load(kind: ShaderKind, path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("loaded {kind} shader {} ({} bytes)", path.display(), text.len());
        Self::from_text(kind, label, text)
    }

    pub fn from_text(
        kind: ShaderKind,
        label: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ShaderError> {
        let label = label.into();
        let text = text.into();

        if text.trim().is_empty() {
            return Err(ShaderError::Empty { label });
        }

        if !declares_entry_point(&text, kind.stage_attribute(), kind.entry_point()) {
            return Err(ShaderError::Compile {
                diagnostics: vec![format!(
                    "missing entry point `{} fn {}`",
                    kind.stage_attribute(),
                    kind.entry_point()
                )],
                label,
                kind,
            });
        }

        Ok(Self { kind, label, text })
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Looks for `<attr> fn <name>` with arbitrary whitespace in between.
fn declares_entry_point(text: &str, attr: &str, name: &str) -> bool {
    text.match_indices(attr).any(|(i, _)| {
        let rest = text[i + attr.len()..].trim_start();
        let Some(rest) = rest.strip_prefix("fn") else {
            return false;
        };
        if !rest.starts_with(char::is_whitespace) {
            return false;
        }
        rest.trim_start()
            .strip_prefix(name)
            .is_some_and(|tail| !tail.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "@vertex\nfn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {\n    return vec4<f32>(p, 1.0);\n}\n";
    const FS: &str = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";

    #[test]
    fn accepts_vertex_entry_point_across_lines() {
        let src = ShaderSource::from_text(ShaderKind::Vertex, "vs", VS).unwrap();
        assert_eq!(src.kind(), ShaderKind::Vertex);
        assert_eq!(src.label(), "vs");
        assert_eq!(src.text(), VS);
    }

    #[test]
    fn accepts_fragment_entry_point_on_one_line() {
        assert!(ShaderSource::from_text(ShaderKind::Fragment, "fs", FS).is_ok());
    }

    #[test]
    fn wrong_stage_is_a_compile_error() {
        let err = ShaderSource::from_text(ShaderKind::Fragment, "vs", VS).unwrap_err();
        match err {
            ShaderError::Compile { label, kind, diagnostics } => {
                assert_eq!(label, "vs");
                assert_eq!(kind, ShaderKind::Fragment);
                assert_eq!(diagnostics.len(), 1);
                assert!(diagnostics[0].contains("fs_main"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn entry_point_prefix_does_not_count() {
        let src = "@vertex fn vs_main2() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
        assert!(ShaderSource::from_text(ShaderKind::Vertex, "vs", src).is_err());
    }

    #[test]
    fn blank_source_is_rejected() {
        let err = ShaderSource::from_text(ShaderKind::Vertex, "blank", " \n\t").unwrap_err();
        assert!(matches!(err, ShaderError::Empty { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ShaderSource::load(ShaderKind::Vertex, "/nonexistent/nebula/shader.wgsl")
            .unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/nebula/shader.wgsl"));
    }

    #[test]
    fn compile_error_message_lists_diagnostics() {
        let err = ShaderError::Compile {
            label: "mesh.vert.wgsl".into(),
            kind: ShaderKind::Vertex,
            diagnostics: vec!["first".into(), "second".into()],
        };
        assert_eq!(
            err.to_string(),
            "failed to compile vertex shader `mesh.vert.wgsl`:\nfirst\nsecond"
        );
    }
}
