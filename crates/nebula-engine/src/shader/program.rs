use crate::device::DiagnosticSink;

use super::{ShaderError, ShaderKind, ShaderSource};

/// A compiled shader module for a single stage.
pub struct ShaderUnit {
    kind: ShaderKind,
    label: String,
    module: wgpu::ShaderModule,
}

impl ShaderUnit {
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Fixed-function state a program is linked against.
#[derive(Debug, Clone)]
pub struct ProgramDesc {
    pub label: String,
    /// Vertex buffer layouts, slot order.
    pub vertex_buffers: Vec<wgpu::VertexBufferLayout<'static>>,
    pub topology: wgpu::PrimitiveTopology,
    /// Byte sizes of the vertex-stage uniform buffers, bound at group 0,
    /// bindings 0.. in order.
    pub uniform_sizes: Vec<wgpu::BufferAddress>,
    pub color_format: wgpu::TextureFormat,
}

/// A linked vertex + fragment pair.
pub struct ShaderProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
}

impl ShaderProgram {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Layout of group 0; `None` when the program has no uniforms.
    pub fn bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.bind_group_layout.as_ref()
    }
}

/// Compiles one stage.
///
/// Validation errors raised by the device while creating the module, plus
/// error-level compilation messages, become `ShaderError::Compile`. Warnings
/// are logged.
pub fn compile(
    device: &wgpu::Device,
    sink: &DiagnosticSink,
    source: &ShaderSource,
) -> Result<ShaderUnit, ShaderError> {
    discard_stale(sink);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(source.label()),
        source: wgpu::ShaderSource::Wgsl(source.text().into()),
    });

    let mut diagnostics = sink.drain();
    let info = pollster::block_on(module.get_compilation_info());
    for msg in &info.messages {
        let text = match &msg.location {
            Some(loc) => format!(
                "{}:{}:{}: {}",
                source.label(),
                loc.line_number,
                loc.line_position,
                msg.message
            ),
            None => format!("{}: {}", source.label(), msg.message),
        };
        match msg.message_type {
            wgpu::CompilationMessageType::Error => {
                push_compiler_error(&mut diagnostics, &msg.message, text)
            }
            wgpu::CompilationMessageType::Warning => log::warn!("{text}"),
            wgpu::CompilationMessageType::Info => log::debug!("{text}"),
        }
    }

    if !diagnostics.is_empty() {
        return Err(ShaderError::Compile {
            label: source.label().to_owned(),
            kind: source.kind(),
            diagnostics,
        });
    }

    log::debug!("compiled {} shader {}", source.kind(), source.label());
    Ok(ShaderUnit {
        kind: source.kind(),
        label: source.label().to_owned(),
        module,
    })
}

/// Links a vertex and a fragment unit into a render pipeline.
pub fn link(
    device: &wgpu::Device,
    sink: &DiagnosticSink,
    desc: &ProgramDesc,
    vertex: &ShaderUnit,
    fragment: &ShaderUnit,
) -> Result<ShaderProgram, ShaderError> {
    let mut stage_errors = Vec::new();
    if vertex.kind() != ShaderKind::Vertex {
        stage_errors.push(format!("`{}` is not a vertex shader", vertex.label()));
    }
    if fragment.kind() != ShaderKind::Fragment {
        stage_errors.push(format!("`{}` is not a fragment shader", fragment.label()));
    }
    if !stage_errors.is_empty() {
        return Err(ShaderError::Link {
            label: desc.label.clone(),
            diagnostics: stage_errors,
        });
    }

    discard_stale(sink);

    let bind_group_layout = (!desc.uniform_sizes.is_empty()).then(|| {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = desc
            .uniform_sizes
            .iter()
            .enumerate()
            .map(|(binding, size)| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(*size),
                },
                count: None,
            })
            .collect();

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} bgl", desc.label)),
            entries: &entries,
        })
    });

    let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{} pipeline layout", desc.label)),
        bind_group_layouts: &bind_group_layouts,
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex.module,
            entry_point: Some(ShaderKind::Vertex.entry_point()),
            compilation_options: Default::default(),
            buffers: &desc.vertex_buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment.module,
            entry_point: Some(ShaderKind::Fragment.entry_point()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let diagnostics = sink.drain();
    if !diagnostics.is_empty() {
        return Err(ShaderError::Link {
            label: desc.label.clone(),
            diagnostics,
        });
    }

    log::info!(
        "linked program {} ({} + {})",
        desc.label,
        vertex.label(),
        fragment.label()
    );
    Ok(ShaderProgram {
        label: desc.label.clone(),
        pipeline,
        bind_group_layout,
    })
}

/// Compiles both stages and links them.
pub fn build_program(
    device: &wgpu::Device,
    sink: &DiagnosticSink,
    desc: &ProgramDesc,
    vertex: &ShaderSource,
    fragment: &ShaderSource,
) -> Result<ShaderProgram, ShaderError> {
    let vs = compile(device, sink, vertex)?;
    let fs = compile(device, sink, fragment)?;
    link(device, sink, desc, &vs, &fs)
}

/// Device validation errors usually embed the compiler message, so a
/// compiler error already carried by one of them is not repeated.
fn push_compiler_error(diagnostics: &mut Vec<String>, message: &str, text: String) {
    let reported = !message.is_empty() && diagnostics.iter().any(|d| d.contains(message));
    if !reported {
        diagnostics.push(text);
    }
}

/// Errors raised before a compile/link step belong to someone else.
fn discard_stale(sink: &DiagnosticSink) {
    for stale in sink.drain() {
        log::warn!("unattributed gpu error: {stale}");
    }
}
