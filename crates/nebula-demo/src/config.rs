use std::path::{Path, PathBuf};

use nebula_engine::animation::AnimationConfig;
use nebula_engine::device::GpuInit;
use nebula_engine::particles::{MotionConfig, DEFAULT_PARTICLE_COUNT};
use nebula_engine::window::RuntimeConfig;

/// Vertex/fragment file pair for one program.
#[derive(Debug, Clone)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

/// Everything the demo reads at startup.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,

    pub particle_count: usize,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub motion: MotionConfig,
    pub animation: AnimationConfig,

    /// `.stl` or `.ply`.
    pub mesh_path: PathBuf,
    pub particle_shaders: ShaderPaths,
    pub mesh_shaders: ShaderPaths,

    pub clear_color: wgpu::Color,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let assets = assets_dir();
        Self {
            runtime: RuntimeConfig::default(),
            gpu: GpuInit::default(),
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: None,
            motion: MotionConfig::default(),
            animation: AnimationConfig::default(),
            mesh_path: assets.join("models/cube.ply"),
            particle_shaders: ShaderPaths {
                vertex: assets.join("shaders/particle.vert.wgsl"),
                fragment: assets.join("shaders/particle.frag.wgsl"),
            },
            mesh_shaders: ShaderPaths {
                vertex: assets.join("shaders/mesh.vert.wgsl"),
                fragment: assets.join("shaders/mesh.frag.wgsl"),
            },
            clear_color: wgpu::Color::BLACK,
        }
    }
}

/// Shipped assets, located relative to this crate so the demo runs from any
/// working directory.
pub fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}
