use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use nebula_engine::animation::MeshAnimation;
use nebula_engine::mesh::Mesh;
use nebula_engine::particles::{generate_particles, MotionConfig, Particle};
use nebula_engine::shader::{ShaderKind, ShaderSource};

use crate::config::{DemoConfig, ShaderPaths};

/// Sources for one vertex + fragment program.
pub struct ProgramSources {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

impl ProgramSources {
    pub fn load(paths: &ShaderPaths) -> Result<Self> {
        Ok(Self {
            vertex: ShaderSource::load(ShaderKind::Vertex, &paths.vertex)?,
            fragment: ShaderSource::load(ShaderKind::Fragment, &paths.fragment)?,
        })
    }
}

/// CPU-side state of the demo: everything loaded at startup plus the
/// animation that mutates every frame.
pub struct DemoState {
    pub particles: Vec<Particle>,
    pub mesh: Mesh,
    pub animation: MeshAnimation,
    pub particle_sources: ProgramSources,
    pub mesh_sources: ProgramSources,
    motion: MotionConfig,
    rng: StdRng,
}

impl DemoState {
    /// Loads every asset. Any missing or malformed file is an error.
    pub fn load(config: &DemoConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let particles = generate_particles(config.particle_count, &mut rng);
        let mesh = Mesh::load(&config.mesh_path)
            .with_context(|| format!("failed to load mesh {}", config.mesh_path.display()))?;

        let particle_sources = ProgramSources::load(&config.particle_shaders)
            .context("failed to load particle shaders")?;
        let mesh_sources =
            ProgramSources::load(&config.mesh_shaders).context("failed to load mesh shaders")?;

        log::info!(
            "{} particles, mesh with {} triangles",
            particles.len(),
            mesh.triangle_count()
        );

        Ok(Self {
            particles,
            mesh,
            animation: MeshAnimation::new(config.animation),
            particle_sources,
            mesh_sources,
            motion: config.motion,
            rng,
        })
    }

    /// Advances particles and mesh animation by one frame.
    pub fn advance(&mut self) {
        self.motion.step(&mut self.particles, &mut self.rng);
        self.animation.advance();
    }
}
