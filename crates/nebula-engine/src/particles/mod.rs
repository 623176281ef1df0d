//! Particle point cloud: generation and per-frame motion.

mod motion;
mod particle;

pub use motion::{reflect, MotionConfig, BOUND};
pub use particle::{generate_particles, Particle, DEFAULT_PARTICLE_COUNT, PARTICLE_SIZE};
