use bytemuck::{Pod, Zeroable};
use rand::Rng;

/// Number of particles the demo renders.
pub const DEFAULT_PARTICLE_COUNT: usize = 1000;

/// GPU vertex layout (36 bytes):
///
///  offset  0  position  [f32; 3]   loc 0
///  offset 12  color     [f32; 3]   loc 1
///  offset 24  velocity  [f32; 3]   (not bound; always zero)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub velocity: [f32; 3],
}

pub const PARTICLE_SIZE: usize = std::mem::size_of::<Particle>();

impl Particle {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: PARTICLE_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Produces `count` particles.
///
/// Each position axis is independently uniform in [-1, 1], each color
/// channel independently uniform in [0, 1]; velocity is zero.
pub fn generate_particles<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            position: [
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
            ],
            color: [
                rng.random_range(0.0..=1.0),
                rng.random_range(0.0..=1.0),
                rng.random_range(0.0..=1.0),
            ],
            velocity: [0.0; 3],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn layout_matches_struct() {
        assert_eq!(PARTICLE_SIZE, 36);
        let layout = Particle::layout();
        assert_eq!(layout.array_stride, 36);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }

    #[test]
    fn generates_exact_count_within_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [0, 1, 3, 1000] {
            let particles = generate_particles(n, &mut rng);
            assert_eq!(particles.len(), n);
            for p in &particles {
                assert!(p.position.iter().all(|v| (-1.0..=1.0).contains(v)));
                assert!(p.color.iter().all(|c| (0.0..=1.0).contains(c)));
                assert_eq!(p.velocity, [0.0; 3]);
            }
        }
    }

    #[test]
    fn axes_are_spread_over_the_full_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let particles = generate_particles(1000, &mut rng);
        for axis in 0..3 {
            let min = particles.iter().map(|p| p.position[axis]).fold(f32::MAX, f32::min);
            let max = particles.iter().map(|p| p.position[axis]).fold(f32::MIN, f32::max);
            assert!(min < -0.9, "axis {axis} min {min}");
            assert!(max > 0.9, "axis {axis} max {max}");

            let mean: f32 =
                particles.iter().map(|p| p.position[axis]).sum::<f32>() / particles.len() as f32;
            assert!(mean.abs() < 0.1, "axis {axis} mean {mean}");
        }
    }

    #[test]
    fn same_seed_same_cloud() {
        let a = generate_particles(16, &mut StdRng::seed_from_u64(3));
        let b = generate_particles(16, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
