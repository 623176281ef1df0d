use rand::Rng;

use super::Particle;

/// Half-extent of the cube particles live in.
pub const BOUND: f32 = 1.0;

/// Per-frame particle motion parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionConfig {
    /// Each axis is offset by a value uniform in `[-jitter, jitter)` per frame.
    pub jitter: f32,

    /// Reflect z at the bounds like x and y.
    ///
    /// `false` leaves z unbounded: it drifts freely and particles eventually
    /// leave the clip volume.
    pub reflect_z: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            jitter: 0.01,
            reflect_z: true,
        }
    }
}

/// Negates a coordinate that left `[-BOUND, BOUND]`.
///
/// This is a single reflection, not a clamp: a value just past the bound
/// comes back just past the opposite bound. After one step from inside the
/// cube the magnitude is at most `BOUND + jitter`.
#[inline]
pub fn reflect(v: f32) -> f32 {
    if !(-BOUND..=BOUND).contains(&v) { -v } else { v }
}

impl MotionConfig {
    /// Adds `offset` to the particle's position, then reflects out-of-bound axes.
    pub fn apply_offset(&self, particle: &mut Particle, offset: [f32; 3]) {
        let [x, y, z] = &mut particle.position;
        *x = reflect(*x + offset[0]);
        *y = reflect(*y + offset[1]);
        *z += offset[2];
        if self.reflect_z {
            *z = reflect(*z);
        }
    }

    /// Draws one independent offset per axis.
    pub fn sample_offset<R: Rng + ?Sized>(&self, rng: &mut R) -> [f32; 3] {
        if self.jitter <= 0.0 {
            return [0.0; 3];
        }
        let j = self.jitter;
        [
            rng.random_range(-j..j),
            rng.random_range(-j..j),
            rng.random_range(-j..j),
        ]
    }

    /// Advances every particle by one frame.
    pub fn step<R: Rng + ?Sized>(&self, particles: &mut [Particle], rng: &mut R) {
        for p in particles {
            let offset = self.sample_offset(rng);
            self.apply_offset(p, offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f32 = 1e-6;

    fn at(position: [f32; 3]) -> Particle {
        Particle {
            position,
            color: [0.5; 3],
            velocity: [0.0; 3],
        }
    }

    fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
        for axis in 0..3 {
            assert!(
                (actual[axis] - expected[axis]).abs() < EPS,
                "axis {axis}: {actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn reflect_only_touches_out_of_bound_values() {
        assert_eq!(reflect(0.25), 0.25);
        assert_eq!(reflect(1.0), 1.0);
        assert_eq!(reflect(-1.0), -1.0);
        assert_eq!(reflect(1.004), -1.004);
        assert_eq!(reflect(-1.5), 1.5);
    }

    #[test]
    fn three_particle_step_with_fixed_offset() {
        let motion = MotionConfig::default();
        let offset = [0.005, -0.005, 0.02];
        let mut particles = [
            at([0.5, 0.5, 0.5]),
            at([0.998, -0.998, 0.99]),
            at([-0.999, 0.0, -0.5]),
        ];

        for p in &mut particles {
            motion.apply_offset(p, offset);
        }

        assert_close(particles[0].position, [0.505, 0.495, 0.52]);
        // x and y crossed the bound and were negated, z too.
        assert_close(particles[1].position, [-1.003, 1.003, -1.01]);
        assert_close(particles[2].position, [-0.994, -0.005, -0.48]);

        // color and velocity are never touched
        assert_eq!(particles[1].color, [0.5; 3]);
        assert_eq!(particles[1].velocity, [0.0; 3]);
    }

    #[test]
    fn z_drifts_unbounded_without_reflect_z() {
        let motion = MotionConfig {
            reflect_z: false,
            ..MotionConfig::default()
        };
        let mut p = at([0.0, 0.0, 0.99]);
        for _ in 0..10 {
            motion.apply_offset(&mut p, [0.0, 0.0, 0.02]);
        }
        assert!((p.position[2] - 1.19).abs() < 1e-5);
        assert_eq!(p.position[0], 0.0);
    }

    #[test]
    fn single_step_from_inside_stays_within_soft_bound() {
        let motion = MotionConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let limit = BOUND + motion.jitter + EPS;

        for _ in 0..10_000 {
            let start = [
                rng.random_range(-1.0f32..=1.0),
                rng.random_range(-1.0f32..=1.0),
                rng.random_range(-1.0f32..=1.0),
            ];
            let mut p = at(start);
            motion.step(std::slice::from_mut(&mut p), &mut rng);
            assert!(p.position.iter().all(|v| v.abs() <= limit), "{start:?} -> {:?}", p.position);
        }
    }

    #[test]
    fn sampled_offsets_respect_jitter() {
        let motion = MotionConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let o = motion.sample_offset(&mut rng);
            assert!(o.iter().all(|v| v.abs() <= motion.jitter));
        }
    }

    #[test]
    fn zero_jitter_is_a_no_op() {
        let motion = MotionConfig {
            jitter: 0.0,
            reflect_z: true,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let mut particles = vec![at([0.3, -0.2, 0.1]); 4];
        motion.step(&mut particles, &mut rng);
        assert!(particles.iter().all(|p| p.position == [0.3, -0.2, 0.1]));
    }
}
