use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Rotation and scale oscillation parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationConfig {
    pub initial_angle_degrees: f32,
    pub angle_step_degrees: f32,
    pub rotation_axis: Vec3,
    pub initial_scale: f32,
    pub scale_step: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            initial_angle_degrees: 1.0,
            angle_step_degrees: 1.0,
            rotation_axis: Vec3::ONE,
            initial_scale: 0.01,
            scale_step: 0.0001,
            min_scale: 0.01,
            max_scale: 0.03,
        }
    }
}

/// Rotation angle that grows every frame plus a scale that runs a triangle
/// wave between `min_scale` and `max_scale`.
#[derive(Debug, Clone)]
pub struct MeshAnimation {
    config: AnimationConfig,
    angle_degrees: f32,
    scale: f32,
    growing: bool,
}

impl MeshAnimation {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            angle_degrees: config.initial_angle_degrees,
            scale: config.initial_scale,
            growing: true,
            config,
        }
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_growing(&self) -> bool {
        self.growing
    }

    /// Advances one frame.
    ///
    /// The scale moves first, then the direction flips if the new value left
    /// the band, so the scale overshoots each bound by at most one step.
    pub fn advance(&mut self) {
        self.angle_degrees += self.config.angle_step_degrees;

        if self.growing {
            self.scale += self.config.scale_step;
        } else {
            self.scale -= self.config.scale_step;
        }

        if self.scale > self.config.max_scale {
            self.growing = false;
        }
        if self.scale < self.config.min_scale {
            self.growing = true;
        }
    }

    /// `rotation * scale`: the mesh is scaled in model space, then rotated.
    pub fn matrix(&self) -> Mat4 {
        let axis = self.config.rotation_axis.try_normalize().unwrap_or(Vec3::Z);
        Mat4::from_axis_angle(axis, self.angle_degrees.to_radians())
            * Mat4::from_scale(Vec3::splat(self.scale))
    }

    pub fn uniform(&self) -> TransformUniform {
        TransformUniform::from(self.matrix())
    }
}

impl Default for MeshAnimation {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

/// Column-major 4x4 matrix as laid out in the WGSL uniform.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub matrix: [[f32; 4]; 4],
}

impl From<Mat4> for TransformUniform {
    fn from(m: Mat4) -> Self {
        Self {
            matrix: m.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_growing_from_initial_values() {
        let anim = MeshAnimation::default();
        assert_eq!(anim.angle_degrees(), 1.0);
        assert_eq!(anim.scale(), 0.01);
        assert!(anim.is_growing());
    }

    #[test]
    fn angle_increases_by_one_degree_per_frame() {
        let mut anim = MeshAnimation::default();
        for _ in 0..359 {
            anim.advance();
        }
        assert!((anim.angle_degrees() - 360.0).abs() < 1e-3);
    }

    #[test]
    fn flips_to_shrinking_right_after_exceeding_max() {
        let mut anim = MeshAnimation::default();
        let mut previous = anim.scale();
        for _ in 0..1000 {
            anim.advance();
            if !anim.is_growing() {
                assert!(anim.scale() > 0.03);
                assert!(previous <= 0.03);
                return;
            }
            previous = anim.scale();
        }
        panic!("never started shrinking");
    }

    #[test]
    fn flips_back_to_growing_right_after_dropping_below_min() {
        let mut anim = MeshAnimation::default();
        while anim.is_growing() {
            anim.advance();
        }
        let mut previous = anim.scale();
        for _ in 0..1000 {
            anim.advance();
            if anim.is_growing() {
                assert!(anim.scale() < 0.01);
                assert!(previous >= 0.01);
                return;
            }
            previous = anim.scale();
        }
        panic!("never started growing again");
    }

    #[test]
    fn scale_is_a_bounded_triangle_wave() {
        let mut anim = MeshAnimation::default();
        let step = AnimationConfig::default().scale_step;
        let mut flips = 0;
        let mut growing = anim.is_growing();
        let mut previous = anim.scale();

        for _ in 0..20_000 {
            anim.advance();
            assert!(anim.scale() >= 0.01 - step - 1e-6);
            assert!(anim.scale() <= 0.03 + step + 1e-6);
            // every frame moves by exactly one step
            assert!(((anim.scale() - previous).abs() - step).abs() < 1e-6);
            previous = anim.scale();

            if anim.is_growing() != growing {
                flips += 1;
                growing = anim.is_growing();
            }
        }

        // ~200 frames per half period
        assert!((95..=105).contains(&flips), "flips = {flips}");
    }

    #[test]
    fn matrix_scales_then_rotates() {
        let anim = MeshAnimation::new(AnimationConfig {
            initial_angle_degrees: 90.0,
            rotation_axis: Vec3::Z,
            initial_scale: 2.0,
            ..AnimationConfig::default()
        });
        let p = anim.matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5), "{p:?}");
    }

    #[test]
    fn rotation_axis_is_normalized() {
        let anim = MeshAnimation::new(AnimationConfig {
            initial_scale: 1.0,
            rotation_axis: Vec3::new(0.0, 0.0, 5.0),
            initial_angle_degrees: 180.0,
            ..AnimationConfig::default()
        });
        let p = anim.matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-5), "{p:?}");
    }

    #[test]
    fn uniform_tracks_the_animated_matrix() {
        let mut anim = MeshAnimation::default();
        for _ in 0..45 {
            anim.advance();
        }
        assert_eq!(anim.uniform().matrix, anim.matrix().to_cols_array_2d());
        assert_ne!(anim.uniform(), MeshAnimation::default().uniform());
    }

    #[test]
    fn uniform_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let u = TransformUniform::from(m);
        assert_eq!(u.matrix[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<TransformUniform>(), 64);
    }
}
