use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::Rng;

use crate::{config::ParticleFieldConfig, math::color::linear_from_hex};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler angles around X and Y.
    pub rotation: Vec2,
    /// Linear RGB.
    pub color: Vec3,
}

impl Particle {
    /// Integrates one frame. Each axis reflects independently once the new
    /// position is past the bound; the position itself is never clamped.
    pub fn step(&mut self, bounds: Vec3, rotation_step: f32) {
        self.position += self.velocity;

        let outside = self.position.abs().cmpgt(bounds);
        self.velocity = Vec3::select(outside, -self.velocity, self.velocity);

        self.rotation += Vec2::splat(rotation_step);
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0);
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

pub struct ParticleField {
    pub particles: Vec<Particle>,
    bounds: Vec3,
    rotation_step: f32,
}

impl ParticleField {
    pub fn new(config: &ParticleFieldConfig, rng: &mut impl Rng) -> Self {
        let primary = linear_from_hex(config.primary_color);
        let secondary = linear_from_hex(config.secondary_color);
        let shared_color = primary.lerp(secondary, rng.gen::<f32>());

        let particles = (0..config.count)
            .map(|_| {
                let position = Vec3::new(
                    rng.gen_range(-config.spawn_extent.x..config.spawn_extent.x),
                    rng.gen_range(-config.spawn_extent.y..config.spawn_extent.y),
                    rng.gen_range(-config.spawn_extent.z..config.spawn_extent.z),
                );
                let velocity = Vec3::new(
                    rng.gen_range(-config.max_speed..config.max_speed),
                    rng.gen_range(-config.max_speed..config.max_speed),
                    rng.gen_range(-config.max_speed..config.max_speed),
                );
                let color = if config.per_particle_color {
                    primary.lerp(secondary, rng.gen::<f32>())
                } else {
                    shared_color
                };

                Particle {
                    position,
                    velocity,
                    rotation: Vec2::ZERO,
                    color,
                }
            })
            .collect();

        log::debug!("Spawned {} particles", config.count);

        Self {
            particles,
            bounds: config.bounds,
            rotation_step: config.rotation_step,
        }
    }

    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.step(self.bounds, self.rotation_step);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn field(config: &ParticleFieldConfig) -> ParticleField {
        let mut rng = StdRng::seed_from_u64(42);
        ParticleField::new(config, &mut rng)
    }

    #[test]
    fn spawns_inside_spawn_box() {
        let config = ParticleFieldConfig::default();
        let field = field(&config);

        assert_eq!(field.len(), 300);
        for particle in &field.particles {
            assert!(particle.position.abs().cmple(config.spawn_extent).all());
            assert!(particle.velocity.abs().cmple(Vec3::splat(config.max_speed)).all());
        }
    }

    #[test]
    fn shares_one_color_by_default() {
        let field = field(&ParticleFieldConfig::default());
        let first = field.particles[0].color;
        assert!(field.particles.iter().all(|particle| particle.color == first));
    }

    #[test]
    fn per_particle_colors_stay_between_reference_colors() {
        let config = ParticleFieldConfig {
            per_particle_color: true,
            ..Default::default()
        };
        let field = field(&config);
        let primary = linear_from_hex(config.primary_color);
        let secondary = linear_from_hex(config.secondary_color);
        let low = primary.min(secondary);
        let high = primary.max(secondary);

        assert!(field
            .particles
            .iter()
            .any(|particle| particle.color != field.particles[0].color));
        for particle in &field.particles {
            assert!(particle.color.cmpge(low - 1e-6).all());
            assert!(particle.color.cmple(high + 1e-6).all());
        }
    }

    #[test]
    fn update_integrates_and_reflects_each_axis() {
        let mut field = field(&ParticleFieldConfig::default());
        let bounds = Vec3::new(10.0, 10.0, 5.0);

        // Force some particles across the bounds
        field.particles[0].position = Vec3::new(10.0, 0.0, 0.0);
        field.particles[0].velocity = Vec3::new(0.004, 0.001, -0.002);
        field.particles[1].position = Vec3::new(0.0, -9.999, -5.0);
        field.particles[1].velocity = Vec3::new(0.001, -0.003, -0.001);

        for _ in 0..50 {
            let before = field.particles.clone();
            field.update();

            for (before, after) in before.iter().zip(&field.particles) {
                assert_eq!(after.position, before.position + before.velocity);

                for axis in 0..3 {
                    let crossed = after.position[axis].abs() > bounds[axis];
                    let expected = if crossed {
                        -before.velocity[axis]
                    } else {
                        before.velocity[axis]
                    };
                    assert_eq!(after.velocity[axis], expected);
                }

                assert_eq!(after.rotation, before.rotation + Vec2::splat(0.01));
            }
        }
    }

    #[test]
    fn reflected_particle_heads_back_inside() {
        let mut particle = Particle {
            position: Vec3::new(9.999, 0.0, 0.0),
            velocity: Vec3::new(0.005, 0.0, 0.0),
            rotation: Vec2::ZERO,
            color: Vec3::ONE,
        };

        particle.step(Vec3::new(10.0, 10.0, 5.0), 0.01);
        assert_eq!(particle.velocity.x, -0.005);

        particle.step(Vec3::new(10.0, 10.0, 5.0), 0.01);
        assert!(particle.position.x < 10.004);
    }
}
