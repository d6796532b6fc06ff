//! Decorative particle field drawn behind the page.

mod particle;

pub use particle::{Particle, ParticleField};

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::{camera::Camera, config::ParticleFieldConfig, math::easing::ease_toward_vec2};

pub struct Background {
    pub field: ParticleField,
    pub camera: Camera,
    /// Last pointer position, normalized to `[-1, 1]` with +Y up.
    pointer: Vec2,
    pointer_influence: f32,
    camera_easing: f32,
}

impl Background {
    pub fn new(config: &ParticleFieldConfig, width: f32, height: f32, rng: &mut impl Rng) -> Self {
        let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, config.camera_distance), 75.0, 1.0);
        camera.set_aspect(width, height);

        Self {
            field: ParticleField::new(config, rng),
            camera,
            pointer: Vec2::ZERO,
            pointer_influence: config.pointer_influence,
            camera_easing: config.camera_easing,
        }
    }

    #[cfg(test)]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn set_pointer(&mut self, position: Vec2, viewport: Vec2) {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }

        self.pointer = Vec2::new(
            position.x / viewport.x * 2.0 - 1.0,
            -(position.y / viewport.y) * 2.0 + 1.0,
        );
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.set_aspect(width, height);
    }

    /// The point the camera drifts toward. Screen-space Y is flipped once more
    /// so that moving the pointer down raises the camera.
    pub fn camera_target(&self) -> Vec2 {
        Vec2::new(self.pointer.x, -self.pointer.y) * self.pointer_influence
    }

    pub fn update(&mut self) {
        self.field.update();

        let eased = ease_toward_vec2(self.camera.eye.truncate(), self.camera_target(), self.camera_easing);
        self.camera.eye.x = eased.x;
        self.camera.eye.y = eased.y;
        self.camera.look_at(Vec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn background() -> Background {
        let mut rng = StdRng::seed_from_u64(7);
        Background::new(&ParticleFieldConfig::default(), 800.0, 600.0, &mut rng)
    }

    #[test]
    fn normalizes_pointer_to_unit_square() {
        let mut background = background();
        let viewport = Vec2::new(800.0, 600.0);

        background.set_pointer(Vec2::ZERO, viewport);
        assert_eq!(background.pointer(), Vec2::new(-1.0, 1.0));

        background.set_pointer(viewport, viewport);
        assert_eq!(background.pointer(), Vec2::new(1.0, -1.0));

        background.set_pointer(viewport / 2.0, viewport);
        assert_eq!(background.pointer(), Vec2::ZERO);
    }

    #[test]
    fn camera_converges_on_pointer_target() {
        let mut background = background();
        background.set_pointer(Vec2::new(800.0, 600.0), Vec2::new(800.0, 600.0));

        let target = background.camera_target();
        assert_eq!(target, Vec2::new(0.5, 0.5));

        let mut distance = (background.camera.eye.truncate() - target).length();
        for _ in 0..300 {
            background.update();
            let next = (background.camera.eye.truncate() - target).length();
            assert!(next <= distance);
            distance = next;
        }

        assert!(distance < 1e-3);
        assert_eq!(background.camera.eye.z, 5.0);
        assert_eq!(background.camera.target, Vec3::ZERO);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut background = background();
        background.resize(1000.0, 500.0);
        assert_eq!(background.camera.aspect, 2.0);
    }
}
