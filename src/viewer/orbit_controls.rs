use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::{camera::Camera, math::spherical::Spherical};

/// Orbits a camera around a target. Pan and zoom are not supported.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical: Spherical,
    /// Pending rotation, `x` is azimuth and `y` is polar.
    delta: Vec2,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical: Spherical {
                radius: 1.0,
                phi: 0.0,
                theta: 0.0,
            },
            delta: Vec2::ZERO,
        }
    }

    /// Polar angle as of the last `update`.
    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    #[cfg(test)]
    pub fn azimuthal_angle(&self) -> f32 {
        self.spherical.theta
    }

    /// Pins the polar angle to its current value, leaving only horizontal orbit.
    pub fn lock_polar_angle(&mut self) {
        let polar = self.polar_angle();
        self.min_polar_angle = polar;
        self.max_polar_angle = polar;
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.x -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.y -= angle;
    }

    /// Applies a pointer drag of `delta` pixels over an element `element_height` tall.
    pub fn rotate_by_drag(&mut self, delta: Vec2, element_height: f32) {
        if element_height <= 0.0 {
            return;
        }

        self.rotate_left(TAU * delta.x / element_height * self.rotate_speed);
        self.rotate_up(TAU * delta.y / element_height * self.rotate_speed);
    }

    /// Moves the camera by the pending rotation and aims it at the target.
    /// Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let previous_eye = camera.eye;
        let mut spherical = Spherical::from_vec3(camera.eye - self.target);

        if self.enable_damping {
            spherical.theta += self.delta.x * self.damping_factor;
            spherical.phi += self.delta.y * self.damping_factor;
        } else {
            spherical.theta += self.delta.x;
            spherical.phi += self.delta.y;
        }

        spherical.phi = spherical.phi.clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();

        camera.eye = self.target + spherical.to_vec3();
        camera.look_at(self.target);
        self.spherical = spherical;

        if self.enable_damping {
            self.delta *= 1.0 - self.damping_factor;
        } else {
            self.delta = Vec2::ZERO;
        }

        camera.eye.distance_squared(previous_eye) > 1e-12
    }
}
