use glam::Vec3;

const EPS: f32 = 0.000_001;

/// Spherical coordinates with Y up. `phi` is the polar angle measured from +Y,
/// `theta` the azimuth around Y measured from +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_vec3(offset: Vec3) -> Self {
        let radius = offset.length();

        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }

        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec3(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;

        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keeps `phi` away from the poles where the azimuth degenerates.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_back_and_forth() {
        let offset = Vec3::new(10.0, 10.0, 18.0);
        let spherical = Spherical::from_vec3(offset);

        assert!((spherical.radius - offset.length()).abs() < 1e-4);
        assert!(spherical.to_vec3().abs_diff_eq(offset, 1e-4));
    }

    #[test]
    fn polar_angle_of_horizontal_offset_is_right_angle() {
        let spherical = Spherical::from_vec3(Vec3::new(3.0, 0.0, 4.0));
        assert!((spherical.phi - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
