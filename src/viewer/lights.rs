use glam::{Mat4, Vec3};

use crate::math::color::linear_from_hex;

/// Half size of the square each shadow camera covers.
const SHADOW_EXTENT: f32 = 12.0;
const SHADOW_DISTANCE: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
    /// The light shines from here toward the origin.
    pub position: Vec3,
    pub cast_shadow: bool,
}

impl DirectionalLight {
    fn new(hex: u32, intensity: f32, position: Vec3, cast_shadow: bool) -> Self {
        Self {
            color: linear_from_hex(hex),
            intensity,
            position,
            cast_shadow,
        }
    }

    /// Unit vector pointing from the scene toward the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or(Vec3::Y)
    }

    /// Orthographic view-projection of this light's shadow camera.
    pub fn shadow_view_proj(&self) -> Mat4 {
        let direction = self.direction();
        let up = if direction.abs_diff_eq(Vec3::Y, 1e-3) || direction.abs_diff_eq(-Vec3::Y, 1e-3) {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let view = Mat4::look_at_rh(direction * SHADOW_DISTANCE, Vec3::ZERO, up);
        let projection = Mat4::orthographic_rh(
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            0.5,
            SHADOW_DISTANCE * 2.0,
        );

        projection * view
    }
}

#[derive(Debug, Clone)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: Vec<DirectionalLight>,
    pub shadow_map_size: u32,
}

impl LightRig {
    pub const MAX_DIRECTIONAL: usize = 4;
    pub const MAX_SHADOW_CASTERS: usize = 3;

    /// White ambient fill, three white shadow-casting key lights and a teal
    /// rim light without shadows.
    pub fn showcase(shadow_map_size: u32) -> Self {
        Self {
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 1.0,
            },
            directional: vec![
                DirectionalLight::new(0xffffff, 0.8, Vec3::new(-5.0, 5.0, 5.0), true),
                DirectionalLight::new(0xffffff, 0.8, Vec3::new(5.0, 5.0, 5.0), true),
                DirectionalLight::new(0xffffff, 0.8, Vec3::new(0.0, 10.0, -10.0), true),
                DirectionalLight::new(0x00c0c3, 0.5, Vec3::new(5.0, 0.0, 5.0), false),
            ],
            shadow_map_size,
        }
    }

    pub fn shadow_casters(&self) -> impl Iterator<Item = &DirectionalLight> {
        self.directional
            .iter()
            .filter(|light| light.cast_shadow)
            .take(Self::MAX_SHADOW_CASTERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showcase_rig_has_three_shadow_casters_and_a_fill() {
        let rig = LightRig::showcase(2048);

        assert_eq!(rig.directional.len(), 4);
        assert_eq!(rig.shadow_casters().count(), 3);

        let fill = rig.directional[3];
        assert!(!fill.cast_shadow);
        assert_eq!(fill.intensity, 0.5);
        assert_eq!(fill.color.x, 0.0);
    }

    #[test]
    fn shadow_camera_sees_the_origin() {
        for light in LightRig::showcase(2048).shadow_casters() {
            let clip = light.shadow_view_proj() * Vec3::ZERO.extend(1.0);
            assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
            assert!(clip.z > 0.0 && clip.z < 1.0);
        }
    }
}
