use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::viewer::lights::LightRig;

const MAX_DIRECTIONAL: usize = LightRig::MAX_DIRECTIONAL;
const MAX_SHADOW_CASTERS: usize = LightRig::MAX_SHADOW_CASTERS;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// xyz: unit vector toward the light
    pub direction: Vec4,
    /// rgb: color times intensity, w: shadow map layer or -1
    pub color: Vec4,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightsUniform {
    pub ambient: Vec4,
    pub directional: [DirectionalLightUniform; MAX_DIRECTIONAL],
    pub shadow_view_proj: [Mat4; MAX_SHADOW_CASTERS],
    pub directional_count: u32,
    pub shadow_count: u32,
    pub exposure: f32,
    /// Size of one shadow map texel in UV units, for PCF.
    pub shadow_texel: f32,
}

impl LightsUniform {
    pub fn new(rig: &LightRig, exposure: f32) -> Self {
        let mut directional = [DirectionalLightUniform::default(); MAX_DIRECTIONAL];
        let mut shadow_view_proj = [Mat4::IDENTITY; MAX_SHADOW_CASTERS];
        for (slot, light) in shadow_view_proj.iter_mut().zip(rig.shadow_casters()) {
            *slot = light.shadow_view_proj();
        }

        let mut shadow_count = 0;

        if rig.directional.len() > MAX_DIRECTIONAL {
            log::warn!(
                "Only {MAX_DIRECTIONAL} of {} directional lights are drawn",
                rig.directional.len()
            );
        }

        for (slot, light) in directional.iter_mut().zip(&rig.directional) {
            // Layers follow the order of `LightRig::shadow_casters`
            let layer = if light.cast_shadow && shadow_count < MAX_SHADOW_CASTERS {
                shadow_count += 1;
                (shadow_count - 1) as f32
            } else {
                -1.0
            };

            *slot = DirectionalLightUniform {
                direction: light.direction().extend(0.0),
                color: (light.color * light.intensity).extend(layer),
            };
        }

        Self {
            ambient: (rig.ambient.color * rig.ambient.intensity).extend(1.0),
            directional,
            shadow_view_proj,
            directional_count: rig.directional.len().min(MAX_DIRECTIONAL) as u32,
            shadow_count: shadow_count as u32,
            exposure,
            shadow_texel: 1.0 / rig.shadow_map_size.max(1) as f32,
        }
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights uniform buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showcase_rig_fills_shadow_layers_in_order() {
        let rig = LightRig::showcase(2048);
        let uniform = LightsUniform::new(&rig, 1.2);

        assert_eq!(uniform.directional_count, 4);
        assert_eq!(uniform.shadow_count, 3);

        let layers = uniform.directional.map(|light| light.color.w);
        assert_eq!(layers, [0.0, 1.0, 2.0, -1.0]);

        assert_eq!(uniform.shadow_view_proj[2], rig.directional[2].shadow_view_proj());
        assert_eq!(uniform.exposure, 1.2);
    }

    #[test]
    fn layout_matches_shader_struct() {
        // vec4 + 4 * (2 * vec4) + 3 * mat4 + 4 scalars
        assert_eq!(std::mem::size_of::<LightsUniform>(), 16 + 128 + 192 + 16);
    }
}
