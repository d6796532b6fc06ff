use glam::Mat4;
use wgpu::{Device, MultisampleState, PipelineCompilationOptions, ShaderSource, StencilState};

use crate::{
    rendering::{
        instance::MESH_INSTANCE_VBL,
        light_uniform::LightsUniform,
        passes::uniform_layout_entry,
        render_mesh::{MESH_PRIMITIVE_STATE, MESH_VBL},
        shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
        texture::{DepthTexture, ShadowMap},
    },
    viewer::lights::LightRig,
};

const SHADOW_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Shadow shader",
    path: "shadow.wgsl",
};

struct ShadowCaster {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Renders shadow casting meshes into one shadow map layer per light.
pub struct ShadowPass {
    pipeline_id: PipelineId,
    casters: Vec<ShadowCaster>,
}

impl ShadowPass {
    pub fn create(device: &wgpu::Device, cache_builder: &mut PipelineCacheBuilder) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow camera bind group layout"),
            entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let casters = (0..LightRig::MAX_SHADOW_CASTERS)
            .map(|index| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("Shadow camera buffer {index}")),
                    size: std::mem::size_of::<Mat4>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Shadow camera bind group {index}")),
                    layout: &bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });

                ShadowCaster { buffer, bind_group }
            })
            .collect();

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow render pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline_id = cache_builder.add_shader(
            SHADOW_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(shader_def.name),
                        source: ShaderSource::Wgsl(source.into()),
                    });

                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Shadow render pipeline"),
                        layout: Some(&render_pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[MESH_VBL, MESH_INSTANCE_VBL],
                            compilation_options: PipelineCompilationOptions::default(),
                        },
                        fragment: None,
                        primitive: MESH_PRIMITIVE_STATE,
                        depth_stencil: Some(wgpu::DepthStencilState {
                            format: DepthTexture::DEPTH_FORMAT,
                            depth_write_enabled: true,
                            depth_compare: wgpu::CompareFunction::LessEqual,
                            stencil: StencilState::default(),
                            bias: wgpu::DepthBiasState {
                                constant: 2,
                                slope_scale: 2.0,
                                clamp: 0.0,
                            },
                        }),
                        multisample: MultisampleState::default(),
                        multiview: None,
                        cache: None,
                    });

                    Ok(pipeline)
                },
            ),
        );

        Self {
            pipeline_id,
            casters,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, lights: &LightsUniform) {
        let active = lights.shadow_count as usize;
        let view_projs = lights.shadow_view_proj.iter().take(active);

        for (caster, view_proj) in self.casters.iter().zip(view_projs) {
            queue.write_buffer(&caster.buffer, 0, bytemuck::cast_slice(&[*view_proj]));
        }
    }

    /// Clears every layer and draws the casters of the active ones.
    /// `draw` binds the instance buffer and issues draws for shadow casting meshes.
    pub fn render(
        &self,
        shadow_map: &ShadowMap,
        active_layers: usize,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        draw: impl Fn(&mut wgpu::RenderPass<'_>),
    ) {
        let pipeline = pipeline_cache.get(self.pipeline_id);

        for (layer, caster) in self.casters.iter().enumerate() {
            let Some(view) = shadow_map.layer_view(layer) else {
                continue;
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let Some(pipeline) = pipeline else {
                continue;
            };

            if layer >= active_layers {
                continue;
            }

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &caster.bind_group, &[]);
            draw(&mut render_pass);
        }
    }
}
