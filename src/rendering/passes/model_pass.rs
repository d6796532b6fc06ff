use glam::Mat4;
use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPassDescriptor,
    ShaderSource, StencilState,
};

use crate::{
    camera::{Camera, CameraUniform},
    rendering::{
        instance::MESH_INSTANCE_VBL,
        light_uniform::LightsUniform,
        passes::{uniform_bind_group, uniform_layout_entry},
        render_common::RenderCommon,
        render_mesh::{MESH_PRIMITIVE_STATE, MESH_VBL},
        shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
        texture::{DepthTexture, ShadowMap},
        viewport::PixelRect,
    },
};

const MODEL_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Model shader",
    path: "model.wgsl",
};

/// Lit, shadowed and tone mapped model, drawn on top of the background
/// inside the container rectangle only.
pub struct ModelPass {
    pipeline_id: PipelineId,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    lights_buffer: wgpu::Buffer,
    lights_bind_group: wgpu::BindGroup,
}

pub struct ModelTextureViews<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

impl ModelPass {
    pub fn create(
        device: &wgpu::Device,
        common: &RenderCommon,
        cache_builder: &mut PipelineCacheBuilder,
        shadow_map: &ShadowMap,
        lights: &LightsUniform,
    ) -> Self {
        let camera_uniform = CameraUniform::default();
        let camera_buffer = camera_uniform.create_buffer(device, "Model camera buffer");
        let (camera_bind_group_layout, camera_bind_group) = uniform_bind_group(
            device,
            "Model camera",
            &camera_buffer,
            wgpu::ShaderStages::VERTEX,
        );

        let lights_buffer = lights.create_buffer(device);

        let lights_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lights bind group layout"),
                entries: &[
                    uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2Array,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });

        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lights bind group"),
            layout: &lights_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: lights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow_map.array_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow_map.sampler()),
                },
            ],
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Model render pipeline layout"),
                bind_group_layouts: &[&camera_bind_group_layout, &lights_bind_group_layout],
                push_constant_ranges: &[],
            });

        let surface_format = common.surface_format();

        let pipeline_id = cache_builder.add_shader(
            MODEL_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(shader_def.name),
                        source: ShaderSource::Wgsl(source.into()),
                    });

                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Model render pipeline"),
                        layout: Some(&render_pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[MESH_VBL, MESH_INSTANCE_VBL],
                            compilation_options: PipelineCompilationOptions::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &shader,
                            entry_point: Some("fs_main"),
                            targets: &[Some(wgpu::ColorTargetState {
                                format: surface_format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: PipelineCompilationOptions::default(),
                        }),
                        primitive: MESH_PRIMITIVE_STATE,
                        depth_stencil: Some(wgpu::DepthStencilState {
                            format: DepthTexture::DEPTH_FORMAT,
                            depth_write_enabled: true,
                            depth_compare: wgpu::CompareFunction::Less,
                            stencil: StencilState::default(),
                            bias: DepthBiasState::default(),
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
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            lights_buffer,
            lights_bind_group,
        }
    }

    /// `crop` maps the camera's projection onto the visible part of the container.
    pub fn update(&mut self, queue: &wgpu::Queue, camera: &Camera, crop: Mat4, lights: &LightsUniform) {
        self.camera_uniform.update(camera);
        self.camera_uniform.crop(crop);
        self.camera_uniform.update_buffer(queue, &self.camera_buffer);
        lights.update_buffer(queue, &self.lights_buffer);
    }

    pub fn render(
        &self,
        texture_views: &ModelTextureViews,
        viewport: PixelRect,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        draw: impl FnOnce(&mut wgpu::RenderPass<'_>),
    ) {
        let Some(pipeline) = pipeline_cache.get(self.pipeline_id) else {
            return;
        };

        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Model pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_viewport(
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(
            viewport.x as u32,
            viewport.y as u32,
            viewport.width as u32,
            viewport.height as u32,
        );

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.lights_bind_group, &[]);
        draw(&mut render_pass);
    }
}
