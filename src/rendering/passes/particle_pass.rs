use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPassDescriptor,
    ShaderSource, StencilState,
};

use crate::{
    background::Background,
    camera::CameraUniform,
    config::ParticleFieldConfig,
    mesh::MeshData,
    rendering::{
        instance::{InstanceBuffer, ParticleInstance, PARTICLE_INSTANCE_VBL},
        passes::uniform_bind_group,
        render_common::RenderCommon,
        render_mesh::{RenderMesh, MESH_PRIMITIVE_STATE, MESH_VBL},
        shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
        texture::DepthTexture,
    },
};

const PARTICLE_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Particle shader",
    path: "particles.wgsl",
};

/// Clears the frame and draws every particle as an instanced sphere.
pub struct ParticlePass {
    pipeline_id: PipelineId,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    sphere: RenderMesh,
    instances: InstanceBuffer<ParticleInstance>,
    instance_data: Vec<ParticleInstance>,
}

pub struct ParticleTextureViews<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

impl ParticlePass {
    pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
        r: 0.004,
        g: 0.004,
        b: 0.008,
        a: 1.0,
    };

    pub fn create(
        device: &wgpu::Device,
        common: &RenderCommon,
        cache_builder: &mut PipelineCacheBuilder,
        config: &ParticleFieldConfig,
    ) -> Self {
        let camera_uniform = CameraUniform::default();
        let camera_buffer = camera_uniform.create_buffer(device, "Particle camera buffer");
        let (camera_bind_group_layout, camera_bind_group) = uniform_bind_group(
            device,
            "Particle camera",
            &camera_buffer,
            wgpu::ShaderStages::VERTEX,
        );

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle render pipeline layout"),
                bind_group_layouts: &[&camera_bind_group_layout],
                push_constant_ranges: &[],
            });

        let surface_format = common.surface_format();

        let pipeline_id = cache_builder.add_shader(
            PARTICLE_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(shader_def.name),
                        source: ShaderSource::Wgsl(source.into()),
                    });

                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Particle render pipeline"),
                        layout: Some(&render_pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[MESH_VBL, PARTICLE_INSTANCE_VBL],
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

        let sphere = MeshData::uv_sphere(config.radius, config.segments, config.segments);

        Self {
            pipeline_id,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            sphere: RenderMesh::from_mesh(device, &sphere),
            instances: InstanceBuffer::new(device, "Particle instance buffer", config.count),
            instance_data: Vec::with_capacity(config.count),
        }
    }

    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, background: &Background) {
        self.camera_uniform.update(&background.camera);
        self.camera_uniform.update_buffer(queue, &self.camera_buffer);

        self.instance_data.clear();
        self.instance_data
            .extend(background.field.particles.iter().map(ParticleInstance::from));
        self.instances.write(device, queue, &self.instance_data);
    }

    pub fn render(
        &self,
        texture_views: &ParticleTextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
    ) {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Particle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(Self::CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(pipeline) = pipeline_cache.get(self.pipeline_id) else {
            return;
        };

        if self.instances.is_empty() {
            return;
        }

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        self.instances.bind(&mut render_pass);
        self.sphere
            .draw_instanced(&mut render_pass, 0..self.instances.len() as u32);
    }
}
