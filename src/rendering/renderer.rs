use std::sync::Arc;

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    engine::PortfolioState,
    page::ui::PageFrame,
    rendering::{
        imgui_renderer::ImguiRendererState,
        instance::{InstanceBuffer, MeshInstanceData},
        light_uniform::LightsUniform,
        passes::{
            model_pass::{ModelPass, ModelTextureViews},
            particle_pass::{ParticlePass, ParticleTextureViews},
            shadow_pass::ShadowPass,
        },
        render_common::RenderCommon,
        render_mesh::{RenderMesh, RenderMeshId},
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::{DepthTexture, ShadowMap},
        viewport::{crop_matrix, PixelRect},
    },
    scene_graph::Scene,
    viewer::lights::LightRig,
};

/// One mesh node of the model, drawn with a single instance.
struct MeshDraw {
    render_mesh: RenderMeshId,
    instance: u32,
    cast_shadow: bool,
}

/// A frame whose scene passes are recorded but which still needs the overlay.
pub struct FrameInProgress {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: RenderCommon,
    depth_texture: DepthTexture,
    shadow_map: ShadowMap,

    render_meshes: Arena<RenderMesh>,
    mesh_draws: Vec<MeshDraw>,
    mesh_instance_data: Vec<MeshInstanceData>,
    mesh_instances: InstanceBuffer<MeshInstanceData>,

    shader_loader: ShaderLoader,

    particle_pass: ParticlePass,
    shadow_pass: ShadowPass,
    model_pass: ModelPass,
    imgui: ImguiRendererState,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        state: &PortfolioState,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find a suitable adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let common = RenderCommon::new(&device, &adapter, &surface, size)?;
        let depth_texture = DepthTexture::new(&device, size, "Depth texture");

        let lights = &state.viewer.lights;
        let shadow_map = ShadowMap::new(
            &device,
            lights.shadow_map_size,
            LightRig::MAX_SHADOW_CASTERS as u32,
        );
        let lights_uniform = LightsUniform::new(lights, state.viewer.exposure);

        let mut cache_builder = PipelineCacheBuilder::new();

        let particle_pass = ParticlePass::create(
            &device,
            &common,
            &mut cache_builder,
            &state.config.particles,
        );
        let shadow_pass = ShadowPass::create(&device, &mut cache_builder);
        let model_pass = ModelPass::create(
            &device,
            &common,
            &mut cache_builder,
            &shadow_map,
            &lights_uniform,
        );

        let shader_loader = ShaderLoader::new(device.clone(), cache_builder)?;

        let imgui = ImguiRendererState::new(&device, &queue, common.surface_format(), imgui_context);
        let mesh_instances = InstanceBuffer::new(&device, "Model instance buffer", 16);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            shadow_map,
            render_meshes: Arena::new(),
            mesh_draws: Vec::new(),
            mesh_instance_data: Vec::new(),
            mesh_instances,
            shader_loader,
            particle_pass,
            shadow_pass,
            model_pass,
            imgui,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if self.common.resize(&self.device, &self.surface, new_size) {
            self.size = new_size;
            self.depth_texture.resize(&self.device, new_size);
        }
    }

    /// Uploads meshes that were added to the scene since the last frame.
    fn upload_meshes(&mut self, scene: &mut Scene) {
        for (_, scene_mesh) in scene.meshes.iter_mut() {
            if scene_mesh.render_mesh.is_some() {
                continue;
            }

            let render_mesh = RenderMesh::from_mesh(&self.device, &scene_mesh.mesh);
            scene_mesh.render_mesh = Some(self.render_meshes.alloc(render_mesh));
            log::debug!(
                "Uploaded mesh {} with {} triangles",
                scene_mesh.mesh.name,
                scene_mesh.mesh.triangle_count()
            );
        }
    }

    fn gather_mesh_draws(&mut self, scene: &Scene) {
        self.mesh_draws.clear();
        self.mesh_instance_data.clear();

        for instance in scene.mesh_instances() {
            let Some(render_mesh) = scene
                .get_mesh(instance.mesh_id)
                .and_then(|mesh| mesh.render_mesh)
            else {
                continue;
            };

            self.mesh_draws.push(MeshDraw {
                render_mesh,
                instance: self.mesh_instance_data.len() as u32,
                cast_shadow: instance.cast_shadow,
            });
            self.mesh_instance_data.push(MeshInstanceData::from(&instance));
        }

        self.mesh_instances
            .write(&self.device, &self.queue, &self.mesh_instance_data);
    }

    /// Records the background, shadow and model passes.
    pub fn render(
        &mut self,
        state: &mut PortfolioState,
        page_frame: &PageFrame,
    ) -> Result<FrameInProgress, wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        self.upload_meshes(&mut state.viewer.scene);
        self.gather_mesh_draws(&state.viewer.scene);

        self.particle_pass
            .update(&self.device, &self.queue, &state.background);

        let lights = LightsUniform::new(&state.viewer.lights, state.viewer.exposure);
        self.shadow_pass.update(&self.queue, &lights);

        let scale_factor = self.window.scale_factor() as f32;
        let model_viewport = page_frame
            .model_container
            .map(|rect| PixelRect::from_logical(rect, scale_factor))
            .and_then(|full| {
                full.clip_to(self.size.width, self.size.height)
                    .map(|visible| (full, visible))
            });

        if let Some((full, visible)) = model_viewport {
            self.model_pass.update(
                &self.queue,
                &state.viewer.camera,
                crop_matrix(full, visible),
                &lights,
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let pipeline_cache = &self.shader_loader.cache;

        self.particle_pass.render(
            &ParticleTextureViews {
                color: &view,
                depth: self.depth_texture.view(),
            },
            &mut encoder,
            pipeline_cache,
        );

        let draw_meshes = |render_pass: &mut wgpu::RenderPass<'_>, shadow_casters_only: bool| {
            self.mesh_instances.bind(render_pass);

            for draw in &self.mesh_draws {
                if shadow_casters_only && !draw.cast_shadow {
                    continue;
                }

                if let Some(mesh) = self.render_meshes.get(draw.render_mesh) {
                    mesh.draw_instanced(render_pass, draw.instance..draw.instance + 1);
                }
            }
        };

        if let Some((_, visible)) = model_viewport.filter(|_| !self.mesh_draws.is_empty()) {
            self.shadow_pass.render(
                &self.shadow_map,
                lights.shadow_count as usize,
                &mut encoder,
                pipeline_cache,
                |render_pass| draw_meshes(render_pass, true),
            );

            self.model_pass.render(
                &ModelTextureViews {
                    color: &view,
                    depth: self.depth_texture.view(),
                },
                visible,
                &mut encoder,
                pipeline_cache,
                |render_pass| draw_meshes(render_pass, false),
            );
        }

        Ok(FrameInProgress {
            output,
            view,
            encoder,
        })
    }

    /// Draws the overlay, submits and presents.
    pub fn finish_frame(&mut self, frame: FrameInProgress, draw_data: &imgui::DrawData) {
        let FrameInProgress {
            output,
            view,
            mut encoder,
        } = frame;

        if let Err(error) = self.imgui.render(
            &view,
            draw_data,
            &self.device,
            &self.queue,
            &mut encoder,
        ) {
            log::error!("{error:#}");
        }

        self.queue.submit([encoder.finish()]);
        output.present();
    }
}
