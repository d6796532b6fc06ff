use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::PortfolioConfig,
    engine::{self, PortfolioState},
    rendering::renderer::Renderer,
};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    renderer: Option<Renderer>,
    state: PortfolioState,
    imgui: Option<ImguiState>,
    last_frame: Instant,
    /// Reported from `run` once the event loop has stopped.
    startup_error: Option<anyhow::Error>,
}

impl App {
    fn from_state(state: PortfolioState) -> Self {
        Self {
            renderer: None,
            state,
            imgui: None,
            last_frame: Instant::now(),
            startup_error: None,
        }
    }

    /// Outcome of the run once the event loop has returned.
    fn finish(self) -> anyhow::Result<()> {
        match self.startup_error {
            Some(error) => Err(error.context("Failed to start the portfolio")),
            None => Ok(()),
        }
    }

    fn setup_imgui(&mut self, window: &Window) {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 16.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 2,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        self.imgui = Some(ImguiState { context, platform });
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Portfolio")
            .with_inner_size(LogicalSize::new(1280.0, 800.0));
        let window = event_loop
            .create_window(window_attributes)
            .context("Failed to create window")?;

        self.setup_imgui(&window);
        let imgui = self
            .imgui
            .as_mut()
            .context("Imgui was not initialized")?;

        let size = window.inner_size();
        self.state.resize(size.width as f32, size.height as f32);

        let renderer = pollster::block_on(Renderer::new(
            Arc::new(window),
            &self.state,
            &mut imgui.context,
        ))?;
        self.renderer = Some(renderer);

        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(imgui)) = (self.renderer.as_mut(), self.imgui.as_mut()) else {
            return;
        };

        let delta_time = self.last_frame.elapsed();
        imgui.context.io_mut().update_delta_time(delta_time);
        self.last_frame = Instant::now();

        renderer.window.request_redraw();

        if let Err(error) = imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
        {
            log::error!("Failed to prepare imgui frame: {error}");
            return;
        }

        engine::run_frame(
            &mut self.state,
            &mut imgui.context,
            |state, page_frame, draw_data| match renderer.render(state, page_frame) {
                Ok(frame) => {
                    renderer.finish_frame(frame, draw_data);
                }
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.resize(renderer.size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory");
                    event_loop.exit();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    log::warn!("Timeout");
                }
                Err(other) => {
                    log::error!("Unexpected error: {:?}", other);
                }
            },
        );
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(error) = self.create_renderer(event_loop) {
            log::error!("Failed to initialize renderer: {error:#}");
            self.startup_error = Some(error);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
                self.state
                    .resize(new_size.width as f32, new_size.height as f32);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(renderer) = self.renderer.as_ref() {
                    let size = renderer.size;
                    self.state.background.set_pointer(
                        Vec2::new(position.x as f32, position.y as f32),
                        Vec2::new(size.width as f32, size.height as f32),
                    );
                }
            }
            _ => (),
        }

        if let (Some(renderer), Some(imgui)) = (self.renderer.as_ref(), self.imgui.as_mut()) {
            imgui.platform.handle_event::<()>(
                imgui.context.io_mut(),
                renderer.window.as_ref(),
                &Event::WindowEvent { window_id, event },
            );
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let state = PortfolioState::new(PortfolioConfig::from_env())
        .context("Failed to create portfolio state")?;
    let mut app = App::from_state(state);
    event_loop.run_app(&mut app)?;

    app.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::from_state(PortfolioState::new(PortfolioConfig::default()).unwrap())
    }

    #[test]
    fn clean_exit_is_ok() {
        assert!(app().finish().is_ok());
    }

    #[test]
    fn startup_failure_is_returned_after_the_loop_stops() {
        let mut app = app();
        app.startup_error = Some(anyhow::anyhow!("No suitable adapter"));

        let error = app.finish().unwrap_err();
        assert!(format!("{error:#}").contains("No suitable adapter"));
    }
}
