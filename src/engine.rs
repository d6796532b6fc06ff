use std::time::{Duration, Instant};

use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    background::Background,
    config::PortfolioConfig,
    page::{
        ui::{draw_page, PageFrame},
        Page,
    },
    viewer::{
        loader::{FileSource, ModelLoader},
        ModelViewer,
    },
};

/// Everything that lives for the whole session, independent of the GPU.
pub struct PortfolioState {
    /// Set when the first frame is laid out, so that window and GPU setup
    /// don't eat into the page's intro animations.
    clock_start: Option<Instant>,
    pub config: PortfolioConfig,
    pub background: Background,
    pub viewer: ModelViewer,
    pub page: Page,
    loader: Option<ModelLoader>,
}

impl PortfolioState {
    pub fn new(config: PortfolioConfig) -> anyhow::Result<Self> {
        let mut rng = StdRng::from_entropy();
        let background = Background::new(&config.particles, 1.0, 1.0, &mut rng);
        let viewer = ModelViewer::new(&config.viewer);
        let page = Page::new(config.page.clone(), Duration::ZERO);

        log::info!("Loading model from {}", config.assets.base.display());
        let loader = ModelLoader::spawn(FileSource, &config.assets)
            .context("Failed to start loading the model")?;

        Ok(Self {
            clock_start: None,
            config,
            background,
            viewer,
            page,
            loader: Some(loader),
        })
    }

    /// Time since the first frame. Zero during the first frame itself.
    pub fn frame_time(&mut self) -> Duration {
        self.clock_start.get_or_insert_with(Instant::now).elapsed()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.background.resize(width, height);
    }

    fn poll_loader(&mut self) {
        let Some(event) = self.loader.as_ref().and_then(ModelLoader::poll) else {
            return;
        };

        self.viewer.apply_load_event(event);
        self.loader = None;
        log::info!("Model viewer is {:?}", self.viewer.load_state());
    }
}

/// Runs one frame of page layout and animation.
pub fn update(state: &mut PortfolioState, ui: &imgui::Ui) -> PageFrame {
    state.poll_loader();

    let now = state.frame_time();
    let frame = draw_page(
        ui,
        &mut state.page,
        now,
        state.viewer.is_loading_indicator_visible(),
    );

    if let Some(container) = frame.model_container {
        state.viewer.resize_container(container.size);
    }
    state.viewer.orbit(frame.orbit_drag);

    state.background.update();
    state.viewer.update();

    frame
}

/// Lays out one frame inside a complete imgui frame and hands the draw data
/// to `present`. The imgui frame is closed even if `present` never draws it.
pub fn run_frame<T>(
    state: &mut PortfolioState,
    context: &mut imgui::Context,
    present: impl FnOnce(&mut PortfolioState, &PageFrame, &imgui::DrawData) -> T,
) -> T {
    let ui = context.new_frame();
    let frame = update(state, ui);
    let draw_data = context.render();

    present(state, &frame, draw_data)
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Mutex, MutexGuard, PoisonError},
        time::{Duration, Instant},
    };

    use super::*;
    use crate::viewer::LoadState;

    // Dear ImGui allows a single active context per process
    static IMGUI_LOCK: Mutex<()> = Mutex::new(());

    fn imgui_lock() -> MutexGuard<'static, ()> {
        IMGUI_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn headless_imgui() -> imgui::Context {
        let mut context = imgui::Context::create();
        context.set_ini_filename(None);
        context.io_mut().display_size = [1280.0, 800.0];
        context.fonts().build_rgba32_texture();
        context
    }

    fn state() -> PortfolioState {
        let mut state = PortfolioState::new(PortfolioConfig::default()).unwrap();
        state.resize(1280.0, 800.0);
        state
    }

    #[test]
    fn frame_reports_model_container_and_loads_model() {
        let _lock = imgui_lock();
        let mut imgui = headless_imgui();
        let mut state = state();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut frame = PageFrame::default();

        while state.viewer.load_state() == LoadState::Loading {
            assert!(Instant::now() < deadline, "model never loaded");

            frame = run_frame(&mut state, &mut imgui, |_, frame, _| *frame);
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(state.viewer.load_state(), LoadState::Loaded);
        assert!(!state.viewer.is_loading_indicator_visible());

        let container = frame.model_container.expect("model container was not laid out");
        assert!(container.size.x > 0.0 && container.size.y > 0.0);
        assert_eq!(state.viewer.container_size(), container.size);
    }

    #[test]
    fn frames_whose_draw_data_is_dropped_still_close() {
        let _lock = imgui_lock();
        let mut imgui = headless_imgui();
        let mut state = state();

        // A lost surface skips drawing, the next frame must still open cleanly
        run_frame(&mut state, &mut imgui, |_, _, _| ());
        run_frame(&mut state, &mut imgui, |_, _, _| ());

        let draw_lists = run_frame(&mut state, &mut imgui, |_, _, draw_data| {
            draw_data.draw_lists_count()
        });
        assert!(draw_lists > 0);
    }

    #[test]
    fn page_clock_starts_at_first_frame() {
        let _lock = imgui_lock();
        let mut imgui = headless_imgui();
        let mut state = state();

        // Window and GPU setup happen between construction and the first frame
        std::thread::sleep(Duration::from_millis(1200));

        let (now, title) = run_frame(&mut state, &mut imgui, |state, _, _| {
            (state.frame_time(), state.page.typewriter.text().to_string())
        });

        assert!(now < Duration::from_millis(100), "{now:?}");
        assert!(state.page.body_opacity(now) < 0.25);
        assert_eq!(title, "");
    }
}
