pub mod imgui_renderer;
pub mod instance;
pub mod light_uniform;
pub mod passes;
pub mod render_common;
pub mod render_mesh;
pub mod renderer;
pub mod shader_loader;
pub mod texture;
pub mod viewport;
