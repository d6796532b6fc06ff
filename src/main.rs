use anyhow::Result;

mod asset;
mod background;
mod camera;
mod config;
mod engine;
mod math;
mod mesh;
mod page;
mod rendering;
mod scene_graph;
mod viewer;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run())?;

    Ok(())
}
