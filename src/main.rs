use winit::event_loop::{ControlFlow, EventLoop};

mod animation;
mod app;
mod controller;
mod error;
mod loader;
mod model;
mod renderer;
mod scene;
mod settings;
#[cfg(test)]
mod testing;

use crate::app::handler::AppHandler;
use crate::error::VisError;
use crate::settings::Settings;

pub const CONFY_APP_NAME: &str = "fbxvis-rs";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut settings = Settings::load();

    // Optional asset root (directory or http(s) base URL) for this run only
    if let Some(root) = std::env::args().nth(1) {
        if root.starts_with("http://") || root.starts_with("https://") {
            settings.assets.base_url = Some(root);
        } else {
            settings.assets.asset_root = root.into();
            settings.assets.base_url = None;
        }
    }

    let runtime = tokio::runtime::Runtime::new().map_err(|e| VisError::new("tokio-runtime").push_std(e))?;

    let event_loop = EventLoop::new().map_err(VisError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler::new(settings, runtime);
    event_loop.run_app(&mut handler).map_err(VisError::from)?;

    Ok(())
}
