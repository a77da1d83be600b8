use crate::app::app::App;
use crate::error::VisError;
use crate::settings::Settings;
use std::sync::Arc;
use tokio::runtime::Runtime;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

pub struct AppHandler {
    pub app: Option<App>,
    settings: Option<Settings>,
    pub runtime: Runtime,
}

impl AppHandler {
    pub fn new(settings: Settings, runtime: Runtime) -> Self {
        Self {
            app: None,
            settings: Some(settings),
            runtime,
        }
    }

    fn create_app(&mut self, event_loop: &ActiveEventLoop) -> Result<App, VisError> {
        let window_attrs = Window::default_attributes()
            .with_title("fbxvis-rs")
            .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let settings = self.settings.take().unwrap_or_else(Settings::load);
        let runtime_handle = self.runtime.handle().clone();
        self.runtime
            .block_on(App::new(window, runtime_handle, settings))
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match self.create_app(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                log::error!("failed to start: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                app.settings().display.save();
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            match app.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    app.resize_to_window();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("surface out of memory");
                    event_loop.exit();
                }
                Err(e) => log::warn!("render error: {e:?}"),
            }
            app.window.request_redraw();
        }
    }
}
