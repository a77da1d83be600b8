use crate::controller::{ModelAnimationController, binding_for, initial_binding};
use crate::error::VisError;
use crate::loader::{AssetSource, AsyncLoadQueue, FbxLoader};
use crate::renderer::Renderer;
use crate::renderer::camera::{CameraController, CameraState};
use crate::renderer::line_vertex::LineVertex;
use crate::renderer::lines::{mesh_lines, skeleton_lines};
use crate::scene::{ModelId, Scene};
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

const WINDOW_TITLE: &str = "fbxvis-rs";

pub type Controller = ModelAnimationController<Scene, AsyncLoadQueue<FbxLoader>>;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

impl EventResponse {
    fn none() -> Self {
        Self {
            repaint: false,
            exit: false,
        }
    }
}

pub struct App {
    pub window: Arc<Window>,
    renderer: Renderer,
    camera_controller: CameraController,
    controller: Controller,
    settings: Settings,
    last_frame: Instant,
    shown: Option<ModelId>,
    lines: Vec<LineVertex>,
}

impl App {
    pub async fn new(window: Arc<Window>, runtime: Handle, settings: Settings) -> Result<Self, VisError> {
        let renderer = Renderer::new(Arc::clone(&window)).await?;

        let source = match &settings.assets.base_url {
            Some(url) => AssetSource::Remote(url.clone()),
            None => AssetSource::Local(settings.assets.asset_root.clone()),
        };
        log::info!("assets from {source:?}");

        let queue = AsyncLoadQueue::new(FbxLoader::new(source), runtime);
        let mut controller = ModelAnimationController::new(Scene::new(), queue);

        let binding = binding_for(settings.assets.initial_key).unwrap_or_else(|| {
            log::warn!(
                "initial key {:?} is not bound, using {:?}",
                settings.assets.initial_key,
                initial_binding().key
            );
            initial_binding()
        });
        controller.load_and_play(binding.asset_path, true);

        Ok(Self {
            window,
            renderer,
            camera_controller: CameraController::new(CameraState::default()),
            controller,
            settings,
            last_frame: Instant::now(),
            shown: None,
            lines: Vec::new(),
        })
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        match event {
            WindowEvent::CloseRequested => {
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return EventResponse::none();
                }
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        return EventResponse {
                            repaint: false,
                            exit: true,
                        };
                    }
                    Key::Character(text) => {
                        if let Some(key) = text.chars().next() {
                            if key.eq_ignore_ascii_case(&'r') {
                                self.camera_controller.reset();
                            }
                            self.controller.request_animation(key);
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let is_pressed = *state == ElementState::Pressed;
                self.camera_controller.on_mouse_button(*button, is_pressed);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.camera_controller
                    .on_modifiers(modifiers.state().shift_key());
            }
            WindowEvent::CursorMoved { position, .. } => {
                let moved = self
                    .camera_controller
                    .on_mouse_move((position.x, position.y));
                return EventResponse {
                    repaint: moved,
                    exit: false,
                };
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.02,
                };
                self.camera_controller.simple_zoom(amount);
            }
            _ => {}
        }

        EventResponse::none()
    }

    /// Pull finished loads, advance playback and draw one frame.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        for failed in self.controller.poll_loads() {
            log::error!("{failed}");
        }
        self.controller.tick(dt);
        self.update_title();

        let display = &self.settings.display;
        self.lines.clear();
        if let (Some(resident), Some(globals)) = (self.controller.resident(), self.controller.pose()) {
            let model = resident.model();
            if display.show_mesh {
                let root = self.controller.placement().matrix();
                mesh_lines(model, &globals, &root, &mut self.lines);
            }
            if display.show_skeleton {
                skeleton_lines(model, &globals, &mut self.lines);
            }
        }
        self.renderer.update_model_lines(&self.lines);

        self.renderer.camera = self.camera_controller.state().clone();
        self.renderer.render(&self.settings.display)
    }

    fn update_title(&mut self) {
        let Some(resident) = self.controller.resident() else {
            return;
        };
        if self.shown == Some(resident.id()) {
            return;
        }
        self.shown = Some(resident.id());
        self.window
            .set_title(&format!("{WINDOW_TITLE} - {}", resident.model().name));
    }

    pub fn resize_to_window(&mut self) {
        self.renderer.resize(self.window.inner_size());
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
