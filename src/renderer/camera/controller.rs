use super::CameraState;
use nalgebra_glm as glm;

const MIN_DISTANCE: f32 = 0.25;
const MAX_DISTANCE: f32 = 100.0;

/// Mouse orbit controls: left drag rotates, right or middle drag pans,
/// the wheel zooms.
pub struct CameraController {
    state: CameraState,
    left_mouse_pressed: bool,
    middle_mouse_pressed: bool,
    right_mouse_pressed: bool,
    shift_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(state: CameraState) -> Self {
        Self {
            state,
            left_mouse_pressed: false,
            middle_mouse_pressed: false,
            right_mouse_pressed: false,
            shift_pressed: false,
            last_mouse_pos: None,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn on_mouse_button(&mut self, button: winit::event::MouseButton, pressed: bool) {
        match button {
            winit::event::MouseButton::Left => self.left_mouse_pressed = pressed,
            winit::event::MouseButton::Middle => self.middle_mouse_pressed = pressed,
            winit::event::MouseButton::Right => self.right_mouse_pressed = pressed,
            _ => return,
        }
        if !pressed {
            self.last_mouse_pos = None;
        }
    }

    pub fn on_modifiers(&mut self, shift: bool) {
        self.shift_pressed = shift;
    }

    /// Returns whether the camera moved.
    pub fn on_mouse_move(&mut self, position: (f64, f64)) -> bool {
        let should_pan = self.middle_mouse_pressed
            || self.right_mouse_pressed
            || (self.shift_pressed && self.left_mouse_pressed);
        let should_rotate = self.left_mouse_pressed && !should_pan;

        if !should_pan && !should_rotate {
            self.last_mouse_pos = None;
            return false;
        }

        let mut handled = false;
        if let Some(last_pos) = self.last_mouse_pos {
            let delta_x = (position.0 - last_pos.0) as f32;
            let delta_y = (position.1 - last_pos.1) as f32;
            if should_pan {
                self.pan(delta_x, delta_y);
            } else {
                self.rotate(delta_x, delta_y);
            }
            handled = true;
        }
        self.last_mouse_pos = Some(position);
        handled
    }

    fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.state.yaw -= delta_x * 0.01;
        self.state.pitch += delta_y * 0.01;
        self.state.pitch = self.state.pitch.clamp(-1.5, 1.5);
    }

    fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = glm::normalize(&(self.state.target() - self.state.eye()));
        let right = glm::normalize(&glm::cross(&forward, &glm::vec3(0.0, 1.0, 0.0)));
        let up = glm::cross(&right, &forward);

        let pan_speed = self.state.distance * 0.002;
        let offset = (-right * delta_x + up * delta_y) * pan_speed;

        self.state.target[0] += offset.x;
        self.state.target[1] += offset.y;
        self.state.target[2] += offset.z;
    }

    /// Positive `delta` moves closer.
    pub fn simple_zoom(&mut self, delta: f32) {
        let zoom_factor = 1.0 - delta * 0.1;
        self.state.distance = (self.state.distance * zoom_factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.last_mouse_pos = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::MouseButton;

    #[test]
    fn left_drag_rotates_around_target() {
        let mut controller = CameraController::new(CameraState::default());
        let before = controller.state().clone();

        controller.on_mouse_button(MouseButton::Left, true);
        assert!(!controller.on_mouse_move((100.0, 100.0)));
        assert!(controller.on_mouse_move((150.0, 100.0)));

        let state = controller.state();
        assert!((state.yaw - (before.yaw - 0.5)).abs() < 1e-6);
        assert_eq!(state.target, before.target);
        assert!((state.distance - before.distance).abs() < 1e-6);
    }

    #[test]
    fn right_drag_pans_target() {
        let mut controller = CameraController::new(CameraState::default());
        controller.on_mouse_button(MouseButton::Right, true);
        controller.on_mouse_move((0.0, 0.0));
        controller.on_mouse_move((10.0, 0.0));
        assert_ne!(controller.state().target, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn moving_without_buttons_does_nothing() {
        let mut controller = CameraController::new(CameraState::default());
        assert!(!controller.on_mouse_move((1.0, 1.0)));
        assert!(!controller.on_mouse_move((50.0, 9.0)));
        assert_eq!(controller.state(), &CameraState::default());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut controller = CameraController::new(CameraState::default());
        for _ in 0..200 {
            controller.simple_zoom(5.0);
        }
        assert_eq!(controller.state().distance, MIN_DISTANCE);
        for _ in 0..200 {
            controller.simple_zoom(-5.0);
        }
        assert_eq!(controller.state().distance, MAX_DISTANCE);

        controller.reset();
        assert_eq!(controller.state(), &CameraState::default());
    }
}
