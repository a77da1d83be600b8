use nalgebra_glm as glm;

/// Orbit camera around `target`, Y up. Yaw is measured about +Y from +Z,
/// pitch is the elevation above the XZ plane.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: [f32; 3],
    pub default_yaw: f32,
    pub default_pitch: f32,
    pub default_distance: f32,
    pub default_target: [f32; 3],
}

impl CameraState {
    pub fn new(yaw: f32, pitch: f32, distance: f32, target: [f32; 3]) -> Self {
        Self {
            yaw,
            pitch,
            distance,
            target,
            default_yaw: yaw,
            default_pitch: pitch,
            default_distance: distance,
            default_target: target,
        }
    }

    /// Camera at `eye` looking at `target`.
    pub fn from_position(eye: [f32; 3], target: [f32; 3]) -> Self {
        let offset = glm::vec3(eye[0] - target[0], eye[1] - target[1], eye[2] - target[2]);
        let distance = glm::length(&offset).max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(yaw, pitch, distance, target)
    }

    pub fn reset(&mut self) {
        self.yaw = self.default_yaw;
        self.pitch = self.default_pitch;
        self.distance = self.default_distance;
        self.target = self.default_target;
    }

    pub fn target(&self) -> glm::Vec3 {
        glm::vec3(self.target[0], self.target[1], self.target[2])
    }

    pub fn eye(&self) -> glm::Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target() + glm::vec3(sy * cp, sp, cy * cp) * self.distance
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        glm::look_at_rh(&self.eye(), &self.target(), &glm::vec3(0.0, 1.0, 0.0))
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_position([0.0, 1.5, 3.0], [0.0, 0.0, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_sits_at_start_position() {
        let eye = CameraState::default().eye();
        assert!((eye - glm::vec3(0.0, 1.5, 3.0)).norm() < 1e-5);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = CameraState::default();
        state.yaw = 2.0;
        state.distance = 40.0;
        state.target = [1.0, 2.0, 3.0];
        state.reset();
        assert_eq!(state, CameraState::default());
    }
}
