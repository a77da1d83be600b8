// Scene membership of models and their placement in the world

use crate::model::LoadedModel;
use nalgebra_glm as glm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

impl ModelId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// World placement applied to a model on top of its own root transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: glm::Vec3,
    pub scale: f32,
    /// Rotation about +Y, radians.
    pub yaw: f32,
}

impl Placement {
    /// Every asset is shown at the origin, scaled from centimetres to metres
    /// and turned to face the camera.
    pub fn standard() -> Self {
        Self {
            position: glm::vec3(0.0, 0.0, 0.0),
            scale: 0.01,
            yaw: std::f32::consts::PI,
        }
    }

    pub fn matrix(&self) -> glm::Mat4 {
        glm::translation(&self.position)
            * glm::rotation(self.yaw, &glm::vec3(0.0, 1.0, 0.0))
            * glm::scaling(&glm::vec3(self.scale, self.scale, self.scale))
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::standard()
    }
}

pub trait SceneGraph {
    fn attach(&mut self, model: &LoadedModel, placement: Placement) -> ModelId;

    /// Remove a model. Detaching an absent model is a no-op returning `false`.
    fn detach(&mut self, id: ModelId) -> bool;

    fn contains(&self, id: ModelId) -> bool;

    fn resident_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct SceneEntry {
    pub id: ModelId,
    pub name: String,
    pub placement: Placement,
}

#[derive(Debug, Default)]
pub struct Scene {
    entries: Vec<SceneEntry>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, id: ModelId) -> Option<&SceneEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

impl SceneGraph for Scene {
    fn attach(&mut self, model: &LoadedModel, placement: Placement) -> ModelId {
        self.next_id += 1;
        let id = ModelId(self.next_id);
        log::debug!("scene: attach {} as #{}", model.name, id.0);
        self.entries.push(SceneEntry {
            id,
            name: model.name.clone(),
            placement,
        });
        id
    }

    fn detach(&mut self, id: ModelId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            log::debug!("scene: detach #{}", id.0);
        }
        removed
    }

    fn contains(&self, id: ModelId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    fn resident_count(&self) -> usize {
        self.entries.len()
    }
}
