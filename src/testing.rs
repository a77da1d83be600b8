// Test doubles shared by the controller and app tests

use std::sync::Arc;

use crate::error::LoadError;
use crate::loader::{LoadCompletion, LoadQueue, LoadRequest};
use crate::model::{Clip, Curve, LoadedModel, Node, NodeKind, Track, TrackProperty};
use crate::scene::{ModelId, Placement, Scene, SceneEntry, SceneGraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    Attached(ModelId, String),
    Detached(ModelId),
}

/// A real `Scene` that also records every call made on it.
#[derive(Debug, Default)]
pub struct RecordingScene {
    inner: Scene,
    pub events: Vec<SceneEvent>,
}

impl RecordingScene {
    pub fn entry(&self, id: ModelId) -> Option<&SceneEntry> {
        self.inner.entry(id)
    }
}

impl SceneGraph for RecordingScene {
    fn attach(&mut self, model: &LoadedModel, placement: Placement) -> ModelId {
        let id = self.inner.attach(model, placement);
        self.events.push(SceneEvent::Attached(id, model.name.clone()));
        id
    }

    fn detach(&mut self, id: ModelId) -> bool {
        self.events.push(SceneEvent::Detached(id));
        self.inner.detach(id)
    }

    fn contains(&self, id: ModelId) -> bool {
        self.inner.contains(id)
    }

    fn resident_count(&self) -> usize {
        self.inner.resident_count()
    }
}

/// Keeps submitted requests until a test resolves them by hand.
#[derive(Debug, Default)]
pub struct ManualLoadQueue {
    pub requests: Vec<LoadRequest>,
    ready: Vec<LoadCompletion>,
}

impl ManualLoadQueue {
    pub fn latest(&self) -> Option<&LoadRequest> {
        self.requests.last()
    }

    pub fn resolve(&mut self, generation: u64, result: Result<LoadedModel, LoadError>) {
        let path = self
            .requests
            .iter()
            .find(|r| r.generation == generation)
            .map(|r| r.path.clone())
            .unwrap_or_default();
        self.ready.push(LoadCompletion {
            generation,
            path,
            result,
        });
    }

    pub fn resolve_latest(&mut self, result: Result<LoadedModel, LoadError>) {
        let generation = self.latest().map(|r| r.generation).unwrap_or(0);
        self.resolve(generation, result);
    }
}

impl LoadQueue for ManualLoadQueue {
    fn submit(&mut self, request: LoadRequest) {
        self.requests.push(request);
    }

    fn drain(&mut self) -> Vec<LoadCompletion> {
        std::mem::take(&mut self.ready)
    }
}

/// One root bone and `clips` clips of one second, each sliding the bone
/// along X by a different amount.
pub fn model_with_clips(name: &str, clips: usize) -> LoadedModel {
    let mut model = LoadedModel::new(name);
    model.nodes.push(Node::new("Hips", NodeKind::LimbNode));
    for i in 0..clips {
        let mut clip = Clip::new(format!("{name} #{i}"), 1.0);
        clip.tracks.push(Track {
            node: 0,
            property: TrackProperty::Translation,
            channels: [
                Some(Curve::new(vec![0.0, 1.0], vec![0.0, (i + 1) as f32])),
                None,
                None,
            ],
        });
        model.clips.push(Arc::new(clip));
    }
    model
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
