// Key presses in, asset loads and playback commands out

use nalgebra_glm as glm;
use std::sync::Arc;

use crate::animation::{ActionHandle, AnimationMixer, LoopMode, Pose};
use crate::controller::bindings::{FADE_OUT_SECONDS, binding_for};
use crate::error::LoadFailed;
use crate::loader::{LoadCompletion, LoadQueue, LoadRequest};
use crate::model::LoadedModel;
use crate::scene::{ModelId, Placement, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has loaded yet.
    Empty,
    Ready,
    /// A model is shown and a replacement is being loaded.
    Swapping,
}

/// One clip of the resident model bound to a mixer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSlot {
    pub index: usize,
    pub handle: ActionHandle,
    pub loop_mode: LoopMode,
}

/// The model currently in the scene, with the mixer driving its clips.
#[derive(Debug)]
pub struct Resident {
    id: ModelId,
    model: Arc<LoadedModel>,
    mixer: AnimationMixer,
}

impl Resident {
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn model(&self) -> &Arc<LoadedModel> {
        &self.model
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }
}

#[derive(Debug, Clone)]
struct PendingLoad {
    generation: u64,
    auto_play_first: bool,
}

pub struct ModelAnimationController<S: SceneGraph, Q: LoadQueue> {
    scene: S,
    queue: Q,
    resident: Option<Resident>,
    slots: Vec<AnimationSlot>,
    active_slot_index: usize,
    /// Active slot as of the last load that installed a model.
    committed_slot: usize,
    generation: u64,
    latest: Option<PendingLoad>,
    in_flight: usize,
    last_error: Option<LoadFailed>,
    placement: Placement,
}

impl<S: SceneGraph, Q: LoadQueue> ModelAnimationController<S, Q> {
    pub fn new(scene: S, queue: Q) -> Self {
        Self {
            scene,
            queue,
            resident: None,
            slots: Vec::new(),
            active_slot_index: 0,
            committed_slot: 0,
            generation: 0,
            latest: None,
            in_flight: 0,
            last_error: None,
            placement: Placement::standard(),
        }
    }

    /// Request `asset_path`. The swap happens when the completion comes back
    /// through [`poll_loads`](Self::poll_loads). Returns the request's
    /// generation.
    pub fn load_and_play(&mut self, asset_path: &str, auto_play_first: bool) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        self.latest = Some(PendingLoad {
            generation,
            auto_play_first,
        });
        self.in_flight += 1;
        self.queue.submit(LoadRequest {
            generation,
            path: asset_path.to_string(),
            auto_play_first,
        });

        log::debug!("requested {asset_path} (#{generation})");
        generation
    }

    /// Returns `false` for keys without a binding, which are ignored.
    pub fn request_animation(&mut self, key: char) -> bool {
        let Some(binding) = binding_for(key) else {
            return false;
        };

        self.fade_out_active();
        self.load_and_play(binding.asset_path, true);
        self.active_slot_index = binding.slot;
        true
    }

    fn fade_out_active(&mut self) {
        let index = self.active_slot_index;
        let Some(resident) = self.resident.as_mut() else {
            log::debug!("no resident model, nothing to fade");
            return;
        };
        let Some(slot) = self.slots.get(index) else {
            log::debug!("{} has no slot {index}, nothing to fade", resident.model.name);
            return;
        };
        resident.mixer.fade_out(slot.handle, FADE_OUT_SECONDS);
    }

    /// Advance playback. Negative or non-finite deltas count as zero.
    pub fn tick(&mut self, delta_time: f32) {
        let dt = if delta_time.is_finite() && delta_time > 0.0 {
            delta_time
        } else {
            0.0
        };
        if let Some(resident) = self.resident.as_mut() {
            resident.mixer.advance_all(dt);
        }
    }

    /// Apply every completion the queue has received, in arrival order.
    pub fn poll_loads(&mut self) -> Vec<LoadFailed> {
        let completions = self.queue.drain();
        completions
            .into_iter()
            .filter_map(|c| self.on_load_complete(c).err())
            .collect()
    }

    pub fn on_load_complete(&mut self, completion: LoadCompletion) -> Result<(), LoadFailed> {
        self.in_flight = self.in_flight.saturating_sub(1);

        let pending = match self.latest.take() {
            Some(p) if p.generation == completion.generation => p,
            other => {
                self.latest = other;
                log::debug!(
                    "discarding superseded load of {} (#{})",
                    completion.path,
                    completion.generation
                );
                return Ok(());
            }
        };

        match completion.result {
            Ok(model) => {
                self.install(model, pending.auto_play_first);
                self.committed_slot = self.active_slot_index;
                self.last_error = None;
                Ok(())
            }
            Err(cause) => {
                let failed = LoadFailed::new(completion.path, cause);
                log::warn!("{failed}");
                self.active_slot_index = self.committed_slot;
                self.last_error = Some(failed.clone());
                Err(failed)
            }
        }
    }

    fn install(&mut self, model: LoadedModel, auto_play_first: bool) {
        if let Some(old) = self.resident.take() {
            self.scene.detach(old.id);
        }

        let model = Arc::new(model);
        let mut mixer = AnimationMixer::new();
        self.slots = model
            .clips
            .iter()
            .enumerate()
            .map(|(index, clip)| {
                let handle = mixer.bind(Arc::clone(clip));
                mixer.set_loop(handle, LoopMode::Repeat);
                AnimationSlot {
                    index,
                    handle,
                    loop_mode: LoopMode::Repeat,
                }
            })
            .collect();

        if auto_play_first {
            if let Some(first) = self.slots.first() {
                mixer.play(first.handle);
            }
        }

        let id = self.scene.attach(&model, self.placement);
        log::info!(
            "showing {} with {} clip(s) as #{}",
            model.name,
            self.slots.len(),
            id.raw()
        );
        self.resident = Some(Resident { id, model, mixer });
    }

    pub fn phase(&self) -> Phase {
        match (&self.resident, &self.latest) {
            (None, _) => Phase::Empty,
            (Some(_), Some(_)) => Phase::Swapping,
            (Some(_), None) => Phase::Ready,
        }
    }

    pub fn resident(&self) -> Option<&Resident> {
        self.resident.as_ref()
    }

    pub fn slots(&self) -> &[AnimationSlot] {
        &self.slots
    }

    pub fn is_slot_playing(&self, index: usize) -> bool {
        match (self.resident.as_ref(), self.slots.get(index)) {
            (Some(resident), Some(slot)) => resident
                .mixer
                .action(slot.handle)
                .is_some_and(|a| a.is_playing()),
            _ => false,
        }
    }

    pub fn active_slot_index(&self) -> usize {
        self.active_slot_index
    }

    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.resident.as_ref().map(|r| &r.mixer)
    }

    /// Loads submitted whose completion has not come back yet, superseded
    /// ones included.
    pub fn pending_loads(&self) -> usize {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&LoadFailed> {
        self.last_error.as_ref()
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Global node matrices of the resident model, placement included.
    pub fn pose(&self) -> Option<Vec<glm::Mat4>> {
        let resident = self.resident.as_ref()?;
        let pose: Pose = resident.mixer.sample_pose(&resident.model);
        Some(pose.global_matrices(&resident.model, &self.placement.matrix()))
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }
}
