// Owns the actions of one model and advances them together

use crate::animation::action::{AnimationAction, LoopMode};
use crate::animation::pose::{NodePose, Pose};
use crate::model::{Clip, LoadedModel, TrackProperty};
use nalgebra_glm as glm;
use std::sync::Arc;

/// Index of an action inside the mixer that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(usize);

impl ActionHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    time: f32,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stopped action for `clip`.
    pub fn bind(&mut self, clip: Arc<Clip>) -> ActionHandle {
        let handle = ActionHandle(self.actions.len());
        self.actions.push(AnimationAction::new(clip));
        handle
    }

    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle.0)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle.0)
    }

    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    pub fn set_loop(&mut self, handle: ActionHandle, mode: LoopMode) -> bool {
        self.action_mut(handle).map(|a| a.loop_mode = mode).is_some()
    }

    pub fn play(&mut self, handle: ActionHandle) -> bool {
        self.action_mut(handle).map(AnimationAction::play).is_some()
    }

    pub fn fade_out(&mut self, handle: ActionHandle, duration: f32) -> bool {
        self.action_mut(handle).map(|a| a.fade_out(duration)).is_some()
    }

    pub fn playing_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_playing()).count()
    }

    /// Total time the mixer has been advanced.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance_all(&mut self, dt: f32) {
        self.time += dt;
        for action in &mut self.actions {
            action.update(dt);
        }
    }

    /// Blend every playing action over the bind pose of `model`.
    ///
    /// Per node and property the weighted samples are summed; when the total
    /// weight is below one the bind value fills the remainder, above one the
    /// samples are normalized.
    pub fn sample_pose(&self, model: &LoadedModel) -> Pose {
        let bind = Pose::bind(model);
        let node_count = model.nodes.len();

        let mut translation = vec![Accumulator::default(); node_count];
        let mut rotation = vec![QuatAccumulator::default(); node_count];
        let mut scaling = vec![Accumulator::default(); node_count];

        for action in &self.actions {
            if !action.is_playing() || action.weight <= 0.0 {
                continue;
            }
            let weight = action.weight;

            for track in &action.clip().tracks {
                let Some(node) = model.nodes.get(track.node) else {
                    continue;
                };
                let default = match track.property {
                    TrackProperty::Translation => node.bind.translation,
                    TrackProperty::Rotation => node.bind.rotation,
                    TrackProperty::Scaling => node.bind.scaling,
                };
                let mut value = default;
                for (axis, channel) in track.channels.iter().enumerate() {
                    if let Some(sample) = channel.as_ref().and_then(|c| c.sample(action.time)) {
                        value[axis] = sample;
                    }
                }

                match track.property {
                    TrackProperty::Translation => translation[track.node].add(value, weight),
                    TrackProperty::Scaling => scaling[track.node].add(value, weight),
                    TrackProperty::Rotation => {
                        let q = NodePose::rotation_of(&node.bind.pre_rotation, &value);
                        rotation[track.node].add(q, weight);
                    }
                }
            }
        }

        let locals = bind
            .locals
            .iter()
            .enumerate()
            .map(|(i, base)| NodePose {
                translation: translation[i].resolve(base.translation),
                rotation: rotation[i].resolve(base.rotation),
                scaling: scaling[i].resolve(base.scaling),
            })
            .collect();

        Pose { locals }
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: glm::Vec3,
    weight: f32,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sum: glm::vec3(0.0, 0.0, 0.0),
            weight: 0.0,
        }
    }
}

impl Accumulator {
    fn add(&mut self, value: glm::Vec3, weight: f32) {
        self.sum += value * weight;
        self.weight += weight;
    }

    fn resolve(&self, base: glm::Vec3) -> glm::Vec3 {
        if self.weight <= 0.0 {
            base
        } else if self.weight >= 1.0 {
            self.sum / self.weight
        } else {
            self.sum + base * (1.0 - self.weight)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct QuatAccumulator {
    sum: glm::Vec4,
    weight: f32,
}

impl Default for QuatAccumulator {
    fn default() -> Self {
        Self {
            sum: glm::vec4(0.0, 0.0, 0.0, 0.0),
            weight: 0.0,
        }
    }
}

impl QuatAccumulator {
    fn add(&mut self, q: glm::Quat, weight: f32) {
        let mut v = q.coords;
        // keep every sample in the hemisphere of the first one
        if self.weight > 0.0 && glm::dot(&self.sum, &v) < 0.0 {
            v = -v;
        }
        self.sum += v * weight;
        self.weight += weight;
    }

    fn resolve(&self, base: glm::Quat) -> glm::Quat {
        if self.weight <= 0.0 {
            return base;
        }
        let mut sum = self.sum;
        if self.weight < 1.0 {
            let mut b = base.coords;
            if glm::dot(&sum, &b) < 0.0 {
                b = -b;
            }
            sum += b * (1.0 - self.weight);
        }
        if glm::length(&sum) <= f32::EPSILON {
            return base;
        }
        glm::quat_normalize(&glm::Quat::new(sum[3], sum[0], sum[1], sum[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Curve, Node, NodeKind, Track};

    fn model_with_clip(values: [f32; 2]) -> (LoadedModel, Arc<Clip>) {
        let mut model = LoadedModel::new("test");
        model.nodes.push(Node::new("Hips", NodeKind::LimbNode));
        let mut clip = Clip::new("slide", 1.0);
        clip.tracks.push(Track {
            node: 0,
            property: TrackProperty::Translation,
            channels: [
                Some(Curve::new(vec![0.0, 1.0], values.to_vec())),
                None,
                None,
            ],
        });
        let clip = Arc::new(clip);
        model.clips.push(clip.clone());
        (model, clip)
    }

    #[test]
    fn handles_address_their_own_actions() {
        let (_, clip) = model_with_clip([0.0, 1.0]);
        let mut mixer = AnimationMixer::new();
        let a = mixer.bind(clip.clone());
        let b = mixer.bind(clip);
        assert_ne!(a, b);
        assert!(mixer.play(b));
        assert!(!mixer.action(a).unwrap().is_playing());
        assert!(mixer.action(b).unwrap().is_playing());
        assert!(!mixer.play(ActionHandle(7)));
    }

    #[test]
    fn advance_all_accumulates_time() {
        let (_, clip) = model_with_clip([0.0, 1.0]);
        let mut mixer = AnimationMixer::new();
        let a = mixer.bind(clip);
        mixer.play(a);
        mixer.advance_all(0.25);
        mixer.advance_all(0.5);
        assert_eq!(mixer.time(), 0.25 + 0.5);
        assert_eq!(mixer.action(a).unwrap().elapsed, 0.25 + 0.5);
    }

    #[test]
    fn sample_pose_without_playing_actions_is_bind_pose() {
        let (model, clip) = model_with_clip([4.0, 8.0]);
        let mut mixer = AnimationMixer::new();
        mixer.bind(clip);
        let pose = mixer.sample_pose(&model);
        assert_eq!(pose.locals[0].translation, glm::vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn sample_pose_reads_playing_track() {
        let (model, clip) = model_with_clip([0.0, 10.0]);
        let mut mixer = AnimationMixer::new();
        let a = mixer.bind(clip);
        mixer.play(a);
        mixer.advance_all(0.5);
        let pose = mixer.sample_pose(&model);
        assert!((pose.locals[0].translation.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn half_weight_blends_with_bind_pose() {
        let (model, clip) = model_with_clip([10.0, 10.0]);
        let mut mixer = AnimationMixer::new();
        let a = mixer.bind(clip);
        mixer.play(a);
        mixer.action_mut(a).unwrap().weight = 0.5;
        let pose = mixer.sample_pose(&model);
        assert!((pose.locals[0].translation.x - 5.0).abs() < 1e-5);
    }
}
