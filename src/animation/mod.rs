// Clip playback: actions, the per-model mixer, pose blending and skinning

pub mod action;
pub mod mixer;
pub mod pose;
pub mod skinning;

pub use action::LoopMode;
pub use mixer::{ActionHandle, AnimationMixer};
pub use pose::Pose;
pub use skinning::skin_positions;
