// Playback state of one clip bound to a model

use crate::model::Clip;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play to the end, hold the last frame and stop.
    Once,
    /// Wrap around forever.
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<Clip>,
    /// Local clip time, wrapped into `[0, duration]`.
    pub time: f32,
    /// Total time this action has advanced while playing.
    pub elapsed: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    playing: bool,
    fade: Option<Fade>,
}

impl AnimationAction {
    pub fn new(clip: Arc<Clip>) -> Self {
        Self {
            clip,
            time: 0.0,
            elapsed: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Repeat,
            playing: false,
            fade: None,
        }
    }

    pub fn clip(&self) -> &Arc<Clip> {
        &self.clip
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Start at full weight. Calling `play` on a playing action keeps its time.
    pub fn play(&mut self) {
        self.playing = true;
        self.weight = 1.0;
        self.fade = None;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
        self.fade = None;
    }

    /// Ramp the weight linearly to zero over `duration` seconds, then stop.
    /// Ignored when the action is not playing.
    pub fn fade_out(&mut self, duration: f32) {
        if !self.playing {
            return;
        }
        if duration <= 0.0 {
            self.weight = 0.0;
            self.stop();
            return;
        }
        self.fade = Some(Fade {
            from: self.weight,
            elapsed: 0.0,
            duration,
        });
    }

    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }

        self.elapsed += dt;
        self.advance_time(dt * self.time_scale);

        if let Some(fade) = &mut self.fade {
            fade.elapsed += dt;
            if fade.elapsed >= fade.duration {
                self.weight = 0.0;
                self.playing = false;
                self.fade = None;
            } else {
                self.weight = fade.from * (1.0 - fade.elapsed / fade.duration);
            }
        }
    }

    fn advance_time(&mut self, dt: f32) {
        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt;
        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.playing = false;
                }
            }
            LoopMode::Repeat => {
                if self.time >= duration {
                    self.time %= duration;
                }
            }
        }
    }
}
