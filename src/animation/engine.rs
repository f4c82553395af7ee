use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{PlaybackError, Result},
    ops::{
        sum_keys, ContinuousOp, DiscreteOp, Modifiers, OpEffect, OperationRegistry, RollTiming,
        Stages, SumTable,
    },
    strip::{Frame, StepTransform},
};

use super::composer::StageComposer;
use super::playback::{self, PlaybackBuffer};

/// Engine shared between the input side and the animation thread
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Where the next frame comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Step the base frame and compose the sums
    Live,
    /// Pop recorded frames until the buffer is empty
    Playing,
}

/// Result of one animation tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// The new frame, only when it differs from the last shown one
    pub frame: Option<Frame>,
    /// How long to wait before the next tick
    pub delay: Duration,
}

/// Snapshot of animation state for the HTTP API
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub mode: Mode,
    pub recording: bool,
    pub alt: bool,
    pub gradient: bool,
    pub delay_ms: u64,
    pub step: StepTransform,
    pub buffered_frames: usize,
    pub pixel_count: usize,
}

/// The pixel composition and animation engine
///
/// Owns every piece of mutable animation state. Input collaborators call
/// [`Engine::apply_discrete`] and [`Engine::apply_continuous`]; the driver
/// calls [`Engine::tick`] once per frame.
pub struct Engine {
    pixel_count: usize,
    registry: OperationRegistry,
    sums: SumTable,
    composer: StageComposer,
    base: Frame,
    shown: Frame,
    modifiers: Modifiers,
    step: StepTransform,
    delay: Duration,
    default_delay: Duration,
    mode: Mode,
    recording: bool,
    playback: PlaybackBuffer,
}

impl Engine {
    /// Create an engine with sum slots for the given controls
    pub fn new<C>(pixel_count: usize, controls: C, timing: RollTiming) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            pixel_count,
            registry: OperationRegistry::new(timing),
            sums: SumTable::new(pixel_count, &sum_keys(), controls),
            composer: StageComposer::new(Stages::default()),
            base: Frame::new_black(pixel_count),
            shown: Frame::new_black(pixel_count),
            modifiers: Modifiers::default(),
            step: StepTransform::Identity,
            delay: timing.default_delay,
            default_delay: timing.default_delay,
            mode: Mode::Live,
            recording: false,
            playback: PlaybackBuffer::new(),
        }
    }

    /// Create an engine for the configured strip and control layout
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.strip.pixel_count,
            config.controls.keys().cloned(),
            config.animation.roll_timing(),
        )
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    /// Press (`on = true`) or release a discrete operation for one control
    ///
    /// Returns false when the operation or control is unknown; nothing
    /// changes in that case.
    pub fn apply_discrete(&mut self, control: &str, op: &str, on: bool) -> bool {
        let name = DiscreteOp::parse_from_str(op).map_or(op, |known| known.as_str());
        let Some(strategy) = self.registry.discrete(name) else {
            debug!("Ignoring unknown discrete operation {:?} from {}", op, control);
            return false;
        };
        let Some(deltas) = self.sums.get_mut(name, control) else {
            debug!("Ignoring {} from unknown control {:?}", name, control);
            return false;
        };

        let effect = strategy.apply(deltas, self.modifiers, on);
        if let Some(effect) = effect {
            self.apply_effect(effect);
        }
        true
    }

    /// Feed a new analog value to a continuous operation for one control
    pub fn apply_continuous(&mut self, control: &str, op: &str, value: f32) -> bool {
        let name = ContinuousOp::parse_from_str(op).map_or(op, |known| known.as_str());
        let Some(strategy) = self.registry.continuous(name) else {
            debug!("Ignoring unknown continuous operation {:?} from {}", op, control);
            return false;
        };
        let Some(deltas) = self.sums.get_mut(name, control) else {
            debug!("Ignoring {} from unknown control {:?}", name, control);
            return false;
        };

        let effect = strategy.apply(deltas, value);
        if let Some(effect) = effect {
            self.apply_effect(effect);
        }
        true
    }

    fn apply_effect(&mut self, effect: OpEffect) {
        match effect {
            OpEffect::SetAlt(alt) => self.modifiers.alt = alt,
            OpEffect::SetGradient(gradient) => self.modifiers.gradient = gradient,
            OpEffect::Snapshot => {
                self.base = self.shown.clone();
                self.sums.reset();
                debug!("Copied shown frame into base and reset all sums");
            }
            OpEffect::ToggleRecording => {
                self.recording = !self.recording;
                if self.recording {
                    self.mode = Mode::Live;
                    self.playback.clear();
                    info!("Started recording");
                } else {
                    info!("Stopped recording ({} frames)", self.playback.len());
                }
            }
            OpEffect::SetStep { step, delay } => {
                self.step = step;
                self.delay = delay;
            }
        }
    }

    /// Advance one frame
    pub fn tick(&mut self) -> Tick {
        let mut next = None;

        if self.mode == Mode::Playing {
            next = self.playback.pop();
            if next.is_none() {
                info!("Finished playback");
                self.mode = Mode::Live;
            }
        }

        let frame = match next {
            Some(frame) => frame,
            None => {
                self.base = self.step.apply(&self.base);
                self.compose()
            }
        };

        let changed = frame != self.shown;
        if changed {
            self.shown = frame;
        }

        if self.recording {
            self.playback.push(self.shown.clone());
        }

        Tick {
            frame: changed.then(|| self.shown.clone()),
            delay: self.delay,
        }
    }

    /// Compose the current base frame with every active contribution
    pub fn compose(&self) -> Frame {
        self.composer.compose(&self.base, &self.sums)
    }

    /// Replace the playback buffer and start playing
    ///
    /// Frames are popped from the end, so the last frame plays first.
    pub fn load_playback(&mut self, frames: Vec<Frame>) -> Result<()> {
        if frames.is_empty() {
            return Err(PlaybackError::Empty.into());
        }
        if let Some(bad) = frames.iter().find(|f| f.len() != self.pixel_count) {
            return Err(PlaybackError::FrameLength {
                expected: self.pixel_count,
                actual: bad.len(),
            }
            .into());
        }

        info!("Playing back {} frame(s)", frames.len());
        self.playback.load(frames);
        self.recording = false;
        self.mode = Mode::Playing;
        Ok(())
    }

    /// Play frames in the order they were recorded
    pub fn play_recording(&mut self, mut frames: Vec<Frame>) -> Result<()> {
        frames.reverse();
        self.load_playback(frames)
    }

    /// Load an image file and play its columns left to right
    pub fn play_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let frames = playback::load_image(path, self.pixel_count)?;
        self.play_recording(frames)
    }

    /// Current buffer contents as PNG bytes
    pub fn recording_png(&self) -> Result<Vec<u8>> {
        playback::encode_png(self.playback.frames())
    }

    /// Write the current buffer to a PNG file
    pub fn save_recording<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        playback::save_png(path, self.playback.frames())
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            mode: self.mode,
            recording: self.recording,
            alt: self.modifiers.alt,
            gradient: self.modifiers.gradient,
            delay_ms: self.delay.as_millis() as u64,
            step: self.step,
            buffered_frames: self.playback.len(),
            pixel_count: self.pixel_count,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    pub fn base(&self) -> &Frame {
        &self.base
    }

    pub fn shown(&self) -> &Frame {
        &self.shown
    }

    pub fn sums(&self) -> &SumTable {
        &self.sums
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn step(&self) -> StepTransform {
        self.step
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn playback(&self) -> &PlaybackBuffer {
        &self.playback
    }
}
