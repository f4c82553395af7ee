//! # Strip command language
//!
//! Drives the strip directly from a list of commands, one per argument:
//!
//! - `0.5` pauses for that many seconds
//! - `red`, `rainbow` fill the strip with a CSS color or a pattern
//! - `3*red` repeats a command
//! - `blink:` ... `blink.` records a macro, `blink` replays it
//! - `sample path.png` plays an image one column per frame

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use rand::{rngs::SmallRng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    color::name_to_rgb,
    error::{Result, ScriptError},
    strip::{Pattern, Strip},
};

/// Command run when none are given
pub const DEFAULT_COMMAND: &str = "white";

/// Pause between image columns
pub const SAMPLE_FRAME_DELAY: Duration = Duration::from_millis(50);

pub struct ScriptRunner {
    strip: Strip,
    macros: HashMap<String, Vec<String>>,
    recording: Option<String>,
    sample_next: bool,
    replaying: Vec<String>,
    sleep: bool,
    rng: SmallRng,
}

impl ScriptRunner {
    pub fn new(strip: Strip) -> Self {
        Self {
            strip,
            macros: HashMap::new(),
            recording: None,
            sample_next: false,
            replaying: Vec::new(),
            sleep: true,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Skip pauses; commands still run in order
    pub fn without_sleep(mut self) -> Self {
        self.sleep = false;
        self
    }

    pub fn strip(&self) -> &Strip {
        &self.strip
    }

    /// Clear the strip and run every command
    pub fn run<I, S>(&mut self, commands: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut commands: Vec<String> = commands
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        if commands.is_empty() {
            commands.push(DEFAULT_COMMAND.to_string());
        }

        self.strip.clear();
        for command in &commands {
            self.handle(command)?;
        }

        if let Some(name) = &self.recording {
            warn!("Macro {} was never closed with '{}.'", name, name);
        }
        Ok(())
    }

    /// Run a single command
    pub fn handle(&mut self, command: &str) -> Result<()> {
        if let Some(name) = self.recording.clone() {
            let closes = command
                .strip_suffix('.')
                .is_some_and(|c| c.eq_ignore_ascii_case(&name));
            if closes {
                debug!("Recorded macro {}", name);
                self.recording = None;
            } else {
                self.macros.entry(name).or_default().push(command.to_string());
            }
            return Ok(());
        }

        if let Ok(seconds) = command.trim().parse::<f64>() {
            match Duration::try_from_secs_f64(seconds) {
                Ok(pause) => self.pause(pause),
                Err(_) => warn!("Ignoring pause of {} seconds", seconds),
            }
            return Ok(());
        }

        if self.sample_next {
            self.sample_next = false;
            return self.play_sample(command);
        }

        let command = command.trim().to_lowercase();
        if let Some(name) = command.strip_suffix(':') {
            debug!("Recording macro {}", name);
            self.macros.insert(name.to_string(), Vec::new());
            self.recording = Some(name.to_string());
            return Ok(());
        }

        if command == "sample" {
            self.sample_next = true;
            return Ok(());
        }

        if let Some((count, inner)) = command.split_once('*') {
            let count: usize = count
                .trim()
                .parse()
                .map_err(|_| ScriptError::InvalidRepeat { command: command.clone() })?;
            for _ in 0..count {
                self.handle(inner)?;
            }
        } else if let Some(steps) = self.macros.get(&command).cloned() {
            self.replay(&command, &steps)?;
        } else if let Some(pattern) = Pattern::parse_from_str(&command) {
            pattern.apply(&mut self.strip, &mut self.rng);
        } else if let Some(color) = name_to_rgb(&command) {
            self.strip.fill(color);
        } else {
            return Err(ScriptError::UnknownCommand { command }.into());
        }

        self.strip.show()
    }

    fn replay(&mut self, name: &str, steps: &[String]) -> Result<()> {
        if self.replaying.iter().any(|active| active == name) {
            return Err(ScriptError::RecursiveMacro { name: name.to_string() }.into());
        }

        self.replaying.push(name.to_string());
        let result = steps.iter().try_for_each(|step| self.handle(step));
        self.replaying.pop();
        result
    }

    /// Show each image column in turn; pixel y lights LED y
    fn play_sample(&mut self, path: &str) -> Result<()> {
        let image = image::open(Path::new(path))?.to_rgb8();
        info!("Playing {} ({} columns)", path, image.width());

        for x in 0..image.width() {
            for y in 0..image.height() {
                self.strip.set(y as usize, image.get_pixel(x, y).0);
            }
            self.strip.show()?;
            self.pause(SAMPLE_FRAME_DELAY);
        }
        Ok(())
    }

    fn pause(&self, duration: Duration) {
        if self.sleep {
            std::thread::sleep(duration);
        }
    }
}
