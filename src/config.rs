use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    color::ChannelOrder,
    error::{ConfigError, Result},
    input::{ControlBinding, ControlKind},
    ops::RollTiming,
    output::spi::DEFAULT_DEVICE,
};

/// Main configuration for legacy-lights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Strip geometry and wiring
    pub strip: StripConfig,

    /// Animation timing
    pub animation: AnimationConfig,

    /// Hardware output
    pub output: OutputConfig,

    /// HTTP/WebSocket server
    pub server: ServerConfig,

    /// Recording files
    pub playback: PlaybackConfig,

    /// Control id → bound operation
    pub controls: BTreeMap<String, ControlBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strip: StripConfig::default(),
            animation: AnimationConfig::default(),
            output: OutputConfig::default(),
            server: ServerConfig::default(),
            playback: PlaybackConfig::default(),
            controls: default_controls(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.strip.validate()?;
        self.animation.validate()?;
        self.output.validate()?;
        self.server.validate()?;
        validate_controls(&self.controls)?;
        Ok(())
    }
}

/// Strip configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Number of LEDs
    pub pixel_count: usize,

    /// Byte order the LED chips expect
    pub channel_order: ChannelOrder,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            pixel_count: 32,
            channel_order: ChannelOrder::Bgr,
        }
    }
}

impl StripConfig {
    fn validate(&self) -> Result<()> {
        if self.pixel_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "strip.pixel_count".to_string(),
                value: self.pixel_count.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Animation timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Delay between ticks while nothing is rolling (ms)
    pub frame_delay_ms: u64,

    /// Delay at full roll speed (ms)
    pub min_delay_ms: u64,

    /// Delay at the slowest roll speed (ms)
    pub max_delay_ms: u64,

    /// Roll inputs at or below this magnitude stop the roll
    pub roll_dead_zone: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_delay_ms: 50,
            min_delay_ms: 10,
            max_delay_ms: 100,
            roll_dead_zone: 0.05,
        }
    }
}

impl AnimationConfig {
    fn validate(&self) -> Result<()> {
        if self.min_delay_ms == 0
            || self.min_delay_ms > self.frame_delay_ms
            || self.frame_delay_ms > self.max_delay_ms
        {
            return Err(ConfigError::InvalidValue {
                key: "animation.delay_range".to_string(),
                value: format!("{}<={}<={}", self.min_delay_ms, self.frame_delay_ms, self.max_delay_ms)
            }.into());
        }

        if !(0.0..1.0).contains(&self.roll_dead_zone) {
            return Err(ConfigError::InvalidValue {
                key: "animation.roll_dead_zone".to_string(),
                value: self.roll_dead_zone.to_string()
            }.into());
        }

        Ok(())
    }

    pub fn roll_timing(&self) -> RollTiming {
        RollTiming {
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            default_delay: Duration::from_millis(self.frame_delay_ms),
            dead_zone: self.roll_dead_zone,
        }
    }
}

/// Hardware output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Drive the SPI strip; when false frames are discarded
    pub hardware: bool,

    /// SPI device file
    pub device: PathBuf,

    /// Post frames to this strip server instead of the SPI device
    pub url: Option<String>,

    /// Request timeout for `url`
    pub timeout_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            hardware: true,
            device: PathBuf::from(DEFAULT_DEVICE),
            url: None,
            timeout_ms: 1000,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    key: "output.url".to_string(),
                    value: url.clone()
                }.into());
            }
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "output.timeout_ms".to_string(),
                value: self.timeout_ms.to_string()
            }.into());
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// HTTP/WebSocket server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Frames buffered per WebSocket viewer before it starts skipping
    pub frame_channel_capacity: usize,

    /// Raw input events queued for the activity monitor
    pub event_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            frame_channel_capacity: 16,
            event_queue_capacity: 64,
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.frame_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.frame_channel_capacity".to_string(),
                value: self.frame_channel_capacity.to_string()
            }.into());
        }

        if self.event_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.event_queue_capacity".to_string(),
                value: self.event_queue_capacity.to_string()
            }.into());
        }

        Ok(())
    }

    /// Address the server binds to
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Recording file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Where saved recordings are written
    pub recordings_dir: PathBuf,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from("recordings"),
        }
    }
}

fn validate_controls(controls: &BTreeMap<String, ControlBinding>) -> Result<()> {
    for (control, binding) in controls {
        if binding.kind.canonical_op(&binding.op).is_none() {
            return Err(ConfigError::InvalidValue {
                key: format!("controls.{}.op", control),
                value: binding.op.clone()
            }.into());
        }
    }

    Ok(())
}

/// Game controller layout: buttons and hat directions on discrete
/// operations, sticks and triggers on continuous ones
fn default_controls() -> BTreeMap<String, ControlBinding> {
    let layout = [
        ("a", ControlKind::Button, "Green"),
        ("b", ControlKind::Button, "Red"),
        ("x", ControlKind::Button, "Blue"),
        ("y", ControlKind::Button, "Orange"),
        ("lb", ControlKind::Button, "Alt"),
        ("rb", ControlKind::Button, "Copy"),
        ("back", ControlKind::Button, "Black"),
        ("start", ControlKind::Button, "Gradient"),
        ("logitech", ControlKind::Button, "Record"),
        ("lstick", ControlKind::Button, "Bright"),
        ("rstick", ControlKind::Button, "Dark"),
        ("up", ControlKind::Hat, "One"),
        ("down", ControlKind::Hat, "Rainbow"),
        ("left", ControlKind::Hat, "Evens"),
        ("right", ControlKind::Hat, "Odds"),
        ("lx", ControlKind::Axis, "Light"),
        ("ly", ControlKind::Axis, "Hue"),
        ("rx", ControlKind::Axis, "Red"),
        ("ry", ControlKind::Axis, "Blue"),
        ("lt", ControlKind::Trigger, "RollL"),
        ("rt", ControlKind::Trigger, "RollR"),
    ];

    layout
        .into_iter()
        .map(|(control, kind, op)| (control.to_string(), ControlBinding::new(kind, op)))
        .collect()
}
