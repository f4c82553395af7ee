use thiserror::Error;

/// Main error type for the legacy-lights library
#[derive(Error, Debug)]
pub enum LightsError {
    #[error("Color conversion error: {0}")]
    Color(#[from] ColorError),

    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Color-space conversion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("Non-finite components in {space}: {components:?}")]
    NonFinite { space: String, components: [f64; 3] },

    #[error("Unknown color name: {name}")]
    UnknownName { name: String },
}

/// Operation registry and control binding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("Unknown control: {control}")]
    UnknownControl { control: String },

    #[error("Operation {op} cannot be bound to {kind} control {control}")]
    WrongCatalog {
        control: String,
        kind: String,
        op: String,
    },
}

/// Record/playback buffer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Playback buffer is empty")]
    Empty,

    #[error("Frame has {actual} pixels, strip has {expected}")]
    FrameLength { expected: usize, actual: usize },

    #[error("Image is {actual} pixels tall, strip has {expected}")]
    ImageHeight { expected: usize, actual: usize },
}

/// Render sink errors
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to open output device {path}: {reason}")]
    DeviceOpen { path: String, reason: String },

    #[error("Failed to write frame to {sink}: {reason}")]
    WriteFailed { sink: String, reason: String },

    #[error("Frame has {actual} pixels, strip has {expected}")]
    FrameLength { expected: usize, actual: usize },
}

/// Strip command language errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("Invalid repeat count in: {command}")]
    InvalidRepeat { command: String },

    #[error("Macro {name} replays itself")]
    RecursiveMacro { name: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using LightsError
pub type Result<T> = std::result::Result<T, LightsError>;

impl LightsError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is transient (the next frame may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Device hiccups and bad colors only affect the current frame
            Self::Io(_) => true,
            Self::Output(OutputError::WriteFailed { .. }) => true,
            Self::Color(ColorError::NonFinite { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Output(OutputError::DeviceOpen { path, .. }) => {
                format!("Could not open LED device '{}'. Is SPI enabled, or did you mean --no-hardware?", path)
            }
            Self::Playback(PlaybackError::ImageHeight { expected, actual }) => {
                format!("Recording image is {} pixels tall but the strip has {} LEDs.", actual, expected)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let write = LightsError::from(OutputError::WriteFailed {
            sink: "ws2801".to_string(),
            reason: "busy".to_string(),
        });
        assert!(write.is_recoverable());

        let open = LightsError::from(OutputError::DeviceOpen {
            path: "/dev/spidev0.0".to_string(),
            reason: "missing".to_string(),
        });
        assert!(!open.is_recoverable());
        assert!(open.user_message().contains("--no-hardware"));
    }

    #[test]
    fn test_generic_error() {
        let err = LightsError::generic("strip unplugged");
        assert_eq!(err.user_message(), "Generic error: strip unplugged");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_playback_message() {
        let err = LightsError::from(PlaybackError::ImageHeight {
            expected: 32,
            actual: 16,
        });
        assert_eq!(
            err.user_message(),
            "Recording image is 16 pixels tall but the strip has 32 LEDs."
        );
    }
}
