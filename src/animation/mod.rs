//! # Animation
//!
//! The engine accumulates operation sums and composes frames; the driver
//! ticks it on its own thread at the delay the engine asks for.
//!
//! ```rust
//! use legacy_lights::animation::Engine;
//! use legacy_lights::ops::RollTiming;
//!
//! let mut engine = Engine::new(4, ["a"], RollTiming::default());
//! engine.apply_discrete("a", "Red", true);
//! let tick = engine.tick();
//! assert_eq!(tick.frame.unwrap().get(0), Some([255, 0, 0]));
//! ```

pub mod composer;
pub mod driver;
pub mod engine;
pub mod playback;

pub use composer::StageComposer;
pub use driver::{AnimationDriver, DriverHandle};
pub use engine::{Engine, EngineStatus, Mode, SharedEngine, Tick};
pub use playback::PlaybackBuffer;
