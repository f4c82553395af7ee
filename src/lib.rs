//! # Legacy Lights
//!
//! Drive an addressable RGB LED strip from game controllers, HTTP clients and
//! recorded images.
//!
//! Each control owns a delta array per operation. Every frame the engine sums
//! those deltas in two stages, first in RGB and then in HSL, on top of a base
//! frame, and the animation driver pushes the result to a render sink.
//!
//! ## Quick Start
//!
//! ```rust
//! use legacy_lights::{
//!     animation::Engine,
//!     config::Config,
//! };
//!
//! let config = Config::default();
//! let mut engine = Engine::from_config(&config);
//!
//! // Button "b" is bound to Red; "rstick" to Dark
//! engine.apply_discrete("b", "Red", true);
//! engine.apply_discrete("rstick", "Dark", true);
//!
//! let frame = engine.tick().frame.unwrap();
//! assert_eq!(frame.get(0), Some([155, 0, 0]));
//! ```
//!
//! ## Architecture
//!
//! - [`ops`] - Operation catalogs, delta arrays and the sum table
//! - [`animation`] - Stage composer, engine, playback buffer and driver
//! - [`color`] - Color spaces, palettes and named colors
//! - [`strip`] - The shared strip model and whole-strip patterns
//! - [`output`] - Render sinks (SPI hardware, remote HTTP, null)
//! - [`input`] - Control bindings and the activity monitor
//! - [`server`] - HTTP and WebSocket surface
//! - [`script`] - The strip command language
//! - [`config`] - Configuration management
//!
//! ## Custom Render Sinks
//!
//! Anything that can take a frame can be driven by the engine by
//! implementing [`RenderSink`](output::RenderSink):
//!
//! ```rust,no_run
//! use legacy_lights::{output::RenderSink, strip::Frame, Result};
//!
//! struct Console;
//!
//! impl RenderSink for Console {
//!     fn name(&self) -> &str {
//!         "console"
//!     }
//!
//!     fn render(&mut self, frame: &Frame) -> Result<()> {
//!         tracing::info!("{:?}", frame.pixels());
//!         Ok(())
//!     }
//! }
//! ```

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod input;
pub mod ops;
pub mod output;
pub mod script;
pub mod server;
pub mod strip;
pub mod sync;

// Re-export commonly used types for convenience
pub use crate::{
    animation::{AnimationDriver, Engine},
    config::Config,
    error::{LightsError, Result},
    output::RenderSink,
    strip::{Frame, Strip},
};
