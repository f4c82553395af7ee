//! The LED strip: frame types and the shared strip model.

pub mod model;
pub mod pattern;
pub mod types;

pub use model::{SharedStrip, Strip, StripSink};
pub use pattern::Pattern;
pub use types::{Frame, StepTransform};
