//! # Output
//!
//! Render sinks receive finished frames from the animation driver. A sink is
//! called synchronously, at most once per tick and only when the frame
//! changed, so it may block for the duration of one device write.

pub mod http;
pub mod spi;

use tracing::trace;

use crate::{error::Result, strip::Frame};

pub use http::HttpSink;
pub use spi::Ws2801Sink;

/// Destination for rendered frames
pub trait RenderSink: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Push one frame to the output
    fn render(&mut self, frame: &Frame) -> Result<()>;
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        (**self).render(frame)
    }
}

/// Discards every frame
#[derive(Debug, Default)]
pub struct NullSink {
    frames: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames received so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        self.frames += 1;
        trace!("Discarding frame {} ({} pixels)", self.frames, frame.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_counts_frames() {
        let mut sink = NullSink::new();
        sink.render(&Frame::new_black(4)).unwrap();
        sink.render(&Frame::new_black(4)).unwrap();
        assert_eq!(sink.frames(), 2);

        let boxed: Box<dyn RenderSink> = Box::new(sink);
        assert_eq!(boxed.name(), "null");
    }
}
