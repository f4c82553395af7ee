use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    color::{ColorSpace, RgbSpace, Rgb},
    error::Result,
    output::RenderSink,
    sync::lock_recover,
};

use super::types::Frame;

/// Strip shared between the HTTP handlers and the animation thread
pub type SharedStrip = Arc<Mutex<Strip>>;

/// The physical strip as clients see it
///
/// Clients write raw values; `show` interprets them through the selected
/// color space, pushes the result to the hardware sink and publishes it to
/// subscribers. Pixel indexes wrap around the strip length.
pub struct Strip {
    raw: Frame,
    shown: Frame,
    space: Box<dyn ColorSpace>,
    sink: Box<dyn RenderSink>,
    frames: broadcast::Sender<Frame>,
}

impl Strip {
    pub fn new(pixel_count: usize, sink: Box<dyn RenderSink>, frames: broadcast::Sender<Frame>) -> Self {
        Self {
            raw: Frame::new_black(pixel_count),
            shown: Frame::new_black(pixel_count),
            space: Box::new(RgbSpace),
            sink,
            frames,
        }
    }

    pub fn into_shared(self) -> SharedStrip {
        Arc::new(Mutex::new(self))
    }

    pub fn pixel_count(&self) -> usize {
        self.raw.len()
    }

    /// Index modulo the strip length
    pub fn wrap(&self, index: usize) -> usize {
        match self.pixel_count() {
            0 => 0,
            n => index % n,
        }
    }

    /// Last shown (converted) color of a pixel
    pub fn get(&self, index: usize) -> Rgb {
        self.shown.get(self.wrap(index)).unwrap_or_default()
    }

    /// Raw value last written to a pixel
    pub fn get_raw(&self, index: usize) -> Rgb {
        self.raw.get(self.wrap(index)).unwrap_or_default()
    }

    pub fn set(&mut self, index: usize, color: Rgb) {
        let index = self.wrap(index);
        self.raw.set(index, color);
    }

    pub fn fill(&mut self, color: Rgb) {
        self.raw.fill(color);
    }

    /// Replace the raw pixels; extra pixels are dropped, missing ones go black
    pub fn set_frame(&mut self, frame: &Frame) {
        let len = self.pixel_count();
        let mut pixels = frame.pixels().to_vec();
        pixels.resize(len, [0, 0, 0]);
        self.raw = Frame::new(pixels);
    }

    pub fn clear(&mut self) {
        self.fill([0, 0, 0]);
    }

    /// Roll raw pixels: pixel `i` moves to `i + shift`
    pub fn rotate(&mut self, shift: i32) {
        self.raw = self.raw.rotated(shift);
    }

    pub fn raw(&self) -> &Frame {
        &self.raw
    }

    pub fn shown(&self) -> &Frame {
        &self.shown
    }

    pub fn space_name(&self) -> &'static str {
        self.space.name()
    }

    /// Select the color space raw values are interpreted in
    pub fn set_space(&mut self, space: Box<dyn ColorSpace>) {
        debug!("Strip color space: {} -> {}", self.space.name(), space.name());
        self.space = space;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames.subscribe()
    }

    /// Convert, render and publish the current raw pixels
    ///
    /// Subscribers are notified even when the hardware write fails; the
    /// error is returned to the caller.
    pub fn show(&mut self) -> Result<()> {
        let pixels = self
            .raw
            .pixels()
            .iter()
            .map(|&raw| {
                self.space.decode(raw).unwrap_or_else(|e| {
                    warn!("Showing raw pixel {:?}: {}", raw, e);
                    raw
                })
            })
            .collect();
        self.shown = Frame::new(pixels);

        let rendered = self.sink.render(&self.shown);
        // No subscribers is fine
        let _ = self.frames.send(self.shown.clone());
        rendered
    }
}

/// Render sink that routes engine frames through the shared strip
pub struct StripSink {
    strip: SharedStrip,
}

impl StripSink {
    pub fn new(strip: SharedStrip) -> Self {
        Self { strip }
    }
}

impl RenderSink for StripSink {
    fn name(&self) -> &str {
        "strip"
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        let mut strip = lock_recover(&self.strip);
        strip.set_frame(frame);
        strip.show()
    }
}
