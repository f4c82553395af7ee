use serde::{Deserialize, Serialize};

use crate::color::{ChannelOrder, Rgb};

/// Represents one frame of the LED strip
///
/// An ordered, fixed-length sequence of RGB pixels. Index 0 is the LED
/// closest to the controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pixels: Vec<Rgb>,
}

impl Frame {
    /// Create a frame from pixels
    pub fn new(pixels: Vec<Rgb>) -> Self {
        Self { pixels }
    }

    /// Create a frame of `len` black pixels
    pub fn new_black(len: usize) -> Self {
        Self::new_filled(len, [0, 0, 0])
    }

    /// Create a frame of `len` pixels of the same color
    pub fn new_filled(len: usize, color: Rgb) -> Self {
        Self {
            pixels: vec![color; len],
        }
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Get a pixel, or None past the end
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    /// Set a pixel; indexes past the end are ignored
    pub fn set(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    /// Set every pixel to one color
    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Roll pixel positions: pixel `i` moves to `(i + shift) mod len`
    pub fn rotated(&self, shift: i32) -> Frame {
        let mut pixels = self.pixels.clone();
        if !pixels.is_empty() {
            let len = pixels.len() as i64;
            let shift = i64::from(shift).rem_euclid(len) as usize;
            pixels.rotate_right(shift);
        }
        Frame { pixels }
    }

    /// Flatten to bytes in the given channel order
    pub fn to_bytes(&self, order: ChannelOrder) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&pixel| order.encode(pixel))
            .collect()
    }

    /// Build a frame of `len` pixels from flat bytes in the given order
    ///
    /// Missing trailing bytes leave the remaining pixels black.
    pub fn from_bytes(bytes: &[u8], order: ChannelOrder, len: usize) -> Frame {
        let mut frame = Frame::new_black(len);
        for (index, chunk) in bytes.chunks_exact(3).take(len).enumerate() {
            frame.set(index, order.decode([chunk[0], chunk[1], chunk[2]]));
        }
        frame
    }
}

impl From<Vec<Rgb>> for Frame {
    fn from(pixels: Vec<Rgb>) -> Self {
        Self::new(pixels)
    }
}

/// Positional transform applied to the base frame on every live tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "delta", rename_all = "snake_case")]
pub enum StepTransform {
    #[default]
    Identity,
    RotateBy(i32),
}

impl StepTransform {
    /// Apply the transform, producing the next base frame
    pub fn apply(self, frame: &Frame) -> Frame {
        match self {
            Self::Identity => frame.clone(),
            Self::RotateBy(delta) => frame.rotated(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = [255, 0, 0];
    const GREEN: Rgb = [0, 255, 0];
    const BLUE: Rgb = [0, 0, 255];

    #[test]
    fn test_rotation_follows_roll_semantics() {
        let frame = Frame::new(vec![RED, GREEN, BLUE]);

        assert_eq!(frame.rotated(1).pixels(), &[BLUE, RED, GREEN]);
        assert_eq!(frame.rotated(-1).pixels(), &[GREEN, BLUE, RED]);
        assert_eq!(frame.rotated(3), frame);
        assert_eq!(Frame::new_black(0).rotated(5).len(), 0);
    }

    #[test]
    fn test_step_transform() {
        let frame = Frame::new(vec![RED, GREEN, BLUE]);
        assert_eq!(StepTransform::Identity.apply(&frame), frame);
        assert_eq!(StepTransform::RotateBy(-1).apply(&frame), frame.rotated(-1));
    }

    #[test]
    fn test_bytes_in_channel_order() {
        let frame = Frame::new(vec![RED, BLUE]);
        assert_eq!(frame.to_bytes(ChannelOrder::Rgb), vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(frame.to_bytes(ChannelOrder::Bgr), vec![0, 0, 255, 255, 0, 0]);

        let back = Frame::from_bytes(&[0, 0, 255, 255], ChannelOrder::Bgr, 2);
        assert_eq!(back.pixels(), &[RED, [0, 0, 0]]);
    }

    #[test]
    fn test_set_ignores_out_of_range() {
        let mut frame = Frame::new_black(2);
        frame.set(5, RED);
        frame.set(1, GREEN);
        assert_eq!(frame.pixels(), &[[0, 0, 0], GREEN]);
    }
}
