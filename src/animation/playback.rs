//! Record/playback buffer and its image representation.
//!
//! A sequence of frames maps onto an image one column per frame: pixel `y`
//! of column `x` is LED `y` of frame `x`.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{codecs::png::PngEncoder, ColorType, ImageBuffer, ImageEncoder, Rgb, RgbImage};

use crate::{
    error::{PlaybackError, Result},
    strip::Frame,
};

/// Captured frames, consumed last-in-first-out
#[derive(Debug, Clone, Default)]
pub struct PlaybackBuffer {
    frames: Vec<Frame>,
}

impl PlaybackBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole buffer
    pub fn load(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Remove the most recently appended frame
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Frames in append order
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Lay frames out as image columns
pub fn frames_to_image(frames: &[Frame]) -> Result<RgbImage> {
    let first = frames.first().ok_or(PlaybackError::Empty)?;
    let height = first.len();

    if let Some(bad) = frames.iter().find(|f| f.len() != height) {
        return Err(PlaybackError::FrameLength {
            expected: height,
            actual: bad.len(),
        }
        .into());
    }

    Ok(ImageBuffer::from_fn(frames.len() as u32, height as u32, |x, y| {
        Rgb(frames[x as usize].pixels()[y as usize])
    }))
}

/// Read image columns back as frames for a strip of `pixel_count` LEDs
pub fn frames_from_image(image: &RgbImage, pixel_count: usize) -> Result<Vec<Frame>> {
    if image.height() as usize != pixel_count {
        return Err(PlaybackError::ImageHeight {
            expected: pixel_count,
            actual: image.height() as usize,
        }
        .into());
    }

    Ok((0..image.width())
        .map(|x| {
            (0..image.height())
                .map(|y| image.get_pixel(x, y).0)
                .collect::<Vec<_>>()
                .into()
        })
        .collect())
}

/// Encode frames as PNG bytes
pub fn encode_png(frames: &[Frame]) -> Result<Vec<u8>> {
    let image = frames_to_image(frames)?;
    let mut bytes = Vec::new();
    PngEncoder::new(Cursor::new(&mut bytes)).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Decode an image (any supported format) into frames
pub fn decode_image(bytes: &[u8], pixel_count: usize) -> Result<Vec<Frame>> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    frames_from_image(&image, pixel_count)
}

/// Save frames as a PNG file
pub fn save_png<P: AsRef<Path>>(path: P, frames: &[Frame]) -> Result<()> {
    frames_to_image(frames)?.save(path)?;
    Ok(())
}

/// Save frames into `dir` under a timestamped name, creating `dir` if needed
pub fn save_timestamped<P: AsRef<Path>>(dir: P, frames: &[Frame]) -> Result<PathBuf> {
    let image = frames_to_image(frames)?;
    let file_name = chrono::Local::now()
        .format("recording-%Y%m%d-%H%M%S.png")
        .to_string();
    let path = dir.as_ref().join(file_name);

    std::fs::create_dir_all(dir.as_ref())?;
    image.save(&path)?;
    Ok(path)
}

/// Load frames from an image file
pub fn load_image<P: AsRef<Path>>(path: P, pixel_count: usize) -> Result<Vec<Frame>> {
    let image = image::open(path)?.to_rgb8();
    frames_from_image(&image, pixel_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LightsError;
    use tempfile::tempdir;

    fn frames() -> Vec<Frame> {
        vec![
            Frame::new(vec![[255, 0, 0], [0, 0, 0], [1, 2, 3]]),
            Frame::new(vec![[0, 255, 0], [9, 9, 9], [4, 5, 6]]),
        ]
    }

    #[test]
    fn test_buffer_is_lifo() {
        let mut buffer = PlaybackBuffer::new();
        buffer.load(frames());
        buffer.push(Frame::new_black(3));

        assert_eq!(buffer.pop(), Some(Frame::new_black(3)));
        assert_eq!(buffer.pop(), Some(frames()[1].clone()));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_frames_are_columns() {
        let image = frames_to_image(&frames()).unwrap();
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.get_pixel(1, 2).0, [4, 5, 6]);
        assert_eq!(frames_from_image(&image, 3).unwrap(), frames());
    }

    #[test]
    fn test_png_file_is_lossless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recording.png");

        save_png(&path, &frames()).unwrap();
        assert_eq!(load_image(&path, 3).unwrap(), frames());

        let bytes = encode_png(&frames()).unwrap();
        assert_eq!(decode_image(&bytes, 3).unwrap(), frames());
    }

    #[test]
    fn test_save_timestamped_creates_dir() {
        let dir = tempdir().unwrap();
        let recordings = dir.path().join("nested").join("recordings");

        let path = save_timestamped(&recordings, &frames()).unwrap();
        assert!(path.starts_with(&recordings));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("recording-"));
        assert_eq!(load_image(&path, 3).unwrap(), frames());

        let empty = dir.path().join("empty");
        assert!(save_timestamped(&empty, &[]).is_err());
        assert!(!empty.exists());
    }

    #[test]
    fn test_rejects_empty_and_mismatched() {
        assert!(matches!(
            frames_to_image(&[]),
            Err(LightsError::Playback(PlaybackError::Empty))
        ));

        let image = frames_to_image(&frames()).unwrap();
        assert!(matches!(
            frames_from_image(&image, 32),
            Err(LightsError::Playback(PlaybackError::ImageHeight { expected: 32, actual: 3 }))
        ));

        let ragged = vec![Frame::new_black(3), Frame::new_black(2)];
        assert!(frames_to_image(&ragged).is_err());
    }
}
