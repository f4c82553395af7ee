use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    color::ChannelOrder,
    error::{OutputError, Result},
    strip::Frame,
};

use super::RenderSink;

/// Default SPI device on a Raspberry Pi (bus 0, chip select 0)
pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";

/// WS2801 strip on an SPI device
///
/// The WS2801 latches a frame when the clock idles, so one `write` of
/// `3 * pixel_count` bytes per frame is the whole protocol.
pub struct Ws2801Sink {
    path: PathBuf,
    device: File,
    pixel_count: usize,
    order: ChannelOrder,
}

impl Ws2801Sink {
    /// Open the device for writing
    pub fn open<P: AsRef<Path>>(path: P, pixel_count: usize, order: ChannelOrder) -> Result<Self> {
        let path = path.as_ref();
        let device = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| OutputError::DeviceOpen {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!("Opened WS2801 strip on {} ({} pixels, {:?})", path.display(), pixel_count, order);
        Ok(Self {
            path: path.to_path_buf(),
            device,
            pixel_count,
            order,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSink for Ws2801Sink {
    fn name(&self) -> &str {
        "ws2801"
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        if frame.len() != self.pixel_count {
            return Err(OutputError::FrameLength {
                expected: self.pixel_count,
                actual: frame.len(),
            }
            .into());
        }

        let bytes = frame.to_bytes(self.order);
        self.device
            .write_all(&bytes)
            .and_then(|_| self.device.flush())
            .map_err(|e| OutputError::WriteFailed {
                sink: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LightsError;
    use tempfile::tempdir;

    #[test]
    fn test_writes_frame_in_channel_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spidev");
        std::fs::write(&path, b"").unwrap();

        let mut sink = Ws2801Sink::open(&path, 2, ChannelOrder::Bgr).unwrap();
        sink.render(&Frame::new(vec![[255, 0, 0], [0, 10, 20]])).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 255, 20, 10, 0]);
    }

    #[test]
    fn test_rejects_wrong_length_and_missing_device() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spidev");
        std::fs::write(&path, b"").unwrap();

        let mut sink = Ws2801Sink::open(&path, 3, ChannelOrder::Rgb).unwrap();
        let err = sink.render(&Frame::new_black(2)).unwrap_err();
        assert!(matches!(err, LightsError::Output(OutputError::FrameLength { expected: 3, actual: 2 })));

        let missing = Ws2801Sink::open(dir.path().join("nope"), 3, ChannelOrder::Rgb);
        assert!(matches!(missing, Err(LightsError::Output(OutputError::DeviceOpen { .. }))));
    }
}
