//! # Color Module
//!
//! Pixel representation, color-space adapters and fixed palettes.
//!
//! ## Color Spaces
//!
//! - **rgb**: identity, components are sRGB
//! - **hsl**: hue/saturation/lightness, used by the composer's second stage
//! - **hsv**: hue/saturation/value
//! - **cmy**: subtractive complement of RGB
//! - **xyz**: CIE XYZ (D65), bytes read as tristimulus values
//! - **ipt**: IPT opponent space
//!
//! ```rust
//! use legacy_lights::color::{ColorSpaceRegistry, round_and_clip};
//!
//! let registry = ColorSpaceRegistry::new();
//! let hsl = registry.get("hsl").unwrap();
//! let components = hsl.from_rgb([255, 0, 0]);
//! assert_eq!(round_and_clip(hsl.to_rgb(components).unwrap()), [255, 0, 0]);
//! ```

pub mod palette;
pub mod registry;
pub mod spaces;
pub mod traits;

use serde::{Deserialize, Serialize};

pub use palette::{name_to_rgb, rainbow, wheel};
pub use registry::ColorSpaceRegistry;
pub use spaces::{from_hsl, to_hsl, CmySpace, HslSpace, HsvSpace, IptSpace, RgbSpace, XyzSpace};
pub use traits::{round_and_clip, ColorSpace, Components};

/// One pixel as 8-bit red, green, blue
pub type Rgb = [u8; 3];

/// Byte order used when a frame is flattened for a device or raw HTTP payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    #[default]
    Bgr,
}

impl ChannelOrder {
    /// Reorder an RGB pixel into this byte order
    pub fn encode(self, rgb: Rgb) -> [u8; 3] {
        match self {
            Self::Rgb => rgb,
            Self::Bgr => [rgb[2], rgb[1], rgb[0]],
        }
    }

    /// Read a pixel stored in this byte order back as RGB
    pub fn decode(self, bytes: [u8; 3]) -> Rgb {
        // Swapping the outer channels is its own inverse
        self.encode(bytes)
    }
}

/// Clip a wide accumulator channel into 0..=255
pub fn clip_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
