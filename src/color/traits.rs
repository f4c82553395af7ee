use crate::error::ColorError;

use super::Rgb;

/// Components of a color in some space, each scaled to the RGB integer domain (0..=255)
pub type Components = [f64; 3];

/// Core trait implemented by every color-space adapter
///
/// Adapters let the composer (and the strip) treat a pixel in an alternate
/// representation with the same 0..=255 arithmetic used for RGB sums.
pub trait ColorSpace: Send + Sync {
    /// Returns the unique name of this color space
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of this color space
    fn description(&self) -> &'static str;

    /// Convert a clipped sRGB pixel into this space
    fn from_rgb(&self, rgb: Rgb) -> Components;

    /// Convert components of this space back to sRGB
    ///
    /// The result is not clipped; callers round and clip. Fails when the
    /// components cannot be interpreted (for example NaN or infinity).
    fn to_rgb(&self, components: Components) -> Result<Components, ColorError>;

    /// Interpret a stored 8-bit pixel as components of this space and convert to sRGB
    fn decode(&self, raw: Rgb) -> Result<Rgb, ColorError> {
        let components = [raw[0] as f64, raw[1] as f64, raw[2] as f64];
        self.to_rgb(components).map(round_and_clip)
    }
}

/// Round every component to the nearest integer and clip to 0..=255
pub fn round_and_clip(components: Components) -> Rgb {
    components.map(|c| c.round().clamp(0.0, 255.0) as u8)
}

/// Fail with `NonFinite` unless every component is a finite number
pub(crate) fn ensure_finite(space: &str, components: Components) -> Result<(), ColorError> {
    if components.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ColorError::NonFinite {
            space: space.to_string(),
            components,
        })
    }
}
