//! Built-in color-space adapters.
//!
//! Every adapter scales its components to 0..=255 so deltas stored in the
//! sum table can be added to them directly. Hue is a fraction of a full turn
//! (255 is one turn) and wraps; the other components are clamped.

use crate::error::ColorError;

use super::traits::{ensure_finite, ColorSpace, Components};
use super::Rgb;

const SCALE: f64 = 255.0;

/// Identity adapter: components are plain sRGB
pub struct RgbSpace;

/// Hue / saturation / lightness
pub struct HslSpace;

/// Hue / saturation / value
pub struct HsvSpace;

/// Cyan / magenta / yellow (subtractive complement of RGB)
pub struct CmySpace;

/// CIE 1931 XYZ under a D65 white point
pub struct XyzSpace;

/// Ebner and Fairchild IPT (intensity, protan and tritan opponents)
pub struct IptSpace;

type Matrix = [[f64; 3]; 3];

const RGB_TO_XYZ: Matrix = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

const XYZ_TO_RGB: Matrix = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

const XYZ_TO_LMS: Matrix = [
    [0.4002, 0.7075, -0.0807],
    [-0.2280, 1.1500, 0.0612],
    [0.0, 0.0, 0.9184],
];

const LMS_TO_XYZ: Matrix = [
    [1.8502429449, -1.1383016379, 0.2384349585],
    [0.3668307752, 0.6438845448, -0.0106734436],
    [0.0, 0.0, 1.0888501742],
];

const LMS_TO_IPT: Matrix = [
    [0.4, 0.4, 0.2],
    [4.455, -4.851, 0.396],
    [0.8056, 0.3572, -1.1628],
];

const IPT_TO_LMS: Matrix = [
    [1.0, 0.0975689305, 0.2052264332],
    [1.0, -0.1138764855, 0.1332171584],
    [1.0, 0.0326151099, -0.6768871831],
];

const IPT_EXPONENT: f64 = 0.43;

impl ColorSpace for RgbSpace {
    fn name(&self) -> &'static str {
        "rgb"
    }

    fn description(&self) -> &'static str {
        "sRGB, passed through unchanged"
    }

    fn from_rgb(&self, rgb: Rgb) -> Components {
        rgb.map(f64::from)
    }

    fn to_rgb(&self, components: Components) -> Result<Components, ColorError> {
        ensure_finite(self.name(), components)?;
        Ok(components)
    }
}

impl ColorSpace for HslSpace {
    fn name(&self) -> &'static str {
        "hsl"
    }

    fn description(&self) -> &'static str {
        "Hue, saturation and lightness"
    }

    fn from_rgb(&self, rgb: Rgb) -> Components {
        to_hsl(rgb)
    }

    fn to_rgb(&self, components: Components) -> Result<Components, ColorError> {
        from_hsl(components)
    }
}

impl ColorSpace for HsvSpace {
    fn name(&self) -> &'static str {
        "hsv"
    }

    fn description(&self) -> &'static str {
        "Hue, saturation and value"
    }

    fn from_rgb(&self, rgb: Rgb) -> Components {
        let [r, g, b] = unit(rgb);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let saturation = if max > 0.0 { delta / max } else { 0.0 };
        [hue_of(r, g, b, max, delta) * SCALE, saturation * SCALE, max * SCALE]
    }

    fn to_rgb(&self, components: Components) -> Result<Components, ColorError> {
        ensure_finite(self.name(), components)?;
        let hue = wrap_hue(components[0]);
        let saturation = unit_clamp(components[1]);
        let value = unit_clamp(components[2]);

        let sector = (hue * 6.0).floor();
        let fraction = hue * 6.0 - sector;
        let p = value * (1.0 - saturation);
        let q = value * (1.0 - fraction * saturation);
        let t = value * (1.0 - (1.0 - fraction) * saturation);

        let (r, g, b) = match sector as u8 % 6 {
            0 => (value, t, p),
            1 => (q, value, p),
            2 => (p, value, t),
            3 => (p, q, value),
            4 => (t, p, value),
            _ => (value, p, q),
        };
        Ok([r * SCALE, g * SCALE, b * SCALE])
    }
}

impl ColorSpace for CmySpace {
    fn name(&self) -> &'static str {
        "cmy"
    }

    fn description(&self) -> &'static str {
        "Cyan, magenta and yellow"
    }

    fn from_rgb(&self, rgb: Rgb) -> Components {
        rgb.map(|c| SCALE - f64::from(c))
    }

    fn to_rgb(&self, components: Components) -> Result<Components, ColorError> {
        ensure_finite(self.name(), components)?;
        Ok(components.map(|c| SCALE - c))
    }
}

impl ColorSpace for XyzSpace {
    fn name(&self) -> &'static str {
        "xyz"
    }

    fn description(&self) -> &'static str {
        "CIE XYZ tristimulus values (D65)"
    }

    fn from_rgb(&self, rgb: Rgb) -> Components {
        to_xyz(rgb).map(|c| c * SCALE)
    }

    fn to_rgb(&self, components: Components) -> Result<Components, ColorError> {
        ensure_finite(self.name(), components)?;
        Ok(from_xyz(components.map(|c| c / SCALE)))
    }
}

impl ColorSpace for IptSpace {
    fn name(&self) -> &'static str {
        "ipt"
    }

    fn description(&self) -> &'static str {
        "IPT opponent space (intensity, red-green, yellow-blue)"
    }

    fn from_rgb(&self, rgb: Rgb) -> Components {
        let lms = multiply(&XYZ_TO_LMS, to_xyz(rgb)).map(|c| signed_pow(c, IPT_EXPONENT));
        multiply(&LMS_TO_IPT, lms).map(|c| c * SCALE)
    }

    fn to_rgb(&self, components: Components) -> Result<Components, ColorError> {
        ensure_finite(self.name(), components)?;
        let lms = multiply(&IPT_TO_LMS, components.map(|c| c / SCALE))
            .map(|c| signed_pow(c, IPT_EXPONENT.recip()));
        Ok(from_xyz(multiply(&LMS_TO_XYZ, lms)))
    }
}

/// Unit-range XYZ of a clipped sRGB pixel
fn to_xyz(rgb: Rgb) -> [f64; 3] {
    multiply(&RGB_TO_XYZ, unit(rgb).map(srgb_to_linear))
}

/// Unit-range XYZ to scaled, unclipped sRGB
fn from_xyz(xyz: [f64; 3]) -> Components {
    multiply(&XYZ_TO_RGB, xyz).map(|c| linear_to_srgb(c) * SCALE)
}

fn multiply(matrix: &Matrix, v: [f64; 3]) -> [f64; 3] {
    matrix.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn signed_pow(c: f64, exponent: f64) -> f64 {
    c.signum() * c.abs().powf(exponent)
}

/// Convert a clipped sRGB pixel to scaled HSL components
pub fn to_hsl(rgb: Rgb) -> Components {
    let [r, g, b] = unit(rgb);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let lightness = (max + min) / 2.0;

    let saturation = if delta == 0.0 {
        0.0
    } else if lightness > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    [
        hue_of(r, g, b, max, delta) * SCALE,
        saturation * SCALE,
        lightness * SCALE,
    ]
}

/// Convert scaled HSL components back to (unclipped) sRGB
pub fn from_hsl(hsl: Components) -> Result<Components, ColorError> {
    ensure_finite("hsl", hsl)?;
    let hue = wrap_hue(hsl[0]);
    let saturation = unit_clamp(hsl[1]);
    let lightness = unit_clamp(hsl[2]);

    if saturation == 0.0 {
        let gray = lightness * SCALE;
        return Ok([gray, gray, gray]);
    }

    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    Ok([
        hue_to_channel(p, q, hue + 1.0 / 3.0) * SCALE,
        hue_to_channel(p, q, hue) * SCALE,
        hue_to_channel(p, q, hue - 1.0 / 3.0) * SCALE,
    ])
}

fn unit(rgb: Rgb) -> [f64; 3] {
    rgb.map(|c| f64::from(c) / SCALE)
}

fn unit_clamp(component: f64) -> f64 {
    (component / SCALE).clamp(0.0, 1.0)
}

fn wrap_hue(component: f64) -> f64 {
    (component / SCALE).rem_euclid(1.0)
}

/// Hue as a fraction of a turn in [0, 1)
fn hue_of(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    if delta == 0.0 {
        return 0.0;
    }
    let sixths = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    sixths / 6.0
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::traits::round_and_clip;

    fn assert_close(actual: Rgb, expected: Rgb) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!(
                (*a as i32 - *e as i32).abs() <= 1,
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(to_hsl([255, 0, 0]), [0.0, 255.0, 127.5]);
        assert_eq!(to_hsl([0, 0, 0]), [0.0, 0.0, 0.0]);
        assert_eq!(to_hsl([255, 255, 255]), [0.0, 0.0, 255.0]);
        assert_eq!(round_and_clip(from_hsl([0.0, 255.0, 127.5]).unwrap()), [255, 0, 0]);
    }

    #[test]
    fn test_hsl_round_trip() {
        for r in (0..=255).step_by(15) {
            for g in (0..=255).step_by(17) {
                for b in (0..=255).step_by(51) {
                    let rgb = [r as u8, g as u8, b as u8];
                    let back = round_and_clip(from_hsl(to_hsl(rgb)).unwrap());
                    assert_close(back, rgb);
                }
            }
        }
    }

    #[test]
    fn test_adapter_round_trips() {
        let samples = [[12, 200, 99], [255, 128, 0], [0, 0, 0], [77, 77, 77], [1, 2, 250]];
        for space in [&HsvSpace as &dyn ColorSpace, &CmySpace, &RgbSpace, &XyzSpace, &IptSpace] {
            for rgb in samples {
                let back = round_and_clip(space.to_rgb(space.from_rgb(rgb)).unwrap());
                assert_close(back, rgb);
            }
        }
    }

    #[test]
    fn test_xyz_white_point() {
        let white = XyzSpace.from_rgb([255, 255, 255]);
        assert!((white[0] / SCALE - 0.9505).abs() < 1e-3);
        assert!((white[1] / SCALE - 1.0).abs() < 1e-3);
        assert!((white[2] / SCALE - 1.0890).abs() < 1e-3);

        // Stored bytes are read as XYZ; pure Y lands outside the gamut and clips to green
        assert_eq!(XyzSpace.decode([0, 0, 0]).unwrap(), [0, 0, 0]);
        let [r, g, b] = XyzSpace.decode([0, 255, 0]).unwrap();
        assert_eq!((r, g, b), (0, 255, 0));
    }

    #[test]
    fn test_ipt_intensity_tracks_gray() {
        let gray = IptSpace.from_rgb([128, 128, 128]);
        assert!(gray[1].abs() < 1.0);
        assert!(gray[2].abs() < 1.0);
        assert!(IptSpace.from_rgb([255, 255, 255])[0] > gray[0]);
        assert_eq!(IptSpace.decode([0, 0, 0]).unwrap(), [0, 0, 0]);
        assert!(IptSpace.to_rgb([f64::NAN, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_hue_wraps_and_lightness_clamps() {
        let red = from_hsl([255.0, 255.0, 127.5]).unwrap();
        assert_eq!(round_and_clip(red), [255, 0, 0]);

        let white = from_hsl([40.0, 255.0, 900.0]).unwrap();
        assert_eq!(round_and_clip(white), [255, 255, 255]);
    }

    #[test]
    fn test_non_finite_is_an_error() {
        let err = from_hsl([f64::NAN, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, ColorError::NonFinite { .. }));
        assert!(HsvSpace.to_rgb([0.0, f64::INFINITY, 0.0]).is_err());
    }

    #[test]
    fn test_decode_interprets_stored_pixel() {
        // Full yellow ink absorbs blue
        assert_eq!(CmySpace.decode([0, 0, 255]).unwrap(), [255, 255, 0]);
        assert_eq!(RgbSpace.decode([1, 2, 3]).unwrap(), [1, 2, 3]);
    }
}
