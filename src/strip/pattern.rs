use rand::{seq::SliceRandom, Rng};

use crate::color::palette::{rainbow, PALETTE};

use super::model::Strip;

/// Whole-strip fills available to HTTP clients and scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// One turn of the color wheel
    Rainbow,
    /// All pixels black
    Off,
    /// Each pixel a random palette color
    Random,
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Self::Rainbow, Self::Off, Self::Random];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rainbow => "rainbow",
            Self::Off => "off",
            Self::Random => "random",
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|pattern| pattern.as_str().eq_ignore_ascii_case(s))
    }

    /// Write the pattern into the strip's raw pixels
    pub fn apply<R: Rng + ?Sized>(self, strip: &mut Strip, rng: &mut R) {
        match self {
            Self::Rainbow => {
                for (i, color) in rainbow(strip.pixel_count()).into_iter().enumerate() {
                    strip.set(i, color);
                }
            }
            Self::Off => strip.clear(),
            Self::Random => {
                for i in 0..strip.pixel_count() {
                    if let Some(&color) = PALETTE.choose(rng) {
                        strip.set(i, color);
                    }
                }
            }
        }
    }
}
