use tracing::warn;

use crate::{
    color::{clip_channel, round_and_clip, ColorSpace, HslSpace, Rgb},
    ops::{SumTable, Stages},
    strip::Frame,
};

/// Two-pass composer: RGB-stage sums, clip, HSL-stage sums, clip
///
/// HSL operations see the clipped result of the RGB stage, never the raw
/// accumulator.
pub struct StageComposer {
    stages: Stages,
    space: Box<dyn ColorSpace>,
}

impl StageComposer {
    pub fn new(stages: Stages) -> Self {
        Self::with_space(stages, Box::new(HslSpace))
    }

    /// Use another adapter for the second stage
    pub fn with_space(stages: Stages, space: Box<dyn ColorSpace>) -> Self {
        Self { stages, space }
    }

    pub fn stages(&self) -> &Stages {
        &self.stages
    }

    /// Compose the base frame with every contribution in the table
    ///
    /// Never fails: if the second stage cannot be converted back to RGB the
    /// first stage result is returned instead.
    pub fn compose(&self, base: &Frame, sums: &SumTable) -> Frame {
        let rgb = self.rgb_stage(base, sums);

        match self.second_stage(&rgb, sums) {
            Some(pixels) => Frame::new(pixels),
            None => Frame::new(rgb),
        }
    }

    fn rgb_stage(&self, base: &Frame, sums: &SumTable) -> Vec<Rgb> {
        let mut acc: Vec<[i32; 3]> = base.pixels().iter().map(|p| p.map(i32::from)).collect();

        for op in &self.stages.rgb {
            for deltas in sums.contributions(op) {
                for (pixel, delta) in acc.iter_mut().zip(deltas.iter()) {
                    for c in 0..3 {
                        pixel[c] = pixel[c].saturating_add(delta[c]);
                    }
                }
            }
        }

        acc.into_iter().map(|p| p.map(clip_channel)).collect()
    }

    fn second_stage(&self, rgb: &[Rgb], sums: &SumTable) -> Option<Vec<Rgb>> {
        let mut acc: Vec<[f64; 3]> = rgb.iter().map(|&p| self.space.from_rgb(p)).collect();

        for op in &self.stages.hsl {
            for deltas in sums.contributions(op) {
                for (pixel, delta) in acc.iter_mut().zip(deltas.iter()) {
                    for c in 0..3 {
                        pixel[c] += f64::from(delta[c]);
                    }
                }
            }
        }

        let mut out = Vec::with_capacity(acc.len());
        for components in acc {
            match self.space.to_rgb(components) {
                Ok(converted) => out.push(round_and_clip(converted)),
                Err(e) => {
                    warn!("{} stage failed, using RGB stage result: {}", self.space.name(), e);
                    return None;
                }
            }
        }
        Some(out)
    }
}

impl Default for StageComposer {
    fn default() -> Self {
        Self::new(Stages::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColorError;
    use crate::ops::sum_keys;

    fn table(len: usize) -> SumTable {
        SumTable::new(len, &sum_keys(), ["a", "b"])
    }

    struct Broken;

    impl ColorSpace for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn description(&self) -> &'static str {
            "always fails"
        }
        fn from_rgb(&self, rgb: Rgb) -> [f64; 3] {
            rgb.map(f64::from)
        }
        fn to_rgb(&self, components: [f64; 3]) -> Result<[f64; 3], ColorError> {
            Err(ColorError::NonFinite {
                space: "broken".to_string(),
                components,
            })
        }
    }

    #[test]
    fn test_contributions_add_across_controls() {
        let mut sums = table(2);
        sums.get_mut("Red", "a").unwrap().fill_channel(0, 100);
        sums.get_mut("Red", "b").unwrap().fill_channel(0, 100);
        sums.get_mut("Blue", "a").unwrap().fill_channel(2, 40);

        let frame = StageComposer::default().compose(&Frame::new_black(2), &sums);
        assert_eq!(frame.pixels(), &[[200, 0, 40], [200, 0, 40]]);
    }

    #[test]
    fn test_output_is_clipped() {
        let mut sums = table(3);
        sums.get_mut("White", "a").unwrap().fill_channel(0, 9_000);
        sums.get_mut("Black", "b").unwrap().fill_channel(1, -9_000);
        sums.get_mut("Light", "a").unwrap().fill_channel(2, i32::MAX);

        let base = Frame::new_filled(3, [10, 200, 30]);
        for pixel in StageComposer::default().compose(&base, &sums).pixels() {
            assert_eq!(*pixel, [255, 255, 255]);
        }

        sums.get_mut("Light", "a").unwrap().fill_channel(2, i32::MIN);
        for pixel in StageComposer::default().compose(&base, &sums).pixels() {
            assert_eq!(*pixel, [0, 0, 0]);
        }
    }

    #[test]
    fn test_hsl_stage_sees_clipped_rgb() {
        let mut sums = table(1);
        // Red saturates at 255 before the HSL stage
        sums.get_mut("Red", "a").unwrap().fill_channel(0, 1_000);
        sums.get_mut("Dark", "a").unwrap().fill_channel(2, -50);

        let frame = StageComposer::default().compose(&Frame::new_black(1), &sums);
        // Red at lightness 127.5 - 50
        assert_eq!(frame.pixels(), &[[155, 0, 0]]);
    }

    #[test]
    fn test_failed_conversion_falls_back_to_rgb_stage() {
        let mut sums = table(2);
        sums.get_mut("Green", "a").unwrap().fill_channel(1, 300);
        sums.get_mut("Bright", "a").unwrap().fill_channel(2, 50);

        let composer = StageComposer::with_space(Stages::default(), Box::new(Broken));
        let frame = composer.compose(&Frame::new_black(2), &sums);
        assert_eq!(frame.pixels(), &[[0, 255, 0], [0, 255, 0]]);
    }

    #[test]
    fn test_no_sums_is_identity() {
        let base = Frame::new(vec![[1, 2, 3], [250, 128, 7], [0, 0, 0]]);
        assert_eq!(StageComposer::default().compose(&base, &table(3)), base);
    }
}
