//! Fixed colors: the three-segment color wheel, the strip rainbow, and
//! CSS color names accepted by the HTTP API and the command language.

use super::Rgb;

/// Colors used by the random palette pattern
pub const PALETTE: [Rgb; 7] = [
    [255, 0, 0],
    [255, 128, 0],
    [0, 255, 0],
    [0, 0, 255],
    [0, 255, 255],
    [255, 0, 255],
    [255, 0, 128],
];

/// Color at position `pos` of a triangular wheel split into three 85-step segments
pub fn wheel(pos: u8) -> Rgb {
    let pos = u16::from(pos);
    let (r, g, b) = if pos < 85 {
        (pos * 3, 255 - pos * 3, 0)
    } else if pos < 170 {
        let pos = pos - 85;
        (255 - pos * 3, 0, pos * 3)
    } else {
        let pos = pos - 170;
        (0, pos * 3, 255 - pos * 3)
    };
    [r as u8, g as u8, b as u8]
}

/// Wheel position of pixel `index` on a strip of `count` pixels
pub fn wheel_position(index: usize, count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    (index as f64 * (256.0 / count as f64)) as u8
}

/// One full turn of the wheel spread across `count` pixels
pub fn rainbow(count: usize) -> Vec<Rgb> {
    (0..count).map(|i| wheel(wheel_position(i, count))).collect()
}

/// Look up a CSS color name (case-insensitive)
pub fn name_to_rgb(name: &str) -> Option<Rgb> {
    let name = name.trim().to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, rgb)| *rgb)
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("gold", [255, 215, 0]),
    ("pink", [255, 192, 203]),
    ("hotpink", [255, 105, 180]),
    ("deeppink", [255, 20, 147]),
    ("purple", [128, 0, 128]),
    ("violet", [238, 130, 238]),
    ("indigo", [75, 0, 130]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("olive", [128, 128, 0]),
    ("maroon", [128, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("brown", [165, 42, 42]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("crimson", [220, 20, 60]),
    ("salmon", [250, 128, 114]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("skyblue", [135, 206, 235]),
    ("royalblue", [65, 105, 225]),
    ("dodgerblue", [30, 144, 255]),
    ("limegreen", [50, 205, 50]),
    ("forestgreen", [34, 139, 34]),
    ("springgreen", [0, 255, 127]),
    ("chartreuse", [127, 255, 0]),
    ("lavender", [230, 230, 250]),
    ("plum", [221, 160, 221]),
    ("orchid", [218, 112, 214]),
    ("khaki", [240, 230, 140]),
    ("beige", [245, 245, 220]),
    ("ivory", [255, 255, 240]),
    ("snow", [255, 250, 250]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_segments() {
        assert_eq!(wheel(0), [0, 255, 0]);
        assert_eq!(wheel(84), [252, 3, 0]);
        assert_eq!(wheel(85), [255, 0, 0]);
        assert_eq!(wheel(170), [0, 0, 255]);
        assert_eq!(wheel(255), [0, 255, 0]);
    }

    #[test]
    fn test_rainbow_is_smooth() {
        let colors = rainbow(32);
        assert_eq!(colors.len(), 32);
        assert_eq!(colors[0], [0, 255, 0]);

        // Adjacent pixels are 8 wheel steps apart, so no channel moves more than 8 * 3
        for pair in colors.windows(2) {
            for c in 0..3 {
                let step = (pair[0][c] as i32 - pair[1][c] as i32).abs();
                assert!(step <= 24, "discontinuity between {:?} and {:?}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(name_to_rgb("Red"), Some([255, 0, 0]));
        assert_eq!(name_to_rgb(" navy "), Some([0, 0, 128]));
        assert_eq!(name_to_rgb("not-a-color"), None);
    }
}
