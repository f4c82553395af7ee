//! Built-in operation strategies.
//!
//! Each strategy owns the pattern it writes; the registry maps catalog
//! names onto configured instances.

use std::time::Duration;

use crate::color::palette::{wheel, wheel_position};
use crate::strip::StepTransform;

use super::sums::DeltaArray;
use super::traits::{ContinuousOperation, DiscreteOperation, Modifiers, OpEffect};

const FULL: i32 = 255;

/// One channel written by a [`ChannelFill`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub channel: usize,
    pub value: i32,
    /// Written instead of `value` while alt is on; defaults to `-value`
    pub alt_value: Option<i32>,
}

impl Fill {
    pub const fn new(channel: usize, value: i32) -> Self {
        Self {
            channel,
            value,
            alt_value: None,
        }
    }

    pub const fn with_alt(channel: usize, value: i32, alt_value: i32) -> Self {
        Self {
            channel,
            value,
            alt_value: Some(alt_value),
        }
    }

    fn current(&self, alt: bool) -> i32 {
        if alt {
            self.alt_value.unwrap_or(-self.value)
        } else {
            self.value
        }
    }
}

/// Solid (or, with gradient on, ramped) per-channel fill
pub struct ChannelFill {
    fills: Vec<Fill>,
}

impl ChannelFill {
    pub fn new(fills: Vec<Fill>) -> Self {
        Self { fills }
    }

    /// Same value on several channels
    pub fn uniform(channels: &[usize], value: i32) -> Self {
        Self::new(channels.iter().map(|&c| Fill::new(c, value)).collect())
    }
}

impl DiscreteOperation for ChannelFill {
    fn apply(&self, deltas: &mut DeltaArray, modifiers: Modifiers, on: bool) -> Option<OpEffect> {
        for fill in &self.fills {
            if !on {
                deltas.fill_channel(fill.channel, 0);
            } else if modifiers.gradient {
                deltas.ramp_channel(fill.channel, fill.value);
            } else {
                deltas.fill_channel(fill.channel, fill.current(modifiers.alt));
            }
        }
        None
    }
}

/// One full turn of the color wheel across the strip
pub struct RainbowFill;

impl DiscreteOperation for RainbowFill {
    fn apply(&self, deltas: &mut DeltaArray, modifiers: Modifiers, on: bool) -> Option<OpEffect> {
        if !on {
            deltas.clear();
            return None;
        }

        let len = deltas.len();
        for i in 0..len {
            let [r, g, b] = wheel(wheel_position(i, len)).map(i32::from);
            let pixel = if modifiers.alt { [g, b, r] } else { [r, g, b] };
            deltas.set_pixel(i, pixel);
        }
        None
    }
}

/// Which pixels a [`MaskFill`] blacks out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
    /// Everything except pixel 0
    AllButFirst,
    Odd,
    Even,
}

impl Mask {
    fn covers(self, index: usize) -> bool {
        match self {
            Self::AllButFirst => index != 0,
            Self::Odd => index % 2 == 1,
            Self::Even => index % 2 == 0,
        }
    }
}

/// Subtract full intensity from a positional subset of pixels
pub struct MaskFill {
    mask: Mask,
}

impl MaskFill {
    pub fn new(mask: Mask) -> Self {
        Self { mask }
    }
}

impl DiscreteOperation for MaskFill {
    fn apply(&self, deltas: &mut DeltaArray, _modifiers: Modifiers, on: bool) -> Option<OpEffect> {
        deltas.clear();
        if on {
            for i in (0..deltas.len()).filter(|&i| self.mask.covers(i)) {
                deltas.set_pixel(i, [-FULL; 3]);
            }
        }
        None
    }
}

/// Which global flag a [`ModifierToggle`] drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Alt,
    Gradient,
}

/// Hold-to-enable modifier: the flag follows the button state
pub struct ModifierToggle {
    modifier: Modifier,
}

impl ModifierToggle {
    pub fn new(modifier: Modifier) -> Self {
        Self { modifier }
    }
}

impl DiscreteOperation for ModifierToggle {
    fn apply(&self, _deltas: &mut DeltaArray, _modifiers: Modifiers, on: bool) -> Option<OpEffect> {
        Some(match self.modifier {
            Modifier::Alt => OpEffect::SetAlt(on),
            Modifier::Gradient => OpEffect::SetGradient(on),
        })
    }
}

/// Fires an engine effect on press; release does nothing
pub struct PressEdge {
    effect: OpEffect,
}

impl PressEdge {
    pub fn snapshot() -> Self {
        Self {
            effect: OpEffect::Snapshot,
        }
    }

    pub fn record() -> Self {
        Self {
            effect: OpEffect::ToggleRecording,
        }
    }
}

impl DiscreteOperation for PressEdge {
    fn apply(&self, _deltas: &mut DeltaArray, _modifiers: Modifiers, on: bool) -> Option<OpEffect> {
        on.then_some(self.effect)
    }
}

/// Bound to nothing
pub struct NoOp;

impl DiscreteOperation for NoOp {
    fn apply(&self, _deltas: &mut DeltaArray, _modifiers: Modifiers, _on: bool) -> Option<OpEffect> {
        None
    }
}

impl ContinuousOperation for NoOp {
    fn apply(&self, _deltas: &mut DeltaArray, _value: f32) -> Option<OpEffect> {
        None
    }
}

/// Writes `trunc(255 * value)` into one channel of every pixel
pub struct ChannelScale {
    channel: usize,
}

impl ChannelScale {
    pub fn new(channel: usize) -> Self {
        Self { channel }
    }
}

impl ContinuousOperation for ChannelScale {
    fn apply(&self, deltas: &mut DeltaArray, value: f32) -> Option<OpEffect> {
        deltas.fill_channel(self.channel, (FULL as f32 * value) as i32);
        None
    }
}

/// Tick delays available to roll operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollTiming {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub default_delay: Duration,
    /// Magnitudes at or below this leave the strip still
    pub dead_zone: f32,
}

impl Default for RollTiming {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            default_delay: Duration::from_millis(50),
            dead_zone: 0.05,
        }
    }
}

impl RollTiming {
    /// Delay for a magnitude in [0, 1]: full deflection gives the minimum
    pub fn delay_for(&self, magnitude: f32) -> Duration {
        let magnitude = f64::from(magnitude.clamp(0.0, 1.0));
        let span = self.max_delay.saturating_sub(self.min_delay).as_micros() as f64;
        self.min_delay + Duration::from_micros((span * (1.0 - magnitude)).round() as u64)
    }

    fn still(&self) -> OpEffect {
        OpEffect::SetStep {
            step: StepTransform::Identity,
            delay: self.default_delay,
        }
    }
}

/// Direction handling for a [`Roll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollMode {
    /// Signed axis: sign picks the direction
    Bidirectional,
    /// Trigger rolling towards pixel 0
    Left,
    /// Trigger rolling away from pixel 0
    Right,
}

/// Installs a one-pixel rotation per tick with a speed from the input
pub struct Roll {
    mode: RollMode,
    timing: RollTiming,
}

impl Roll {
    pub fn new(mode: RollMode, timing: RollTiming) -> Self {
        Self { mode, timing }
    }
}

impl ContinuousOperation for Roll {
    fn apply(&self, _deltas: &mut DeltaArray, value: f32) -> Option<OpEffect> {
        if !value.is_finite() {
            return Some(self.timing.still());
        }
        let value = value.clamp(-1.0, 1.0);

        let (delta, magnitude) = match self.mode {
            RollMode::Bidirectional => (if value < 0.0 { -1 } else { 1 }, value.abs()),
            RollMode::Left => (-1, value),
            RollMode::Right => (1, value),
        };

        if magnitude > self.timing.dead_zone {
            Some(OpEffect::SetStep {
                step: StepTransform::RotateBy(delta),
                delay: self.timing.delay_for(magnitude),
            })
        } else {
            Some(self.timing.still())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON: Modifiers = Modifiers {
        alt: false,
        gradient: false,
    };

    #[test]
    fn test_fill_alt_and_gradient() {
        let orange = ChannelFill::new(vec![Fill::new(0, 255), Fill::new(1, 128)]);
        let mut deltas = DeltaArray::zeros(3);

        orange.apply(&mut deltas, ON, true);
        assert_eq!(deltas.get(2), Some([255, 128, 0]));

        let alt = Modifiers { alt: true, ..ON };
        orange.apply(&mut deltas, alt, true);
        assert_eq!(deltas.get(0), Some([-255, -128, 0]));

        let bright = ChannelFill::new(vec![Fill::with_alt(2, 50, 100)]);
        bright.apply(&mut deltas, alt, true);
        assert_eq!(deltas.get(0).map(|d| d[2]), Some(100));

        // Gradient ignores alt
        let gradient = Modifiers { alt: true, gradient: true };
        orange.apply(&mut deltas, gradient, true);
        assert_eq!(deltas.get(0), Some([0, 0, 100]));
        assert_eq!(deltas.get(2).map(|d| [d[0], d[1]]), Some([256, 129]));

        orange.apply(&mut deltas, gradient, false);
        assert_eq!(deltas.get(2), Some([0, 0, 100]));
    }

    #[test]
    fn test_masks() {
        let mut deltas = DeltaArray::zeros(4);
        let lanes = |d: &DeltaArray| d.iter().map(|p| p[0]).collect::<Vec<_>>();

        MaskFill::new(Mask::AllButFirst).apply(&mut deltas, ON, true);
        assert_eq!(lanes(&deltas), vec![0, -255, -255, -255]);

        MaskFill::new(Mask::Odd).apply(&mut deltas, ON, true);
        assert_eq!(lanes(&deltas), vec![0, -255, 0, -255]);

        MaskFill::new(Mask::Even).apply(&mut deltas, ON, true);
        assert_eq!(lanes(&deltas), vec![-255, 0, -255, 0]);

        MaskFill::new(Mask::Even).apply(&mut deltas, ON, false);
        assert!(deltas.is_zero());
    }

    #[test]
    fn test_rainbow_alt_rotates_channels() {
        let mut deltas = DeltaArray::zeros(32);
        RainbowFill.apply(&mut deltas, ON, true);
        assert_eq!(deltas.get(0), Some([0, 255, 0]));

        RainbowFill.apply(&mut deltas, Modifiers { alt: true, ..ON }, true);
        assert_eq!(deltas.get(0), Some([255, 0, 0]));
    }

    #[test]
    fn test_press_edge_ignores_release() {
        let mut deltas = DeltaArray::zeros(1);
        assert_eq!(PressEdge::snapshot().apply(&mut deltas, ON, true), Some(OpEffect::Snapshot));
        assert_eq!(PressEdge::record().apply(&mut deltas, ON, false), None);
    }

    #[test]
    fn test_roll_speed_and_direction() {
        let mut deltas = DeltaArray::zeros(1);
        let roll = Roll::new(RollMode::Bidirectional, RollTiming::default());

        assert_eq!(
            roll.apply(&mut deltas, -0.5),
            Some(OpEffect::SetStep {
                step: StepTransform::RotateBy(-1),
                delay: Duration::from_millis(55),
            })
        );
        assert_eq!(
            roll.apply(&mut deltas, 3.0),
            Some(OpEffect::SetStep {
                step: StepTransform::RotateBy(1),
                delay: Duration::from_millis(10),
            })
        );
        assert_eq!(
            roll.apply(&mut deltas, 0.04),
            Some(OpEffect::SetStep {
                step: StepTransform::Identity,
                delay: Duration::from_millis(50),
            })
        );

        let left = Roll::new(RollMode::Left, RollTiming::default());
        assert!(matches!(
            left.apply(&mut deltas, -1.0),
            Some(OpEffect::SetStep { step: StepTransform::Identity, .. })
        ));
        assert!(matches!(
            left.apply(&mut deltas, 1.0),
            Some(OpEffect::SetStep { step: StepTransform::RotateBy(-1), .. })
        ));
    }

    #[test]
    fn test_channel_scale_truncates() {
        let mut deltas = DeltaArray::zeros(2);
        ChannelScale::new(2).apply(&mut deltas, 0.5);
        assert_eq!(deltas.get(1), Some([0, 0, 127]));
        ChannelScale::new(2).apply(&mut deltas, -0.5);
        assert_eq!(deltas.get(1), Some([0, 0, -127]));
    }
}
