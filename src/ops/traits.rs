use std::time::Duration;

use crate::strip::StepTransform;

use super::sums::DeltaArray;

/// Global flags that change how fills are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Substitute each fill's alternate magnitude
    pub alt: bool,
    /// Replace flat fills with a ramp across the strip
    pub gradient: bool,
}

/// Engine-level side effect requested by an operation
///
/// Operations only own their delta array; anything that touches shared
/// animation state is handed back to the engine through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpEffect {
    SetAlt(bool),
    SetGradient(bool),
    /// Copy the shown frame into the base frame and zero every sum
    Snapshot,
    ToggleRecording,
    SetStep { step: StepTransform, delay: Duration },
}

/// An on/off operation
pub trait DiscreteOperation: Send + Sync {
    /// Rewrite this control's delta array for the new button state
    ///
    /// Must leave `deltas` all-zero when `on` is false.
    fn apply(&self, deltas: &mut DeltaArray, modifiers: Modifiers, on: bool) -> Option<OpEffect>;
}

/// A proportional operation; the latest value replaces any earlier one
pub trait ContinuousOperation: Send + Sync {
    fn apply(&self, deltas: &mut DeltaArray, value: f32) -> Option<OpEffect>;
}
