use std::collections::HashMap;

use super::catalog::{ContinuousOp, DiscreteOp};
use super::strategies::{
    ChannelFill, ChannelScale, Fill, Mask, MaskFill, Modifier, ModifierToggle, NoOp, PressEdge,
    RainbowFill, Roll, RollMode, RollTiming,
};
use super::traits::{ContinuousOperation, DiscreteOperation};

const R: usize = 0;
const G: usize = 1;
const B: usize = 2;

/// HSL lanes share the array shape with RGB ones
const HUE: usize = 0;
const LIGHTNESS: usize = 2;

/// Lookup table from operation name to strategy
///
/// Built once per engine; discrete and continuous operations live in
/// separate tables because the same name (e.g. `Red`) means different
/// things in each catalog.
pub struct OperationRegistry {
    discrete: HashMap<&'static str, Box<dyn DiscreteOperation>>,
    continuous: HashMap<&'static str, Box<dyn ContinuousOperation>>,
}

impl OperationRegistry {
    /// Create a registry with every catalog operation
    pub fn new(timing: RollTiming) -> Self {
        let mut registry = Self {
            discrete: HashMap::new(),
            continuous: HashMap::new(),
        };
        registry.register_builtin_discrete();
        registry.register_builtin_continuous(timing);
        registry
    }

    fn register_builtin_discrete(&mut self) {
        for op in DiscreteOp::ALL {
            let strategy: Box<dyn DiscreteOperation> = match op {
                DiscreteOp::Unassigned => Box::new(NoOp),
                DiscreteOp::Red => Box::new(ChannelFill::uniform(&[R], 255)),
                DiscreteOp::Green => Box::new(ChannelFill::uniform(&[G], 255)),
                DiscreteOp::Blue => Box::new(ChannelFill::uniform(&[B], 255)),
                DiscreteOp::Yellow => Box::new(ChannelFill::uniform(&[R, G], 255)),
                DiscreteOp::Orange => Box::new(ChannelFill::new(vec![Fill::new(R, 255), Fill::new(G, 128)])),
                DiscreteOp::Indigo => Box::new(ChannelFill::uniform(&[G, B], 255)),
                DiscreteOp::Violet => Box::new(ChannelFill::uniform(&[R, B], 255)),
                DiscreteOp::Pink => Box::new(ChannelFill::new(vec![Fill::new(R, 255), Fill::new(B, 128)])),
                DiscreteOp::Bright => Box::new(ChannelFill::new(vec![Fill::with_alt(LIGHTNESS, 50, 100)])),
                DiscreteOp::Dark => Box::new(ChannelFill::new(vec![Fill::with_alt(LIGHTNESS, -50, -100)])),
                DiscreteOp::White => Box::new(ChannelFill::uniform(&[R, G, B], 255)),
                DiscreteOp::Black => Box::new(ChannelFill::uniform(&[R, G, B], -255)),
                DiscreteOp::Copy => Box::new(PressEdge::snapshot()),
                DiscreteOp::One => Box::new(MaskFill::new(Mask::AllButFirst)),
                DiscreteOp::Evens => Box::new(MaskFill::new(Mask::Even)),
                DiscreteOp::Odds => Box::new(MaskFill::new(Mask::Odd)),
                DiscreteOp::Rainbow => Box::new(RainbowFill),
                DiscreteOp::Alt => Box::new(ModifierToggle::new(Modifier::Alt)),
                DiscreteOp::Gradient => Box::new(ModifierToggle::new(Modifier::Gradient)),
                DiscreteOp::Record => Box::new(PressEdge::record()),
            };
            self.discrete.insert(op.as_str(), strategy);
        }
    }

    fn register_builtin_continuous(&mut self, timing: RollTiming) {
        for op in ContinuousOp::ALL {
            let strategy: Box<dyn ContinuousOperation> = match op {
                ContinuousOp::Unassigned => Box::new(NoOp),
                ContinuousOp::Red => Box::new(ChannelScale::new(R)),
                ContinuousOp::Green => Box::new(ChannelScale::new(G)),
                ContinuousOp::Blue => Box::new(ChannelScale::new(B)),
                ContinuousOp::Hue => Box::new(ChannelScale::new(HUE)),
                ContinuousOp::Light => Box::new(ChannelScale::new(LIGHTNESS)),
                ContinuousOp::Roll => Box::new(Roll::new(RollMode::Bidirectional, timing)),
                ContinuousOp::RollL => Box::new(Roll::new(RollMode::Left, timing)),
                ContinuousOp::RollR => Box::new(Roll::new(RollMode::Right, timing)),
            };
            self.continuous.insert(op.as_str(), strategy);
        }
    }

    pub fn discrete(&self, name: &str) -> Option<&dyn DiscreteOperation> {
        self.discrete.get(name).map(|op| op.as_ref())
    }

    pub fn continuous(&self, name: &str) -> Option<&dyn ContinuousOperation> {
        self.continuous.get(name).map(|op| op.as_ref())
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new(RollTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::sums::DeltaArray;
    use crate::ops::traits::Modifiers;

    #[test]
    fn test_every_catalog_name_is_registered() {
        let registry = OperationRegistry::default();
        for op in DiscreteOp::ALL {
            assert!(registry.discrete(op.as_str()).is_some(), "{}", op.as_str());
        }
        for op in ContinuousOp::ALL {
            assert!(registry.continuous(op.as_str()).is_some(), "{}", op.as_str());
        }
        assert!(registry.discrete("Roll").is_none());
    }

    #[test]
    fn test_discrete_toggle_returns_to_zero() {
        let registry = OperationRegistry::default();
        let flags = [
            Modifiers::default(),
            Modifiers { alt: true, gradient: false },
            Modifiers { alt: false, gradient: true },
        ];

        for op in DiscreteOp::ALL {
            for modifiers in flags {
                let strategy = registry.discrete(op.as_str()).unwrap();
                let mut deltas = DeltaArray::zeros(8);
                strategy.apply(&mut deltas, modifiers, true);
                strategy.apply(&mut deltas, modifiers, false);
                assert!(deltas.is_zero(), "{} left residue", op.as_str());
            }
        }
    }

    #[test]
    fn test_pink_and_dark_patterns() {
        let registry = OperationRegistry::default();
        let mut deltas = DeltaArray::zeros(2);

        registry.discrete("Pink").unwrap().apply(&mut deltas, Modifiers::default(), true);
        assert_eq!(deltas.get(0), Some([255, 0, 128]));

        let mut deltas = DeltaArray::zeros(2);
        let alt = Modifiers { alt: true, gradient: false };
        registry.discrete("Dark").unwrap().apply(&mut deltas, alt, true);
        assert_eq!(deltas.get(1), Some([0, 0, -100]));
    }
}
