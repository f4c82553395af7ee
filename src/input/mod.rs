//! # Input
//!
//! Control bindings and the activity monitor. Physical inputs arrive as
//! [`InputEvent`]s naming a control; the binding table decides which
//! operation they drive.

pub mod monitor;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    animation::Engine,
    error::{OperationError, Result},
    ops::{ContinuousOp, DiscreteOp},
};

pub use monitor::ActivityMonitor;

/// Physical kind of a control, which fixes its operation catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Button,
    Hat,
    Axis,
    Trigger,
}

impl ControlKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Hat => "hat",
            Self::Axis => "axis",
            Self::Trigger => "trigger",
        }
    }

    /// True for controls that drive discrete operations
    pub const fn is_discrete(self) -> bool {
        matches!(self, Self::Button | Self::Hat)
    }

    /// Canonical catalog name for `op`, if this kind can be bound to it
    pub fn canonical_op(self, op: &str) -> Option<&'static str> {
        if self.is_discrete() {
            DiscreteOp::parse_from_str(op).map(DiscreteOp::as_str)
        } else {
            ContinuousOp::parse_from_str(op).map(ContinuousOp::as_str)
        }
    }

    /// Operation names this kind can be bound to
    pub fn catalog(self) -> Vec<&'static str> {
        if self.is_discrete() {
            DiscreteOp::ALL.iter().map(|op| op.as_str()).collect()
        } else {
            ContinuousOp::ALL.iter().map(|op| op.as_str()).collect()
        }
    }
}

/// One control's binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlBinding {
    pub kind: ControlKind,
    pub op: String,
}

impl ControlBinding {
    pub fn new(kind: ControlKind, op: &str) -> Self {
        Self {
            kind,
            op: op.to_string(),
        }
    }
}

/// State reported by a control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputValue {
    /// Button or hat direction pressed / released
    Pressed(bool),
    /// Axis in [-1, 1] or trigger in [0, 1]
    Value(f32),
}

/// A raw event from one control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub control: String,
    pub kind: ControlKind,
    pub value: InputValue,
}

/// Map a raw trigger reading in [-1, 1] (rest = -1) to [0, 1]
pub fn normalize_trigger(raw: f32) -> f32 {
    (raw + 1.0) / 2.0
}

/// Control → operation table, rebindable at runtime
#[derive(Debug, Clone, Default)]
pub struct ControlBindings {
    bindings: BTreeMap<String, ControlBinding>,
}

impl ControlBindings {
    pub fn new(bindings: BTreeMap<String, ControlBinding>) -> Self {
        Self { bindings }
    }

    pub fn get(&self, control: &str) -> Option<&ControlBinding> {
        self.bindings.get(control)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ControlBinding)> {
        self.bindings.iter()
    }

    /// Bind a control to another operation from its kind's catalog
    pub fn rebind(&mut self, control: &str, op: &str) -> Result<&ControlBinding> {
        let binding = self
            .bindings
            .get_mut(control)
            .ok_or_else(|| OperationError::UnknownControl {
                control: control.to_string(),
            })?;

        let canonical = binding.kind.canonical_op(op).ok_or_else(|| {
            let known = DiscreteOp::parse_from_str(op).is_some()
                || ContinuousOp::parse_from_str(op).is_some();
            if known {
                OperationError::WrongCatalog {
                    control: control.to_string(),
                    kind: binding.kind.as_str().to_string(),
                    op: op.to_string(),
                }
            } else {
                OperationError::UnknownOperation { name: op.to_string() }
            }
        })?;

        debug!("Rebinding {}: {} -> {}", control, binding.op, canonical);
        binding.op = canonical.to_string();
        Ok(binding)
    }

    /// Build the event a control's new state produces
    pub fn event(&self, control: &str, value: InputValue) -> Option<InputEvent> {
        self.bindings.get(control).map(|binding| InputEvent {
            control: control.to_string(),
            kind: binding.kind,
            value,
        })
    }

    /// Build the event for an unprocessed controller reading
    ///
    /// Triggers rest at -1 and are mapped to [0, 1]; axes pass through;
    /// buttons and hats count any non-zero reading as pressed.
    pub fn raw_event(&self, control: &str, raw: f32) -> Option<InputEvent> {
        let kind = self.bindings.get(control)?.kind;
        let value = match kind {
            ControlKind::Trigger => InputValue::Value(normalize_trigger(raw)),
            ControlKind::Axis => InputValue::Value(raw),
            ControlKind::Button | ControlKind::Hat => InputValue::Pressed(raw != 0.0),
        };
        self.event(control, value)
    }

    /// Route an event through its binding into the engine
    ///
    /// Returns false for unbound controls and for values that do not match
    /// the control's kind.
    pub fn dispatch(&self, engine: &mut Engine, event: &InputEvent) -> bool {
        let Some(binding) = self.bindings.get(&event.control) else {
            debug!("No binding for control {:?}", event.control);
            return false;
        };

        match (binding.kind.is_discrete(), event.value) {
            (true, InputValue::Pressed(on)) => engine.apply_discrete(&event.control, &binding.op, on),
            (false, InputValue::Value(value)) => engine.apply_continuous(&event.control, &binding.op, value),
            _ => {
                debug!("Ignoring {:?} for {} control {}", event.value, binding.kind.as_str(), event.control);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::LightsError;

    fn bindings() -> ControlBindings {
        ControlBindings::new(Config::default().controls)
    }

    #[test]
    fn test_rebind_validates_catalog() {
        let mut bindings = bindings();

        assert_eq!(bindings.rebind("a", "rainbow").unwrap().op, "Rainbow");
        assert!(matches!(
            bindings.rebind("lx", "Copy"),
            Err(LightsError::Operation(OperationError::WrongCatalog { .. }))
        ));
        assert!(matches!(
            bindings.rebind("a", "Sparkle"),
            Err(LightsError::Operation(OperationError::UnknownOperation { .. }))
        ));
        assert!(matches!(
            bindings.rebind("z9", "Red"),
            Err(LightsError::Operation(OperationError::UnknownControl { .. }))
        ));
    }

    #[test]
    fn test_dispatch_uses_binding() {
        let config = Config::default();
        let bindings = ControlBindings::new(config.controls.clone());
        let mut engine = Engine::from_config(&config);

        // "b" is bound to Red
        let press = bindings.event("b", InputValue::Pressed(true)).unwrap();
        assert!(bindings.dispatch(&mut engine, &press));
        assert_eq!(engine.compose().get(0), Some([255, 0, 0]));

        let wrong = bindings.event("b", InputValue::Value(0.5)).unwrap();
        assert!(!bindings.dispatch(&mut engine, &wrong));
        assert!(bindings.event("nope", InputValue::Pressed(true)).is_none());
    }

    #[test]
    fn test_trigger_normalization() {
        assert_eq!(normalize_trigger(-1.0), 0.0);
        assert_eq!(normalize_trigger(1.0), 1.0);
        assert_eq!(normalize_trigger(0.0), 0.5);
    }

    #[test]
    fn test_raw_event_by_kind() {
        let bindings = bindings();

        // "rt" is a trigger, "lx" an axis, "b" a button
        assert_eq!(bindings.raw_event("rt", -1.0).unwrap().value, InputValue::Value(0.0));
        assert_eq!(bindings.raw_event("rt", 0.0).unwrap().value, InputValue::Value(0.5));
        assert_eq!(bindings.raw_event("lx", -0.25).unwrap().value, InputValue::Value(-0.25));
        assert_eq!(bindings.raw_event("b", 1.0).unwrap().value, InputValue::Pressed(true));
        assert_eq!(bindings.raw_event("b", 0.0).unwrap().value, InputValue::Pressed(false));
        assert!(bindings.raw_event("nope", 1.0).is_none());
    }

    #[test]
    fn test_catalog_matches_kind() {
        let buttons = ControlKind::Button.catalog();
        assert!(buttons.contains(&"Rainbow"));
        assert!(!buttons.contains(&"RollR"));
        assert_eq!(ControlKind::Hat.catalog(), buttons);

        let triggers = ControlKind::Trigger.catalog();
        assert!(triggers.contains(&"RollR"));
        assert!(!triggers.contains(&"Copy"));
    }
}
