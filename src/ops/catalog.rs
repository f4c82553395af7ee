//! Fixed operation catalogs and the stage each operation is resolved in.

use serde::Serialize;

/// Name shown for a control with no operation bound
pub const UNASSIGNED: &str = "-";

/// On/off operations, bound to buttons and hat directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscreteOp {
    Unassigned,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
    Pink,
    Bright,
    Dark,
    White,
    Black,
    Copy,
    One,
    Evens,
    Odds,
    Rainbow,
    Alt,
    Gradient,
    Record,
}

impl DiscreteOp {
    pub const ALL: [DiscreteOp; 21] = [
        Self::Unassigned,
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Indigo,
        Self::Violet,
        Self::Pink,
        Self::Bright,
        Self::Dark,
        Self::White,
        Self::Black,
        Self::Copy,
        Self::One,
        Self::Evens,
        Self::Odds,
        Self::Rainbow,
        Self::Alt,
        Self::Gradient,
        Self::Record,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => UNASSIGNED,
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Indigo => "Indigo",
            Self::Violet => "Violet",
            Self::Pink => "Pink",
            Self::Bright => "Bright",
            Self::Dark => "Dark",
            Self::White => "White",
            Self::Black => "Black",
            Self::Copy => "Copy",
            Self::One => "One",
            Self::Evens => "Evens",
            Self::Odds => "Odds",
            Self::Rainbow => "Rainbow",
            Self::Alt => "Alt",
            Self::Gradient => "Gradient",
            Self::Record => "Record",
        }
    }

    /// Parse a catalog name, ignoring ASCII case
    pub fn parse_from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
    }
}

/// Proportional operations, bound to sticks and triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContinuousOp {
    Unassigned,
    Red,
    Green,
    Blue,
    Hue,
    Light,
    Roll,
    RollL,
    RollR,
}

impl ContinuousOp {
    pub const ALL: [ContinuousOp; 9] = [
        Self::Unassigned,
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Hue,
        Self::Light,
        Self::Roll,
        Self::RollL,
        Self::RollR,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => UNASSIGNED,
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Hue => "Hue",
            Self::Light => "Light",
            Self::Roll => "Roll",
            Self::RollL => "RollL",
            Self::RollR => "RollR",
        }
    }

    /// Parse a catalog name, ignoring ASCII case
    pub fn parse_from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
    }
}

/// Every operation name that owns a slot in the sum table
///
/// A discrete and a continuous operation with the same name (e.g. `Red`)
/// share one slot per control.
pub fn sum_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Vec::new();
    let names = DiscreteOp::ALL
        .iter()
        .map(|op| op.as_str())
        .chain(ContinuousOp::ALL.iter().map(|op| op.as_str()));
    for name in names {
        if name != UNASSIGNED && !keys.contains(&name) {
            keys.push(name);
        }
    }
    keys
}

/// Operations resolved in each color space, in application order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stages {
    pub rgb: Vec<&'static str>,
    pub hsl: Vec<&'static str>,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            rgb: vec![
                "Red", "Green", "Blue", "Yellow", "Orange", "Indigo", "Violet", "Pink",
                "White", "Black", "Rainbow", "One", "Evens", "Odds",
            ],
            hsl: vec!["Bright", "Dark", "Hue", "Light"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_catalog_names() {
        for op in DiscreteOp::ALL {
            assert_eq!(DiscreteOp::parse_from_str(op.as_str()), Some(op));
        }
        for op in ContinuousOp::ALL {
            assert_eq!(ContinuousOp::parse_from_str(op.as_str()), Some(op));
        }
        assert_eq!(DiscreteOp::parse_from_str("rainbow"), Some(DiscreteOp::Rainbow));
        assert_eq!(ContinuousOp::parse_from_str("Rainbow"), None);
        assert_eq!(DiscreteOp::parse_from_str("Sparkle"), None);
    }

    #[test]
    fn test_shared_names_get_one_slot() {
        let keys = sum_keys();
        assert_eq!(keys.iter().filter(|k| **k == "Red").count(), 1);
        assert!(keys.contains(&"Roll"));
        assert!(!keys.contains(&UNASSIGNED));
    }

    #[test]
    fn test_each_op_in_at_most_one_stage() {
        let stages = Stages::default();
        for op in &stages.rgb {
            assert!(!stages.hsl.contains(op), "{} is in both stages", op);
        }
    }
}
