//! # Operations
//!
//! Named pixel transforms driven by controls. Discrete operations write a
//! fixed pattern while their control is held; continuous operations follow an
//! analog value. Each writes only its own (operation, control) slot in the
//! [`SumTable`]; the composer adds all slots together.

pub mod catalog;
pub mod registry;
pub mod strategies;
pub mod sums;
pub mod traits;

pub use catalog::{sum_keys, ContinuousOp, DiscreteOp, Stages, UNASSIGNED};
pub use registry::OperationRegistry;
pub use strategies::RollTiming;
pub use sums::{DeltaArray, SumTable};
pub use traits::{ContinuousOperation, DiscreteOperation, Modifiers, OpEffect};
