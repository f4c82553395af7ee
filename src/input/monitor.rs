use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::sync::lock_recover;

use super::{ControlKind, InputEvent, InputValue};

/// Axis deflection that counts as activity
const AXIS_THRESHOLD: f32 = 0.1;
/// Trigger pull that counts as activity
const TRIGGER_THRESHOLD: f32 = 0.05;

/// Tracks which controls are currently in use, for display only
///
/// Fed from a bounded queue of raw events. It never touches the engine.
#[derive(Debug, Clone, Default)]
pub struct ActivityMonitor {
    active: Arc<Mutex<BTreeMap<String, bool>>>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an event leaves its control highlighted
    pub fn is_active(event: &InputEvent) -> bool {
        match (event.kind, event.value) {
            (_, InputValue::Pressed(on)) => on,
            (ControlKind::Trigger, InputValue::Value(v)) => v > TRIGGER_THRESHOLD,
            (_, InputValue::Value(v)) => v.abs() > AXIS_THRESHOLD,
        }
    }

    pub fn record(&self, event: &InputEvent) {
        let active = Self::is_active(event);
        trace!("{} active: {}", event.control, active);
        lock_recover(&self.active).insert(event.control.clone(), active);
    }

    pub fn is_control_active(&self, control: &str) -> bool {
        lock_recover(&self.active).get(control).copied().unwrap_or(false)
    }

    /// Activity of every control seen so far
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        lock_recover(&self.active).clone()
    }

    /// Drain the event queue until every sender is gone
    pub fn spawn(&self, mut events: mpsc::Receiver<InputEvent>) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                monitor.record(&event);
            }
            debug!("Input event queue closed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(control: &str, kind: ControlKind, value: InputValue) -> InputEvent {
        InputEvent {
            control: control.to_string(),
            kind,
            value,
        }
    }

    #[test]
    fn test_activity_thresholds() {
        assert!(ActivityMonitor::is_active(&event("a", ControlKind::Button, InputValue::Pressed(true))));
        assert!(!ActivityMonitor::is_active(&event("up", ControlKind::Hat, InputValue::Pressed(false))));
        assert!(ActivityMonitor::is_active(&event("lx", ControlKind::Axis, InputValue::Value(-0.2))));
        assert!(!ActivityMonitor::is_active(&event("lx", ControlKind::Axis, InputValue::Value(0.1))));
        assert!(ActivityMonitor::is_active(&event("lt", ControlKind::Trigger, InputValue::Value(0.06))));
        assert!(!ActivityMonitor::is_active(&event("lt", ControlKind::Trigger, InputValue::Value(0.0))));
    }

    #[tokio::test]
    async fn test_task_drains_queue() {
        let monitor = ActivityMonitor::new();
        let (tx, rx) = mpsc::channel(4);
        let task = monitor.spawn(rx);

        tx.send(event("a", ControlKind::Button, InputValue::Pressed(true))).await.unwrap();
        tx.send(event("lt", ControlKind::Trigger, InputValue::Value(0.0))).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(monitor.is_control_active("a"));
        assert!(!monitor.is_control_active("lt"));
        assert_eq!(monitor.snapshot().len(), 2);
    }
}
