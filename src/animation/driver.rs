use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::{error::Result, output::RenderSink, sync::lock_recover};

use super::engine::SharedEngine;

/// Runs engine ticks and pushes changed frames to a sink
///
/// The engine lock is held only while the tick is computed; the sink is
/// called afterwards so a slow device never blocks input.
pub struct AnimationDriver<S: RenderSink> {
    engine: SharedEngine,
    sink: S,
    running: Arc<AtomicBool>,
    fallback_delay: Duration,
}

impl<S: RenderSink + 'static> AnimationDriver<S> {
    pub fn new(engine: SharedEngine, sink: S) -> Self {
        let fallback_delay = lock_recover(&engine).default_delay();
        Self {
            engine,
            sink,
            running: Arc::new(AtomicBool::new(true)),
            fallback_delay,
        }
    }

    /// Run one tick and return how long to sleep before the next
    pub fn step(&mut self) -> Duration {
        let engine = &self.engine;
        let tick = match panic::catch_unwind(AssertUnwindSafe(|| lock_recover(engine).tick())) {
            Ok(tick) => tick,
            Err(_) => {
                error!("Animation tick panicked, continuing");
                return self.fallback_delay;
            }
        };

        if let Some(frame) = tick.frame {
            match self.sink.render(&frame) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    warn!("Render to {} failed: {}", self.sink.name(), e.user_message());
                }
                Err(e) => error!("Render to {} failed: {}", self.sink.name(), e.user_message()),
            }
        }
        tick.delay
    }

    /// Tick until stopped
    pub fn run(mut self) {
        info!("Animation started, rendering to {}", self.sink.name());
        while self.running.load(Ordering::Relaxed) {
            let delay = self.step();
            thread::sleep(delay);
        }
        info!("Animation stopped");
    }

    /// Run on a dedicated thread
    pub fn spawn(self) -> Result<DriverHandle> {
        let running = Arc::clone(&self.running);
        let thread = thread::Builder::new()
            .name("animation".to_string())
            .spawn(move || self.run())?;
        Ok(DriverHandle { running, thread })
    }
}

/// Handle to a spawned animation thread
pub struct DriverHandle {
    running: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl DriverHandle {
    /// Ask the loop to stop and wait for the current tick to finish
    pub fn stop(self) {
        self.running.store(false, Ordering::Relaxed);
        if self.thread.join().is_err() {
            error!("Animation thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Engine;
    use crate::error::{LightsError, OutputError};
    use crate::ops::RollTiming;
    use crate::strip::Frame;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Capture {
        frames: Arc<Mutex<Vec<Frame>>>,
        fail: bool,
    }

    impl RenderSink for Capture {
        fn name(&self) -> &str {
            "capture"
        }

        fn render(&mut self, frame: &Frame) -> Result<()> {
            self.frames.lock().unwrap().push(frame.clone());
            if self.fail {
                return Err(LightsError::from(OutputError::WriteFailed {
                    sink: "capture".to_string(),
                    reason: "unplugged".to_string(),
                }));
            }
            Ok(())
        }
    }

    #[test]
    fn test_renders_only_changes() {
        let engine = Engine::new(2, ["a"], RollTiming::default()).into_shared();
        let sink = Capture::default();
        let mut driver = AnimationDriver::new(Arc::clone(&engine), sink.clone());

        driver.step();
        lock_recover(&engine).apply_discrete("a", "Blue", true);
        let delay = driver.step();
        driver.step();

        assert_eq!(delay, Duration::from_millis(50));
        assert_eq!(*sink.frames.lock().unwrap(), vec![Frame::new_filled(2, [0, 0, 255])]);
    }

    #[test]
    fn test_sink_failure_keeps_ticking() {
        let engine = Engine::new(1, ["a"], RollTiming::default()).into_shared();
        let sink = Capture {
            fail: true,
            ..Capture::default()
        };
        let mut driver = AnimationDriver::new(Arc::clone(&engine), sink.clone());

        lock_recover(&engine).apply_discrete("a", "Red", true);
        driver.step();
        lock_recover(&engine).apply_discrete("a", "Red", false);
        driver.step();

        assert_eq!(sink.frames.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_spawned_driver_stops() {
        let engine = Engine::new(1, ["a"], RollTiming::default()).into_shared();
        let handle = AnimationDriver::new(engine, Capture::default()).spawn().unwrap();
        thread::sleep(Duration::from_millis(20));
        handle.stop();
    }
}
