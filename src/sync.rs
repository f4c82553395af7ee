use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

/// Lock a mutex, taking the data back from a poisoned lock
///
/// A writer that panicked mid-update leaves at worst one odd frame; the
/// animation loop and the server keep going.
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("Recovering poisoned lock");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_recovers_after_panicking_writer() {
        let shared = Arc::new(Mutex::new(1));
        let writer = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let mut guard = writer.lock().unwrap();
            *guard = 2;
            panic!("writer failed");
        })
        .join();

        assert!(shared.is_poisoned());
        assert_eq!(*lock_recover(&shared), 2);
    }
}
