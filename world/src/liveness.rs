//! Cooperative cancellation shared by every loop of a scene.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Scene-wide run flag with an interruptible sleep.
///
/// Loops call [`Liveness::sleep`] between iterations; [`Liveness::deactivate`]
/// wakes every sleeper at once so shutdown does not wait out long intervals.
#[derive(Debug)]
pub struct Liveness {
    running: Mutex<bool>,
    signal: Condvar,
}

impl Liveness {
    /// Creates an active flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: Mutex::new(true),
            signal: Condvar::new(),
        }
    }

    /// Reports whether the scene is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self.running.lock()
    }

    /// Clears the flag and wakes every sleeping loop.
    pub fn deactivate(&self) {
        let mut running = self.running.lock();
        if *running {
            *running = false;
            let _ = self.signal.notify_all();
        }
    }

    /// Sleeps for `duration` or until deactivation, whichever comes first.
    ///
    /// Returns whether the scene is still running afterwards.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut running = self.running.lock();
        while *running {
            if self.signal.wait_until(&mut running, deadline).timed_out() {
                break;
            }
        }
        *running
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn sleep_returns_true_while_active() {
        let liveness = Liveness::new();
        assert!(liveness.sleep(Duration::from_millis(5)));
    }

    #[test]
    fn deactivate_interrupts_long_sleep() {
        let liveness = Arc::new(Liveness::new());
        let sleeper = Arc::clone(&liveness);
        let started = Instant::now();
        let handle = thread::spawn(move || sleeper.sleep(Duration::from_secs(30)));

        thread::sleep(Duration::from_millis(20));
        liveness.deactivate();

        assert!(!handle.join().expect("sleeper panicked"));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!liveness.is_active());
    }
}
