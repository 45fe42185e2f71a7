//! Presentation collaborators that need no window or audio device.

use std::sync::atomic::{AtomicUsize, Ordering};

use delve_core::{Presentation, SoundKind};
use parking_lot::Mutex;

/// Presentation that drops every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Presentation for Headless {
    fn request_redraw(&self) {}

    fn play_sound(&self, _sound: SoundKind) {}
}

/// Presentation that remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    redraws: AtomicUsize,
    sounds: Mutex<Vec<SoundKind>>,
}

impl RecordingPresentation {
    /// Number of redraw requests received.
    #[must_use]
    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::Relaxed)
    }

    /// Sounds requested so far, oldest first.
    #[must_use]
    pub fn sounds(&self) -> Vec<SoundKind> {
        self.sounds.lock().clone()
    }
}

impl Presentation for RecordingPresentation {
    fn request_redraw(&self) {
        let _ = self.redraws.fetch_add(1, Ordering::Relaxed);
    }

    fn play_sound(&self, sound: SoundKind) {
        self.sounds.lock().push(sound);
    }
}
