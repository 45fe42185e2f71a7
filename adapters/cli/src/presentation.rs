//! Presentation backend that reports through `tracing` instead of a window.

use std::sync::atomic::{AtomicU64, Ordering};

use delve_core::{Presentation, SoundKind};
use tracing::{info, trace};

/// Logs sound requests and counts repaint requests.
#[derive(Debug, Default)]
pub(crate) struct TracingPresentation {
    redraws: AtomicU64,
}

impl TracingPresentation {
    /// Repaint requests received so far.
    pub(crate) fn redraws(&self) -> u64 {
        self.redraws.load(Ordering::Relaxed)
    }
}

impl Presentation for TracingPresentation {
    fn request_redraw(&self) {
        let previous = self.redraws.fetch_add(1, Ordering::Relaxed);
        trace!(frame = previous + 1, "redraw requested");
    }

    fn play_sound(&self, sound: SoundKind) {
        info!(?sound, "sound");
    }
}
