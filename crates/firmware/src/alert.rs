//! Binary alert between the signal task and the audio task.
//!
//! Releasing an already-released alert has no further effect: any number of
//! detections before the audio task wakes produce exactly one pulse.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Coalescing "play a beep" flag.
pub struct AlertSignal {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl AlertSignal {
    /// An un-signalled alert.
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Request one pulse. Never blocks.
    pub fn release(&self) {
        self.signal.signal(());
    }

    /// Wait until a pulse is requested and consume the request.
    pub async fn acquire(&self) {
        self.signal.wait().await;
    }

    /// `true` while a request is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }
}

impl Default for AlertSignal {
    fn default() -> Self {
        Self::new()
    }
}
