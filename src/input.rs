//! Input handling for the fallback button and the external trigger.
//!
//! This module provides:
//! - `Debouncer`, a polled edge detector for an active-low push button
//! - `TriggerFlag`, a one-shot "event requested" flag that another context
//!   (network handler, ISR) can raise and the control loop consumes
//!
//! The button is wired to GND with a pull-up, so a low level means pressed.

use core::sync::atomic::{AtomicBool, Ordering};

// Debounced button edge detector
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    last_raw_high: bool,
    stable_since: u64,
    stable_high: bool,
    debounce_ms: u64,
}

impl Debouncer {
    /// Starts released (high).
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            last_raw_high: true,
            stable_since: 0,
            stable_high: true,
            debounce_ms,
        }
    }

    /// Feed one raw sample. Returns true exactly once per debounced press
    /// (released -> pressed); releases never produce an edge.
    pub fn update(&mut self, now_ms: u64, level_is_high: bool) -> bool {
        // any raw change restarts the stability window
        if level_is_high != self.last_raw_high {
            self.last_raw_high = level_is_high;
            self.stable_since = now_ms;
            return false;
        }

        if level_is_high == self.stable_high {
            return false;
        }
        if now_ms.saturating_sub(self.stable_since) < self.debounce_ms {
            return false;
        }

        self.stable_high = level_is_high;
        !level_is_high
    }

    pub fn is_pressed(&self) -> bool {
        !self.stable_high
    }
}

/// External trigger ingress, checked once per poll.
pub struct TriggerFlag {
    requested: AtomicBool,
}

impl TriggerFlag {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Read and clear. A request that is not accepted is dropped, not queued.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::Acquire)
    }
}

impl Default for TriggerFlag {
    fn default() -> Self {
        Self::new()
    }
}
