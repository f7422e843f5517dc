//! Front panel: status LED blink patterns and the mode button.
//!
//! Both are polled from the control loop with a microsecond timestamp; no
//! timers or interrupts.

use crate::audio::AudioMode;

/// Blink pattern step unit.
pub const STEP_US: i64 = 10_000;

/// Toggle intervals in [`STEP_US`] units, one pattern per mode. The LED is
/// switched on at the start of each pattern and toggles after every step.
const PATTERNS: [&[u8]; AudioMode::COUNT as usize] = [
    &[10, 50],         // saw: one short blink
    &[10, 10, 10, 50], // sine: two short blinks
    &[10, 10, 50, 50], // passthrough: one short, one long
];

/// Fast toggle shown while stalled on a fault.
pub const FAULT_TOGGLE_US: i64 = 50_000;

pub fn pattern(mode: AudioMode) -> &'static [u8] {
    PATTERNS[mode as usize]
}

/// LED state machine for a repeating blink pattern.
#[derive(Debug, Clone)]
pub struct Blinker {
    pattern: &'static [u8],
    index: usize,
    next_toggle_us: i64,
    lit: bool,
}

impl Blinker {
    /// Start `mode`'s pattern at `now_us` with the LED on.
    pub fn new(mode: AudioMode, now_us: i64) -> Self {
        let mut blinker = Self {
            pattern: pattern(mode),
            index: 0,
            next_toggle_us: now_us,
            lit: true,
        };
        blinker.schedule(now_us);
        blinker
    }

    /// Restart with a new pattern (after a mode change).
    pub fn restart(&mut self, mode: AudioMode, now_us: i64) {
        *self = Self::new(mode, now_us);
    }

    /// Advance to `now_us`. Returns the LED level if it changed.
    pub fn poll(&mut self, now_us: i64) -> Option<bool> {
        if now_us < self.next_toggle_us {
            return None;
        }
        self.lit = !self.lit;
        self.schedule(now_us);
        Some(self.lit)
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn schedule(&mut self, now_us: i64) {
        if self.index >= self.pattern.len() {
            self.index = 0;
        }
        self.next_toggle_us = now_us + STEP_US * self.pattern[self.index] as i64;
        self.index += 1;
    }
}

/// Rising-edge detector for the mode button, debounced by requiring the
/// same raw level on consecutive polls.
#[derive(Debug, Clone, Default)]
pub struct ButtonEdge {
    last_raw: bool,
    stable: bool,
}

impl ButtonEdge {
    pub const fn new() -> Self {
        Self {
            last_raw: false,
            stable: false,
        }
    }

    /// Feed one poll (`pressed` already corrected for active-low wiring).
    /// Returns `true` once per press.
    pub fn update(&mut self, pressed: bool) -> bool {
        let agreed = pressed == self.last_raw;
        self.last_raw = pressed;
        if agreed && pressed != self.stable {
            self.stable = pressed;
            return pressed;
        }
        false
    }
}
