//! Fault state for the firmware.
//!
//! A codec that is half-configured can emit full-scale noise into the
//! output stage. Once a fault is latched the control context stops issuing
//! bus traffic and shows the fault blink pattern until power cycle.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Why the firmware stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// Codec reset sequence finished with registers that exhausted every
    /// retry. Data word: number of failed registers.
    CodecInit = 1,

    /// The audio context did not acknowledge a mode change in time.
    /// Data word: requested mode.
    ModeHandoff = 2,

    /// The audio context did not park for a core lockout in time.
    Lockout = 3,

    /// Peripheral bring-up failed (I2C, I2S, GPIO driver error).
    Hardware = 4,
}

impl FaultCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::CodecInit,
            2 => FaultCode::ModeHandoff,
            3 => FaultCode::Lockout,
            4 => FaultCode::Hardware,
            _ => FaultCode::None,
        }
    }
}

/// Lock-free latched fault.
///
/// ```ignore
/// static FAULT: FaultState = FaultState::new();
///
/// let report = codec.init()?;
/// if report.failures > 0 {
///     FAULT.set(FaultCode::CodecInit, report.failures);
/// }
///
/// // main loop
/// if FAULT.is_active() {
///     show_fault_pattern();
/// }
/// ```
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,
    /// Detail word, meaning depends on the code.
    data: AtomicU32,
    /// Faults since boot, never cleared.
    count: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Latch a fault. Code and data are published before `active`.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear the active flag; the count is kept for diagnostics.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Fault state at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}
