//! Cross-core mode handoff.
//!
//! ```text
//! control (core 0)                 audio (core 1)
//! ────────────────                 ──────────────
//! request(id) ──▶ desired ───────▶ begin_buffer(): active = desired
//!      ▲                                 │
//!      └────── poll until active == desired
//! ```
//!
//! `desired` has one writer (control) and `active` has one writer (audio).
//! The audio context latches the mode once per buffer, so a change always
//! lands on a buffer boundary.

use core::sync::atomic::{AtomicU8, Ordering};

/// How long `request` waits for the audio context to acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffWait {
    /// Poll until acknowledged. Hangs if the audio context never runs.
    Forever,
    /// Give up after this many polls.
    Polls(u32),
}

impl HandoffWait {
    /// True while another poll is allowed after `polls` unsuccessful ones.
    #[inline]
    pub(crate) fn allows(self, polls: u32) -> bool {
        match self {
            HandoffWait::Forever => true,
            HandoffWait::Polls(max) => polls < max,
        }
    }
}

/// Outcome of a successful request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRequest {
    /// Already the desired mode; nothing was written or awaited.
    Unchanged,
    /// The audio context switched; `polls` relax calls were spent waiting.
    Applied { polls: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeError {
    /// Mode id not in `0..count`; no flag was touched.
    OutOfRange { requested: u8, count: u8 },
    /// The audio context did not acknowledge in time. `desired` stays set
    /// and the switch still happens on the next buffer the audio core runs.
    Timeout { desired: u8, active: u8 },
}

impl core::fmt::Display for ModeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ModeError::OutOfRange { requested, count } => {
                write!(f, "mode {} out of range (0..{})", requested, count)
            }
            ModeError::Timeout { desired, active } => {
                write!(f, "mode handoff timed out (desired {}, active {})", desired, active)
            }
        }
    }
}

pub struct ModeController {
    desired: AtomicU8,
    active: AtomicU8,
    mode_count: u8,
}

impl ModeController {
    /// Controller for `mode_count` modes, starting in mode 0.
    pub const fn new(mode_count: u8) -> Self {
        Self::with_initial(mode_count, 0)
    }

    pub const fn with_initial(mode_count: u8, initial: u8) -> Self {
        assert!(mode_count > 0, "at least one mode is required");
        assert!(initial < mode_count, "initial mode out of range");

        Self {
            desired: AtomicU8::new(initial),
            active: AtomicU8::new(initial),
            mode_count,
        }
    }

    #[inline]
    pub fn mode_count(&self) -> u8 {
        self.mode_count
    }

    /// Mode most recently requested by the control context.
    #[inline]
    pub fn desired(&self) -> u8 {
        self.desired.load(Ordering::Acquire)
    }

    /// Mode the audio context latched for its current buffer.
    #[inline]
    pub fn active(&self) -> u8 {
        self.active.load(Ordering::Acquire)
    }

    /// True once the audio context has caught up with the last request.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.desired() == self.active()
    }

    /// Request mode `id` and wait for the audio context to apply it,
    /// spinning between polls.
    pub fn request(&self, id: u8, wait: HandoffWait) -> Result<ModeRequest, ModeError> {
        self.request_with(id, wait, core::hint::spin_loop)
    }

    /// As [`request`](Self::request), calling `relax` between polls (a
    /// scheduler yield on target so the idle task keeps the watchdog fed).
    pub fn request_with(
        &self,
        id: u8,
        wait: HandoffWait,
        mut relax: impl FnMut(),
    ) -> Result<ModeRequest, ModeError> {
        // Control context is the only writer of `desired`.
        if id == self.desired.load(Ordering::Relaxed) {
            return Ok(ModeRequest::Unchanged);
        }
        if id >= self.mode_count {
            return Err(ModeError::OutOfRange {
                requested: id,
                count: self.mode_count,
            });
        }

        self.desired.store(id, Ordering::Release);

        let mut polls = 0u32;
        loop {
            let active = self.active.load(Ordering::Acquire);
            if active == id {
                return Ok(ModeRequest::Applied { polls });
            }
            if !wait.allows(polls) {
                return Err(ModeError::Timeout { desired: id, active });
            }
            relax();
            polls = polls.saturating_add(1);
        }
    }

    /// Audio side, once per buffer before generating: latch `desired` into
    /// `active` and return the mode for the whole buffer.
    #[inline]
    pub fn begin_buffer(&self) -> u8 {
        let mode = self.desired.load(Ordering::Acquire);
        self.active.store(mode, Ordering::Release);
        mode
    }
}
