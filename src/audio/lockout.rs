//! Audio core lockout.
//!
//! Holds the audio context parked at a buffer boundary while the control
//! context does something that must not race with the audio callback
//! (flash writes, for one: the callback may execute from flash cache).
//!
//! Acquisition is scoped: [`AudioLockout::acquire`] returns a
//! [`LockoutGuard`] and dropping the guard releases the audio core on every
//! exit path, including `?` and early returns.

use core::sync::atomic::{AtomicBool, Ordering};

use super::mode::HandoffWait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutError {
    /// A guard is already alive.
    AlreadyHeld,
    /// The audio context did not reach a buffer boundary in time; the
    /// request was withdrawn.
    Timeout,
}

impl core::fmt::Display for LockoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LockoutError::AlreadyHeld => f.write_str("audio lockout already held"),
            LockoutError::Timeout => f.write_str("audio core did not park"),
        }
    }
}

pub struct AudioLockout {
    /// Written by control only.
    requested: AtomicBool,
    /// Written by audio only.
    parked: AtomicBool,
}

impl AudioLockout {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            parked: AtomicBool::new(false),
        }
    }

    /// Park the audio context, spinning between polls.
    pub fn acquire(&self, wait: HandoffWait) -> Result<LockoutGuard<'_>, LockoutError> {
        self.acquire_with(wait, core::hint::spin_loop)
    }

    /// Park the audio context, calling `relax` between polls.
    pub fn acquire_with(
        &self,
        wait: HandoffWait,
        mut relax: impl FnMut(),
    ) -> Result<LockoutGuard<'_>, LockoutError> {
        if self.requested.load(Ordering::Acquire) {
            return Err(LockoutError::AlreadyHeld);
        }

        // The audio core may still be leaving the previous lockout; a stale
        // `parked` must not be mistaken for an acknowledgment.
        let mut polls = 0u32;
        while self.parked.load(Ordering::Acquire) {
            if !wait.allows(polls) {
                return Err(LockoutError::Timeout);
            }
            relax();
            polls = polls.saturating_add(1);
        }

        if self
            .requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LockoutError::AlreadyHeld);
        }

        while !self.parked.load(Ordering::Acquire) {
            if !wait.allows(polls) {
                self.requested.store(false, Ordering::Release);
                return Err(LockoutError::Timeout);
            }
            relax();
            polls = polls.saturating_add(1);
        }

        Ok(LockoutGuard { lockout: self })
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_parked(&self) -> bool {
        self.parked.load(Ordering::Acquire)
    }

    /// Audio side, at the top of each buffer: if a lockout is requested,
    /// acknowledge and stay here, calling `relax`, until it is released.
    ///
    /// Returns `true` if the audio context was parked.
    #[inline]
    pub fn checkpoint(&self, mut relax: impl FnMut()) -> bool {
        if !self.requested.load(Ordering::Acquire) {
            return false;
        }

        self.parked.store(true, Ordering::Release);
        while self.requested.load(Ordering::Acquire) {
            relax();
        }
        self.parked.store(false, Ordering::Release);
        true
    }

    fn release(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

impl Default for AudioLockout {
    fn default() -> Self {
        Self::new()
    }
}

/// Live audio lockout. The audio core resumes when this is dropped.
#[must_use = "the audio core resumes as soon as the guard is dropped"]
pub struct LockoutGuard<'a> {
    lockout: &'a AudioLockout,
}

impl Drop for LockoutGuard<'_> {
    fn drop(&mut self) {
        self.lockout.release();
    }
}
