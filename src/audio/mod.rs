//! Audio subsystem: everything that runs on the audio core.
//!
//! - Sine LUT (1024 entries) + 32-bit phase accumulator
//! - Saw / interpolated sine / passthrough, stereo with inverted right channel
//! - Lock-free mode handoff and core lockout shared with the control core

pub mod engine;
pub mod lockout;
pub mod lut;
pub mod mode;
pub mod oscillator;

pub use engine::AudioEngine;
pub use lockout::{AudioLockout, LockoutError, LockoutGuard};
pub use lut::{LUT_SIZE, SINE_LUT};
pub use mode::{HandoffWait, ModeController, ModeError, ModeRequest};
pub use oscillator::{phase_increment, saw, sine_interp, AudioMode, Oscillator, MAX_INCREMENT};
