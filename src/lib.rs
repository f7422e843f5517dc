//! # codec-audio
//!
//! Dual-core audio codec firmware for ESP32-S3.
//!
//! ## Architecture
//!
//! - Control context (core 0): codec bring-up over I2C or L3, button
//!   polling, mode requests, log drain.
//! - Audio context (core 1): one [`AudioEngine::process`] call per I2S
//!   buffer, no locks, no bus traffic, no allocation.
//!
//! The two contexts share nothing but the atomics in [`ModeController`] and
//! [`AudioLockout`].

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod codec;
pub mod config;
pub mod fault;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod panel;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use audio::{AudioEngine, AudioLockout, AudioMode, HandoffWait, ModeController};
pub use codec::{Codec, CodecError, CodecKind, SequenceReport};
pub use config::CONFIG;
pub use fault::{FaultCode, FaultState};
