//! Global log stream instances, one per execution context.

use crate::logging::LogStream;

/// Control context (core 0): bus transactions, replay delays, mode requests.
pub static CTRL_LOG: LogStream = LogStream::new();

/// Audio context (core 1). Push only; never format inside the sample loop.
pub static AUDIO_LOG: LogStream = LogStream::new();
