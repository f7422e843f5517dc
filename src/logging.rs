//! Non-blocking diagnostic logging.
//!
//! ```text
//! core 0 (control)    CTRL_LOG  ─┐
//!                                ├──▶ log_drain ──▶ UART1 TX
//! core 1 (audio)      AUDIO_LOG ─┘
//! ```
//!
//! Producers format into a stack buffer and push a fixed-size record into a
//! ring. A push never blocks and never allocates; when the ring is full the
//! record is dropped and counted. Formatting and UART output happen later in
//! the drain, outside both the audio deadline and the bus retry loops.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length per record.
pub const MAX_MSG_LEN: usize = 96;

/// Default ring size (records). Must be a power of two.
pub const LOG_BUFFER_SIZE: usize = 256;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// One queued log record.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Microseconds since boot.
    pub timestamp_us: i64,
    pub level: LogLevel,
    /// Number of valid bytes in `msg`.
    pub len: u8,
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    pub const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text, or a placeholder if truncation split a UTF-8 sequence.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log ring: any number of producers, one drain.
///
/// Producers claim a slot with a CAS on the write index and publish it by
/// stamping `ready[slot]` with the claimed index + 1; the drain owns the
/// read index and stops at the first unpublished slot.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: UnsafeCell<[LogEntry; N]>,
    ready: [AtomicU32; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: every producer writes only the slot its CAS claimed, and the
// single drain reads a slot only after its ready stamp is published.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            slots: UnsafeCell::new([LogEntry::EMPTY; N]),
            ready: [const { AtomicU32::new(0) }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a record. Returns `false` (and counts a drop) if the ring is full.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let read = self.read_idx.load(Ordering::Acquire);
        let mut write = self.write_idx.load(Ordering::Relaxed);

        // Claim a slot only if one is free, so a full ring never advances
        // the write index past unread records.
        loop {
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: slot `write` was claimed exclusively above.
        unsafe {
            let slot = &mut (*self.slots.get())[write as usize & Self::MASK];
            slot.timestamp_us = timestamp_us;
            slot.level = level;
            slot.len = len as u8;
            slot.msg[..len].copy_from_slice(&msg[..len]);
        }
        self.ready[write as usize & Self::MASK].store(write.wrapping_add(1), Ordering::Release);

        true
    }

    /// Take the oldest record, if any.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }
        // Claimed but not yet written.
        if self.ready[read as usize & Self::MASK].load(Ordering::Acquire) != read.wrapping_add(1) {
            return None;
        }

        // SAFETY: single drain; slot `read` has been published.
        let entry = unsafe { (*self.slots.get())[read as usize & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and clear the drop counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// `core::fmt::Write` adapter over a byte slice; silently truncates.
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }
}

impl core::fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let n = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
        self.pos += n;
        Ok(())
    }
}

/// Format `args` into `buf`, returning the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = SliceWriter::new(buf);
    let _ = core::fmt::write(&mut writer, args);
    writer.len()
}

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
#[inline]
pub fn timestamp_us() -> i64 {
    // SAFETY: esp_timer_get_time has no preconditions once the scheduler runs.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// Host builds have no boot clock; records carry zero.
#[cfg(not(target_os = "espidf"))]
#[inline]
pub fn timestamp_us() -> i64 {
    0
}

/// Push a formatted record to `$stream`.
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! ctrl_error {
    ($($arg:tt)*) => {
        $crate::rt_error!($crate::log_globals::CTRL_LOG, $crate::logging::timestamp_us(), $($arg)*)
    };
}

/// Control-context info record on [`CTRL_LOG`](crate::log_globals::CTRL_LOG).
#[macro_export]
macro_rules! ctrl_info {
    ($($arg:tt)*) => {
        $crate::rt_info!($crate::log_globals::CTRL_LOG, $crate::logging::timestamp_us(), $($arg)*)
    };
}

#[macro_export]
macro_rules! ctrl_warn {
    ($($arg:tt)*) => {
        $crate::rt_warn!($crate::log_globals::CTRL_LOG, $crate::logging::timestamp_us(), $($arg)*)
    };
}

#[macro_export]
macro_rules! ctrl_debug {
    ($($arg:tt)*) => {
        $crate::rt_debug!($crate::log_globals::CTRL_LOG, $crate::logging::timestamp_us(), $($arg)*)
    };
}
