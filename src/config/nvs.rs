//! NVS persistence for the selected audio mode, with schema versioning.
//!
//! # Version History
//!
//! - **v1** (current): `mode` (u8, audio mode id)
//!
//! Flash writes stall instruction fetch on both cores, so every write runs
//! with the audio core parked behind an [`AudioLockout`] guard.

use core::cmp::Ordering;

use crate::audio::{AudioLockout, AudioMode, HandoffWait, LockoutError};

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Current NVS schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// NVS namespace for firmware state
pub const NVS_NAMESPACE: &str = "codec_audio";

/// NVS key for schema version
const VERSION_KEY: &str = "schema_ver";

/// NVS key for the selected audio mode
const MODE_KEY: &str = "mode";

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    /// Nothing stored yet; use the configured initial mode.
    FreshInstall,
    /// Stored mode read back.
    UpToDate { mode: AudioMode },
}

/// NVS operation errors
#[derive(Debug)]
pub enum NvsError {
    /// NVS initialization failed
    #[cfg(target_os = "espidf")]
    InitFailed(EspError),
    /// Schema version too new (downgrade not supported)
    TooNew { stored_version: u32 },
    /// NVS read/write error
    #[cfg(target_os = "espidf")]
    IoError(EspError),
    /// Stored mode id is not a valid mode
    InvalidMode(u8),
    /// Audio core could not be parked for the write
    Lockout(LockoutError),
    /// Feature not available on this platform
    #[cfg(not(target_os = "espidf"))]
    NotAvailable,
}

#[cfg(target_os = "espidf")]
impl From<EspError> for NvsError {
    fn from(e: EspError) -> Self {
        NvsError::IoError(e)
    }
}

impl From<LockoutError> for NvsError {
    fn from(e: LockoutError) -> Self {
        NvsError::Lockout(e)
    }
}

/// Interpret the stored schema version and mode byte.
///
/// Version 0 (key absent) is a fresh install regardless of the mode key.
pub fn decode(stored_version: u32, stored_mode: Option<u8>) -> Result<LoadResult, NvsError> {
    match stored_version.cmp(&CURRENT_SCHEMA_VERSION) {
        Ordering::Equal => match stored_mode {
            Some(raw) => AudioMode::from_u8(raw)
                .map(|mode| LoadResult::UpToDate { mode })
                .ok_or(NvsError::InvalidMode(raw)),
            None => Ok(LoadResult::FreshInstall),
        },
        Ordering::Less => Ok(LoadResult::FreshInstall),
        Ordering::Greater => Err(NvsError::TooNew { stored_version }),
    }
}

/// Mode to start in: the stored one, or `fallback` when nothing usable is
/// stored.
pub fn startup_mode(loaded: &Result<LoadResult, NvsError>, fallback: AudioMode) -> AudioMode {
    match loaded {
        Ok(LoadResult::UpToDate { mode }) => *mode,
        _ => fallback,
    }
}

/// Run `write` with the audio core parked.
///
/// The guard is dropped on every exit path, so the audio core resumes even
/// when `write` fails.
pub fn with_audio_parked<T>(
    lockout: &AudioLockout,
    wait: HandoffWait,
    relax: impl FnMut(),
    write: impl FnOnce() -> Result<T, NvsError>,
) -> Result<T, NvsError> {
    let _guard = lockout.acquire_with(wait, relax)?;
    write()
}

/// Load the stored mode.
#[cfg(target_os = "espidf")]
pub fn load_mode(partition: &EspDefaultNvsPartition) -> Result<LoadResult, NvsError> {
    let storage = open(partition)?;
    let stored_version = storage.get_u32(VERSION_KEY)?.unwrap_or(0);
    let stored_mode = storage.get_u8(MODE_KEY)?;
    decode(stored_version, stored_mode)
}

/// Stub for non-ESP platforms
#[cfg(not(target_os = "espidf"))]
pub fn load_mode<P>(_partition: &P) -> Result<LoadResult, NvsError> {
    Err(NvsError::NotAvailable)
}

/// Store `mode` with a version stamp, audio core parked.
#[cfg(target_os = "espidf")]
pub fn save_mode(
    partition: &EspDefaultNvsPartition,
    lockout: &AudioLockout,
    wait: HandoffWait,
    mode: AudioMode,
) -> Result<(), NvsError> {
    let mut storage = open(partition)?;
    with_audio_parked(lockout, wait, relax_tick, || {
        storage.set_u32(VERSION_KEY, CURRENT_SCHEMA_VERSION)?;
        storage.set_u8(MODE_KEY, mode.into())?;
        Ok(())
    })
}

/// Stub for non-ESP platforms
#[cfg(not(target_os = "espidf"))]
pub fn save_mode<P>(
    _partition: &P,
    _lockout: &AudioLockout,
    _wait: HandoffWait,
    _mode: AudioMode,
) -> Result<(), NvsError> {
    Err(NvsError::NotAvailable)
}

#[cfg(target_os = "espidf")]
fn open(partition: &EspDefaultNvsPartition) -> Result<EspNvs<NvsDefault>, NvsError> {
    EspNvs::new(partition.clone(), NVS_NAMESPACE, true).map_err(NvsError::InitFailed)
}

#[cfg(target_os = "espidf")]
fn relax_tick() {
    esp_idf_svc::hal::delay::FreeRtos::delay_ms(1);
}
