//! Codec control: register access, reset sequencing and one driver per
//! supported codec.
//!
//! ```text
//! Codec (init / reset / dump_registers)
//!   └─ SequenceTarget (delay_ms)      ◀── sequencer::replay(table, RetryPolicy)
//!        └─ RegisterBus (write_register / read_register)
//!             └─ ControlBus (I2C) or L3 pins
//! ```
//!
//! Control context only. Bus transactions take orders of magnitude longer
//! than an audio buffer and must never run on the audio core.

pub mod aic3101;
pub mod bus;
pub mod error;
pub mod es8311;
pub mod nau88c22;
pub mod retry;
pub mod sequencer;
pub mod sgtl5000;
pub mod shadow;
pub mod table;
pub mod uda1345;
pub mod wm8731;

pub use aic3101::Aic3101;
pub use bus::{BusFault, ControlBus, RegisterBus};
pub use error::{BusPhase, CodecError};
pub use es8311::Es8311;
pub use nau88c22::Nau88c22;
pub use retry::{Attempts, RetryPolicy};
pub use sequencer::{replay, SequenceReport, SequenceTarget};
pub use sgtl5000::Sgtl5000;
pub use shadow::ShadowRegisters;
pub use table::RegisterOp;
pub use uda1345::Uda1345;
pub use wm8731::Wm8731;

/// Common codec capability. One implementation per supported device; the
/// active one is chosen at startup from [`CodecKind`].
pub trait Codec: SequenceTarget {
    fn name(&self) -> &'static str;

    /// Prepare control pins, reset the device and load its configuration.
    ///
    /// `Err` only for transport setup errors; register failures are
    /// counted in the report.
    fn init(&mut self) -> Result<SequenceReport, CodecError>;

    /// Reset the device (reset line or reset register) and replay its
    /// register table.
    fn reset(&mut self) -> Result<SequenceReport, CodecError>;

    /// Read every documented register to the diagnostic log.
    fn dump_registers(&mut self) -> Result<DumpReport, CodecError>;
}

/// Result of a register dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpReport {
    pub read: u32,
    pub failed: u32,
}

/// Read each address in `addresses`; failures are counted, not fatal.
pub fn dump_range<C: Codec + ?Sized>(
    codec: &mut C,
    addresses: impl Iterator<Item = u16>,
) -> DumpReport {
    crate::ctrl_info!("Dumping {} registers...", codec.name());

    let mut report = DumpReport::default();
    for address in addresses {
        match codec.read_register(address) {
            Ok(_) => report.read += 1,
            Err(_) => report.failed += 1,
        }
    }
    report
}

/// Supported codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Wm8731,
    Aic3101,
    Nau88c22,
    Sgtl5000,
    Uda1345,
    Es8311,
}

impl CodecKind {
    pub const ALL: [CodecKind; 6] = [
        CodecKind::Wm8731,
        CodecKind::Aic3101,
        CodecKind::Nau88c22,
        CodecKind::Sgtl5000,
        CodecKind::Uda1345,
        CodecKind::Es8311,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::Wm8731 => wm8731::NAME,
            CodecKind::Aic3101 => aic3101::NAME,
            CodecKind::Nau88c22 => nau88c22::NAME,
            CodecKind::Sgtl5000 => sgtl5000::NAME,
            CodecKind::Uda1345 => uda1345::NAME,
            CodecKind::Es8311 => es8311::NAME,
        }
    }

    /// Case-insensitive lookup by chip name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// True if the control port is bit-banged L3 instead of I2C.
    pub fn uses_l3(self) -> bool {
        matches!(self, CodecKind::Uda1345)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(CodecKind::from_name("nau88c22"), Some(CodecKind::Nau88c22));
        assert_eq!(CodecKind::from_name("SGTL5000"), Some(CodecKind::Sgtl5000));
        assert_eq!(CodecKind::from_name("pcm3060"), None);
    }

    #[test]
    fn test_only_uda1345_uses_l3() {
        let l3: Vec<_> = CodecKind::ALL.into_iter().filter(|k| k.uses_l3()).collect();
        assert_eq!(l3, vec![CodecKind::Uda1345]);
    }
}
