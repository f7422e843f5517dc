//! Reset sequencer: replays a register table through a [`RegisterBus`].
//!
//! Best effort. A register that exhausts its retries counts as one failure
//! and replay moves on; the aggregate count goes back to the caller, which
//! decides whether the codec is usable.

use super::bus::RegisterBus;
use super::retry::RetryPolicy;
use super::table::RegisterOp;

/// Anything a register table can be replayed into.
pub trait SequenceTarget: RegisterBus {
    /// Block for `ms` milliseconds (control context only).
    fn delay_ms(&mut self, ms: u32);
}

/// Result of one table replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceReport {
    /// Write entries processed.
    pub writes: u32,
    /// `write_register` calls made, retries included.
    pub attempts: u32,
    /// Write entries that failed every attempt.
    pub failures: u32,
    /// Delay entries honoured.
    pub delays: u32,
}

impl SequenceReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }

    /// Fold one retried write outside the table into the report.
    pub fn record(&mut self, attempts: u8, ok: bool) {
        self.writes += 1;
        self.attempts += attempts as u32;
        if !ok {
            self.failures += 1;
        }
    }
}

/// Replay `table` in order into `target`.
///
/// `label` prefixes the diagnostic lines.
pub fn replay<T: SequenceTarget + ?Sized>(
    target: &mut T,
    label: &str,
    table: &[RegisterOp],
    policy: RetryPolicy,
) -> SequenceReport {
    let mut report = SequenceReport::default();

    for op in table {
        match *op {
            RegisterOp::Delay { ms } => {
                crate::ctrl_info!("{} reset: delay {} ms", label, ms);
                target.delay_ms(ms);
                report.delays += 1;
            }
            RegisterOp::Write { address, value } => {
                let outcome = policy.run(|| target.write_register(address, value));
                if let Err(e) = outcome.result {
                    crate::ctrl_warn!(
                        "{} reset: reg 0x{:04X} gave up after {} attempts ({})",
                        label,
                        address,
                        outcome.attempts,
                        e
                    );
                }
                report.record(outcome.attempts, outcome.result.is_ok());
            }
        }
    }

    report
}
