//! Register tables: ordered configuration sequences replayed at reset.
//!
//! A table is a plain slice of tagged entries. The slice end terminates the
//! sequence, so no address value is reserved as a sentinel and a delay can
//! never be confused with a register write.

/// One step of a register table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    /// Write `value` to register `address`.
    Write { address: u16, value: u16 },
    /// Pause before the next entry.
    Delay { ms: u32 },
}

impl RegisterOp {
    pub const fn write(address: u16, value: u16) -> Self {
        Self::Write { address, value }
    }

    pub const fn delay(ms: u32) -> Self {
        Self::Delay { ms }
    }
}

/// Number of register writes in `table` (delays excluded).
pub fn write_count(table: &[RegisterOp]) -> usize {
    table
        .iter()
        .filter(|op| matches!(op, RegisterOp::Write { .. }))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_count_skips_delays() {
        const TABLE: &[RegisterOp] = &[
            RegisterOp::write(0, 0),
            RegisterOp::delay(250),
            RegisterOp::write(2, 0x3F),
        ];
        assert_eq!(write_count(TABLE), 2);
    }
}
