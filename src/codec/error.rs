//! Codec control errors

/// Which half of a register transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusPhase {
    /// Address + data write.
    Write,
    /// Address write with repeated start, then data read.
    Read,
}

/// Register access error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// C01: transfer incomplete or timed out; the bus has been reset
    Bus {
        device: u8,
        register: u16,
        phase: BusPhase,
    },
    /// C02: address or value does not fit the device's register format
    InvalidRegister { register: u16, value: u16 },
    /// C03: device has no read path
    WriteOnly,
    /// C04: control pin or peripheral driver error
    Transport,
}

impl CodecError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Bus { .. } => "C01",
            Self::InvalidRegister { .. } => "C02",
            Self::WriteOnly => "C03",
            Self::Transport => "C04",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Bus { .. } => "bus transfer failed",
            Self::InvalidRegister { .. } => "invalid register",
            Self::WriteOnly => "write-only device",
            Self::Transport => "transport error",
        }
    }
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        match self {
            Self::Bus {
                device,
                register,
                phase,
            } => write!(f, " ({:?} dev 0x{:02X} reg 0x{:04X})", phase, device, register),
            Self::InvalidRegister { register, value } => {
                write!(f, " (reg 0x{:04X} = 0x{:04X})", register, value)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_context() {
        let err = CodecError::Bus {
            device: 0x1A,
            register: 1,
            phase: BusPhase::Write,
        };
        let text = format!("{}", err);
        assert!(text.starts_with("C01: bus transfer failed"));
        assert!(text.contains("dev 0x1A"));
        assert!(text.contains("reg 0x0001"));
    }

    #[test]
    fn test_codes_unique() {
        let all = [
            CodecError::Bus {
                device: 0,
                register: 0,
                phase: BusPhase::Read,
            },
            CodecError::InvalidRegister { register: 0, value: 0 },
            CodecError::WriteOnly,
            CodecError::Transport,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }
}
