//! ES8311 codec driver
//!
//! I2C control, 8-bit register address, 8-bit data. Mono DAC with a
//! register map that can be read back.

use embedded_hal::delay::DelayNs;

use super::bus::{check_width, log_read, pack_8_8, read_frame, write_frame, ControlBus, RegisterBus};
use super::error::CodecError;
use super::retry::RetryPolicy;
use super::sequencer::{replay, SequenceReport, SequenceTarget};
use super::table::RegisterOp;
use super::{dump_range, Codec, DumpReport};

pub const NAME: &str = "ES8311";

/// I2C address with AD0 low.
pub const ES8311_ADDR: u8 = 0x18;

/// ES8311 register addresses
pub mod regs {
    pub const RESET: u16 = 0x00;
    pub const CLK_MANAGER1: u16 = 0x01;
    pub const CLK_MANAGER2: u16 = 0x02;
    pub const SDP_IN: u16 = 0x09;
    pub const SDP_OUT: u16 = 0x0A;
    pub const SYS_MODSEL: u16 = 0x0D;
    /// REG31: DAC soft ramp and mute.
    pub const DAC_MUTE: u16 = 0x31;
    /// REG32: DAC volume, 0.5 dB steps.
    pub const DAC_VOL: u16 = 0x32;
    pub const GPIO: u16 = 0x44;
    pub const GP_REG: u16 = 0x45;
    pub const CHIP_ID1: u16 = 0xFD;
    pub const CHIP_ID2: u16 = 0xFE;
    pub const CHIP_VER: u16 = 0xFF;
}

/// Configuration registers dumped for diagnostics: 0x00..=0x45.
pub const DUMP_END: u16 = regs::GP_REG + 1;

/// Volume written by `init`, in percent.
pub const DEFAULT_VOLUME: u8 = 70;

/// Soft reset, release, then 16-bit I2S slave from MCLK = 256 fs.
pub static INIT_TABLE: &[RegisterOp] = &[
    RegisterOp::write(regs::RESET, 0x80), // CSM on, all blocks in reset
    RegisterOp::delay(5),
    RegisterOp::write(regs::RESET, 0x00),
    RegisterOp::write(regs::CLK_MANAGER1, 0x3F), // all clocks on, MCLK from pin
    RegisterOp::write(regs::CLK_MANAGER2, 0x00), // no divider
    RegisterOp::write(regs::SDP_IN, 0x0C),       // I2S, 16-bit
    RegisterOp::write(regs::SDP_OUT, 0x0C),
    RegisterOp::write(regs::SYS_MODSEL, 0x08), // DAC path powered
    RegisterOp::write(regs::DAC_MUTE, 0x00),
];

/// DSMMUTE | DEMMUTE in DAC_MUTE.
pub const MUTE_BITS: u16 = 0x60;

/// Map 0..=100 % onto DAC_VOL: 0x00 is -95.5 dB, 0xBF is 0 dB.
pub fn volume_register(percent: u8) -> u8 {
    (percent.min(100) as u16 * 0xBF / 100) as u8
}

pub struct Es8311<B, D> {
    bus: B,
    delay: D,
    volume: u8,
    muted: bool,
    policy: RetryPolicy,
}

impl<B: ControlBus, D: DelayNs> Es8311<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            volume: DEFAULT_VOLUME,
            muted: false,
            policy: RetryPolicy::REGISTER_WRITE,
        }
    }

    /// Set DAC volume (0-100%).
    pub fn set_volume(&mut self, percent: u8) -> Result<(), CodecError> {
        let percent = percent.min(100);
        self.write_register(regs::DAC_VOL, volume_register(percent) as u16)?;
        self.volume = percent;
        Ok(())
    }

    pub fn set_mute(&mut self, mute: bool) -> Result<(), CodecError> {
        let value = if mute { MUTE_BITS } else { 0x00 };
        self.write_register(regs::DAC_MUTE, value)?;
        self.muted = mute;
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// CHIP_ID1 in the high byte, CHIP_ID2 in the low byte (0x8311).
    pub fn chip_id(&mut self) -> Result<u16, CodecError> {
        let high = self.read_register(regs::CHIP_ID1)?;
        let low = self.read_register(regs::CHIP_ID2)?;
        Ok((high << 8) | low)
    }
}

impl<B: ControlBus, D: DelayNs> RegisterBus for Es8311<B, D> {
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CodecError> {
        check_width(address, value, 8, 8)?;
        let frame = pack_8_8(address, value);
        write_frame(&mut self.bus, NAME, ES8311_ADDR, address, value, &frame)
    }

    fn read_register(&mut self, address: u16) -> Result<u16, CodecError> {
        check_width(address, 0, 8, 8)?;
        let mut data = [0u8; 1];
        read_frame(&mut self.bus, NAME, ES8311_ADDR, address, &[address as u8], &mut data)?;
        let value = data[0] as u16;
        log_read(NAME, ES8311_ADDR, address, value);
        Ok(value)
    }
}

impl<B: ControlBus, D: DelayNs> SequenceTarget for Es8311<B, D> {
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<B: ControlBus, D: DelayNs> Codec for Es8311<B, D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<SequenceReport, CodecError> {
        let mut report = self.reset()?;
        let policy = self.policy;
        let outcome = policy.run(|| self.set_volume(DEFAULT_VOLUME));
        report.record(outcome.attempts, outcome.result.is_ok());
        Ok(report)
    }

    fn reset(&mut self) -> Result<SequenceReport, CodecError> {
        self.muted = false;
        let policy = self.policy;
        Ok(replay(self, NAME, INIT_TABLE, policy))
    }

    fn dump_registers(&mut self) -> Result<DumpReport, CodecError> {
        let mut report = dump_range(self, 0..DUMP_END);
        match self.chip_id() {
            Ok(id) => {
                crate::ctrl_info!("{} chip id 0x{:04X}", NAME, id);
                report.read += 2;
            }
            Err(_) => report.failed += 1,
        }
        Ok(report)
    }
}
