//! WM8731 codec driver
//!
//! I2C control, write-only: 7-bit register address, 9-bit data, two bytes
//! per frame. Field updates go through a shadow copy of registers 0–9.

use embedded_hal::delay::DelayNs;

use super::bus::{check_width, pack_7_9, write_frame, ControlBus, RegisterBus};
use super::error::CodecError;
use super::retry::RetryPolicy;
use super::sequencer::{replay, SequenceReport, SequenceTarget};
use super::shadow::ShadowRegisters;
use super::table::RegisterOp;
use super::{Codec, DumpReport};

pub const NAME: &str = "WM8731";

/// I2C address with CSB low.
pub const WM8731_ADDR: u8 = 0x1A;

/// Registers covered by the shadow copy.
pub const SHADOW_REGS: usize = 10;

/// WM8731 register addresses
pub mod regs {
    pub const LLIN: u16 = 0x00;
    pub const RLIN: u16 = 0x01;
    pub const LHP: u16 = 0x02;
    pub const RHP: u16 = 0x03;
    pub const APATH: u16 = 0x04;
    pub const DPATH: u16 = 0x05;
    pub const PCTL: u16 = 0x06;
    pub const DAIF: u16 = 0x07;
    pub const SMPL: u16 = 0x08;
    pub const ACT: u16 = 0x09;
    pub const RESET: u16 = 0x0F;
}

/// Power-on contents of registers 0–9.
const RESET_DEFAULTS: [u16; SHADOW_REGS] = [
    0x097, 0x097, 0x079, 0x079, 0x00A, 0x008, 0x09F, 0x00A, 0x000, 0x000,
];

/// Configuration sequence: soft reset, then full-duplex line in / headphone
/// out, 16-bit I2S slave, 48 kHz from 256x MCLK.
pub static INIT_TABLE: &[RegisterOp] = &[
    RegisterOp::write(regs::RESET, 0x000),
    RegisterOp::write(regs::LLIN, 0x017), // 0 dB, unmuted
    RegisterOp::write(regs::RLIN, 0x017),
    RegisterOp::write(regs::LHP, 0x079), // 0 dB
    RegisterOp::write(regs::RHP, 0x079),
    RegisterOp::write(regs::APATH, 0x012), // DAC select, mic muted
    RegisterOp::write(regs::DPATH, 0x000), // soft mute off
    RegisterOp::write(regs::PCTL, 0x022),  // oscillator and mic powered down
    RegisterOp::write(regs::DAIF, 0x002),  // I2S, 16-bit, slave
    RegisterOp::write(regs::SMPL, 0x000),  // normal mode, 256x, 48 kHz
    RegisterOp::write(regs::ACT, 0x001),
];

/// Analog input selection for the ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Line,
    Mic,
}

pub struct Wm8731<B, D> {
    bus: B,
    delay: D,
    device: u8,
    shadow: ShadowRegisters<SHADOW_REGS>,
    policy: RetryPolicy,
}

impl<B: ControlBus, D: DelayNs> Wm8731<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            device: WM8731_ADDR,
            shadow: ShadowRegisters::new(RESET_DEFAULTS),
            policy: RetryPolicy::REGISTER_WRITE,
        }
    }

    /// Use a different device address (CSB high selects 0x1B).
    pub fn with_device(mut self, device: u8) -> Self {
        self.device = device;
        self
    }

    /// Last value written to `address`, if it is shadowed.
    pub fn shadow(&self, address: u16) -> Option<u16> {
        self.shadow.get(address)
    }

    /// Soft mute the DAC and give the ramp time to finish.
    pub fn set_mute(&mut self, enable: bool) -> Result<(), CodecError> {
        let value = if enable { 0x008 } else { 0x000 };
        self.write_register(regs::DPATH, value)?;
        self.delay.delay_ms(20);
        Ok(())
    }

    /// Headphone volume for both channels (7-bit, 0x79 = 0 dB).
    pub fn set_headphone_volume(&mut self, volume: u8) -> Result<(), CodecError> {
        // Bit 8: write both channels.
        self.write_register(regs::LHP, 0x180 | (volume as u16 & 0x7F))
    }

    /// Line input volume for both channels (6-bit, 0x17 = 0 dB).
    pub fn set_input_volume(&mut self, volume: u8) -> Result<(), CodecError> {
        self.write_register(regs::LLIN, 0x100 | (volume as u16 & 0x3F))
    }

    pub fn set_input_source(&mut self, source: InputSource) -> Result<(), CodecError> {
        // INSEL (bit 2) selects mic, MUTEMIC (bit 1) mutes it.
        let bits = match source {
            InputSource::Mic => 0x004,
            InputSource::Line => 0x002,
        };
        self.modify(regs::APATH, 0x006, bits)
    }

    pub fn set_mic_boost(&mut self, boost: bool) -> Result<(), CodecError> {
        self.modify(regs::APATH, 0x001, boost as u16)
    }

    fn modify(&mut self, address: u16, mask: u16, bits: u16) -> Result<(), CodecError> {
        let value = self
            .shadow
            .merged(address, mask, bits)
            .ok_or(CodecError::InvalidRegister {
                register: address,
                value: bits,
            })?;
        self.write_register(address, value)
    }
}

impl<B: ControlBus, D: DelayNs> RegisterBus for Wm8731<B, D> {
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CodecError> {
        check_width(address, value, 7, 9)?;
        let frame = pack_7_9(address, value);
        write_frame(&mut self.bus, NAME, self.device, address, value, &frame)?;
        self.shadow.record(address, value);
        Ok(())
    }

    fn read_register(&mut self, _address: u16) -> Result<u16, CodecError> {
        Err(CodecError::WriteOnly)
    }
}

impl<B: ControlBus, D: DelayNs> SequenceTarget for Wm8731<B, D> {
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<B: ControlBus, D: DelayNs> Codec for Wm8731<B, D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<SequenceReport, CodecError> {
        self.reset()
    }

    fn reset(&mut self) -> Result<SequenceReport, CodecError> {
        // The first table entry is the soft reset.
        self.shadow.reset();
        let policy = self.policy;
        Ok(replay(self, NAME, INIT_TABLE, policy))
    }

    /// The device cannot be read back; dumps the shadow copy instead.
    fn dump_registers(&mut self) -> Result<DumpReport, CodecError> {
        crate::ctrl_info!("Dumping {} shadow registers...", NAME);
        let mut report = DumpReport::default();
        for (address, value) in self.shadow.iter() {
            crate::ctrl_info!("{} shadow reg 0x{:02X} = 0x{:03X}", NAME, address, value);
            report.read += 1;
        }
        Ok(report)
    }
}
