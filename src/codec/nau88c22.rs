//! NAU88C22 codec driver
//!
//! I2C control, 7-bit register address, 9-bit data. Writes pack data bit 8
//! into the address byte; reads return two bytes with bit 8 in the low bit
//! of the first byte.

use embedded_hal::delay::DelayNs;

use super::bus::{check_width, log_read, pack_7_9, read_frame, unpack_9, write_frame, ControlBus, RegisterBus};
use super::error::CodecError;
use super::retry::RetryPolicy;
use super::sequencer::{replay, SequenceReport, SequenceTarget};
use super::table::RegisterOp;
use super::{dump_range, Codec, DumpReport};

pub const NAME: &str = "NAU88C22";

pub const NAU88C22_ADDR: u8 = 0x1A;

pub mod regs {
    pub const RESET: u16 = 0;
    pub const POWER1: u16 = 1;
    pub const POWER2: u16 = 2;
    pub const POWER3: u16 = 3;
    pub const AUDIO_IF: u16 = 4;
    pub const CLOCK1: u16 = 6;
    pub const CLOCK2: u16 = 7;
    pub const DAC_CTRL: u16 = 10;
    pub const ADC_CTRL: u16 = 14;
    pub const INPUT_CTRL: u16 = 44;
    pub const LPGA_GAIN: u16 = 45;
    pub const RPGA_GAIN: u16 = 46;
    pub const LADC_BOOST: u16 = 47;
    pub const RADC_BOOST: u16 = 48;
    pub const OUTPUT_CTRL: u16 = 49;
    pub const LMIXER: u16 = 50;
    pub const RMIXER: u16 = 51;
    pub const AUX2_MIXER: u16 = 56;
    pub const AUX1_MIXER: u16 = 57;
    pub const REVISION: u16 = 62;
    pub const DEVICE_ID: u16 = 63;
    pub const BIAS_CTRL: u16 = 69;
}

/// Registers dumped for diagnostics: 0..82.
pub const DUMP_REGS: u16 = 82;

/// Soft reset, slow VREF charge, then line in / DAC to aux outputs,
/// 16-bit I2S from MCLK without PLL.
pub static INIT_TABLE: &[RegisterOp] = &[
    RegisterOp::write(regs::RESET, 0x000),
    RegisterOp::write(regs::POWER1, 0x0CD), // aux mixers, tie-off, 80k VREF for slow charge
    RegisterOp::write(regs::BIAS_CTRL, 0x000),
    RegisterOp::delay(250),
    // Input routing & ADC
    RegisterOp::write(regs::POWER2, 0x03F), // ADC, PGA, mix/boost powered
    RegisterOp::write(regs::ADC_CTRL, 0x008), // 128x oversampling, DC coupled
    RegisterOp::write(regs::INPUT_CTRL, 0x044), // PGA from line inputs
    RegisterOp::write(regs::LPGA_GAIN, 0x010), // 0 dB, unmuted
    RegisterOp::write(regs::RPGA_GAIN, 0x010),
    RegisterOp::write(regs::LADC_BOOST, 0x030), // line in 0 dB, no boost
    RegisterOp::write(regs::RADC_BOOST, 0x030),
    // Output routing & DAC
    RegisterOp::write(regs::POWER3, 0x18F), // DACs and aux outputs
    RegisterOp::write(regs::DAC_CTRL, 0x008), // 128x
    RegisterOp::write(regs::OUTPUT_CTRL, 0x002), // thermal shutdown only
    RegisterOp::write(regs::LMIXER, 0x001), // LDAC to left main mixer
    RegisterOp::write(regs::RMIXER, 0x001),
    RegisterOp::write(regs::AUX2_MIXER, 0x001), // LDAC to AUX2
    RegisterOp::write(regs::AUX1_MIXER, 0x001), // RDAC to AUX1
    // Format & clock
    RegisterOp::write(regs::AUDIO_IF, 0x010), // 16-bit I2S
    RegisterOp::write(regs::CLOCK1, 0x000), // MCLK, no PLL, slave
    RegisterOp::write(regs::CLOCK2, 0x000), // 48 kHz
];

pub struct Nau88c22<B, D> {
    bus: B,
    delay: D,
    policy: RetryPolicy,
}

impl<B: ControlBus, D: DelayNs> Nau88c22<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            policy: RetryPolicy::REGISTER_WRITE,
        }
    }

    /// Device ID register (0x01A on production parts).
    pub fn chip_id(&mut self) -> Result<u16, CodecError> {
        self.read_register(regs::DEVICE_ID)
    }

    pub fn revision(&mut self) -> Result<u16, CodecError> {
        self.read_register(regs::REVISION)
    }
}

impl<B: ControlBus, D: DelayNs> RegisterBus for Nau88c22<B, D> {
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CodecError> {
        check_width(address, value, 7, 9)?;
        let frame = pack_7_9(address, value);
        write_frame(&mut self.bus, NAME, NAU88C22_ADDR, address, value, &frame)
    }

    fn read_register(&mut self, address: u16) -> Result<u16, CodecError> {
        check_width(address, 0, 7, 9)?;
        let mut data = [0u8; 2];
        let address_frame = [((address & 0x7F) << 1) as u8];
        read_frame(&mut self.bus, NAME, NAU88C22_ADDR, address, &address_frame, &mut data)?;
        let value = unpack_9(data);
        log_read(NAME, NAU88C22_ADDR, address, value);
        Ok(value)
    }
}

impl<B: ControlBus, D: DelayNs> SequenceTarget for Nau88c22<B, D> {
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<B: ControlBus, D: DelayNs> Codec for Nau88c22<B, D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<SequenceReport, CodecError> {
        self.reset()
    }

    fn reset(&mut self) -> Result<SequenceReport, CodecError> {
        let policy = self.policy;
        Ok(replay(self, NAME, INIT_TABLE, policy))
    }

    fn dump_registers(&mut self) -> Result<DumpReport, CodecError> {
        Ok(dump_range(self, 0..DUMP_REGS))
    }
}
