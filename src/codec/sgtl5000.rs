//! SGTL5000 codec driver
//!
//! I2C control, 16-bit register address, 16-bit data, big-endian.

use embedded_hal::delay::DelayNs;

use super::bus::{log_read, pack_16_16, read_frame, write_frame, ControlBus, RegisterBus};
use super::error::CodecError;
use super::retry::RetryPolicy;
use super::sequencer::{replay, SequenceReport, SequenceTarget};
use super::table::RegisterOp;
use super::{dump_range, Codec, DumpReport};

pub const NAME: &str = "SGTL5000";

/// I2C address with CTRL_ADR0_CS low.
pub const SGTL5000_ADDR: u8 = 0x0A;

pub mod regs {
    pub const CHIP_ID: u16 = 0x0000;
    pub const CHIP_DIG_POWER: u16 = 0x0002;
    pub const CHIP_CLK_CTRL: u16 = 0x0004;
    pub const CHIP_I2S_CTRL: u16 = 0x0006;
    pub const CHIP_SSS_CTRL: u16 = 0x000A;
    pub const CHIP_ADCDAC_CTRL: u16 = 0x000E;
    pub const CHIP_DAC_VOL: u16 = 0x0010;
    pub const CHIP_PAD_STRENGTH: u16 = 0x0014;
    pub const CHIP_ANA_ADC_CTRL: u16 = 0x0020;
    pub const CHIP_ANA_HP_CTRL: u16 = 0x0022;
    pub const CHIP_ANA_CTRL: u16 = 0x0024;
    pub const CHIP_LINREG_CTRL: u16 = 0x0026;
    pub const CHIP_REF_CTRL: u16 = 0x0028;
    pub const CHIP_MIC_CTRL: u16 = 0x002A;
    pub const CHIP_LINE_OUT_CTRL: u16 = 0x002C;
    pub const CHIP_LINE_OUT_VOL: u16 = 0x002E;
    pub const CHIP_ANA_POWER: u16 = 0x0030;
    pub const CHIP_PLL_CTRL: u16 = 0x0032;
    pub const CHIP_CLK_TOP_CTRL: u16 = 0x0034;
    pub const CHIP_ANA_STATUS: u16 = 0x0036;
    pub const CHIP_SHORT_CTRL: u16 = 0x003C;
    pub const DAP_CONTROL: u16 = 0x0100;
}

/// Chip-level registers live at even addresses below this.
pub const DUMP_END: u16 = 0x0040;

/// Power up analog and digital blocks, line in / line out at 48 kHz,
/// 16-bit I2S slave, DAP bypassed.
pub static INIT_TABLE: &[RegisterOp] = &[
    // Power
    RegisterOp::write(regs::CHIP_DIG_POWER, 0x0000), // all digital blocks off during setup
    RegisterOp::write(regs::CHIP_CLK_CTRL, 0x0008), // MCLK/1, 48 kHz, 256x
    RegisterOp::write(regs::CHIP_ANA_POWER, 0x7060), // ADC, DAC, reference up
    RegisterOp::delay(20),
    RegisterOp::write(regs::CHIP_LINREG_CTRL, 0x006C), // charge pump from VDDIO above 3.1 V
    // References
    RegisterOp::write(regs::CHIP_REF_CTRL, 0x01F0), // VAG ~VDDA/2, nominal bias, fast pop
    RegisterOp::write(regs::CHIP_LINE_OUT_CTRL, 0x0322), // line out bias 1.65 V, 0.36 mA
    // Power
    RegisterOp::write(regs::CHIP_ANA_POWER, 0x40EB), // + line out, headphone
    RegisterOp::write(regs::CHIP_DIG_POWER, 0x0073), // ADC, DAC, DAP, I2S
    RegisterOp::write(regs::CHIP_LINE_OUT_VOL, 0x0F0F), // 3.3 V VDDA/VDDIO
    // Rate and format
    RegisterOp::write(regs::CHIP_CLK_CTRL, 0x0008),
    RegisterOp::write(regs::CHIP_I2S_CTRL, 0x0130), // 16-bit I2S slave
    RegisterOp::write(regs::CHIP_SSS_CTRL, 0x0010), // I2S in to DAC, ADC to I2S out
    // Unmute
    RegisterOp::write(regs::CHIP_ADCDAC_CTRL, 0x0200),
    RegisterOp::write(regs::CHIP_ANA_CTRL, 0x0026), // line out and ADC unmuted
];

pub struct Sgtl5000<B, D> {
    bus: B,
    delay: D,
    policy: RetryPolicy,
}

impl<B: ControlBus, D: DelayNs> Sgtl5000<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            policy: RetryPolicy::REGISTER_WRITE,
        }
    }

    /// CHIP_ID: part id in the high byte (0xA0), revision in the low byte.
    pub fn chip_id(&mut self) -> Result<u16, CodecError> {
        self.read_register(regs::CHIP_ID)
    }
}

impl<B: ControlBus, D: DelayNs> RegisterBus for Sgtl5000<B, D> {
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CodecError> {
        let frame = pack_16_16(address, value);
        write_frame(&mut self.bus, NAME, SGTL5000_ADDR, address, value, &frame)
    }

    fn read_register(&mut self, address: u16) -> Result<u16, CodecError> {
        let mut data = [0u8; 2];
        read_frame(
            &mut self.bus,
            NAME,
            SGTL5000_ADDR,
            address,
            &address.to_be_bytes(),
            &mut data,
        )?;
        let value = u16::from_be_bytes(data);
        log_read(NAME, SGTL5000_ADDR, address, value);
        Ok(value)
    }
}

impl<B: ControlBus, D: DelayNs> SequenceTarget for Sgtl5000<B, D> {
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<B: ControlBus, D: DelayNs> Codec for Sgtl5000<B, D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<SequenceReport, CodecError> {
        self.reset()
    }

    /// No reset pin and no reset register: the table drives every block
    /// from off to configured.
    fn reset(&mut self) -> Result<SequenceReport, CodecError> {
        let policy = self.policy;
        Ok(replay(self, NAME, INIT_TABLE, policy))
    }

    fn dump_registers(&mut self) -> Result<DumpReport, CodecError> {
        Ok(dump_range(self, (0..DUMP_END).step_by(2)))
    }
}
