//! TLV320AIC3101 codec driver
//!
//! I2C control, 8-bit register address, 8-bit data. Hardware reset through
//! the RESET pin (active low) before the table is loaded.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::bus::{check_width, log_read, pack_8_8, read_frame, write_frame, ControlBus, RegisterBus};
use super::error::CodecError;
use super::retry::RetryPolicy;
use super::sequencer::{replay, SequenceReport, SequenceTarget};
use super::table::RegisterOp;
use super::{dump_range, Codec, DumpReport};

pub const NAME: &str = "AIC3101";

/// 7-bit I2C address.
pub const AIC3101_ADDR: u8 = 0x18;

/// Page 0 registers dumped for diagnostics: 0..109.
pub const DUMP_REGS: u16 = 109;

/// External MCLK, no PLL. Line in to ADC, DAC to LOP/M outputs.
pub static INIT_TABLE: &[RegisterOp] = &[
    RegisterOp::write(7, 0x0A),   // datapath: left DAC = left in, right DAC = right in
    RegisterOp::write(15, 0x00),  // left PGA unmuted, 0 dB
    RegisterOp::write(16, 0x00),  // right PGA unmuted, 0 dB
    RegisterOp::write(19, 0x04),  // left ADC powered, MIC1LP single-ended
    RegisterOp::write(22, 0x04),  // right ADC powered
    RegisterOp::write(37, 0xC0),  // both DACs powered
    RegisterOp::write(41, 0x50),  // DAC outputs to L3/R3, independent volume
    RegisterOp::write(43, 0x00),  // left DAC unmuted, 0 dB
    RegisterOp::write(44, 0x00),  // right DAC unmuted, 0 dB
    RegisterOp::write(86, 0x09),  // LEFT_LOP/M unmuted, powered
    RegisterOp::write(93, 0x09),  // RIGHT_LOP/M unmuted, powered
    RegisterOp::write(101, 0x01), // CODEC_CLKIN = CLKDIV_OUT
    RegisterOp::write(109, 0xC0), // DAC current +100%
];

pub struct Aic3101<B, P, D> {
    bus: B,
    reset_pin: P,
    delay: D,
    policy: RetryPolicy,
}

impl<B: ControlBus, P: OutputPin, D: DelayNs> Aic3101<B, P, D> {
    pub fn new(bus: B, reset_pin: P, delay: D) -> Self {
        Self {
            bus,
            reset_pin,
            delay,
            policy: RetryPolicy::REGISTER_WRITE,
        }
    }

    fn strobe_reset(&mut self) -> Result<(), CodecError> {
        self.reset_pin.set_low().map_err(|_| CodecError::Transport)?;
        self.delay.delay_ms(1);
        self.reset_pin.set_high().map_err(|_| CodecError::Transport)?;
        self.delay.delay_ms(1);
        Ok(())
    }
}

impl<B: ControlBus, P: OutputPin, D: DelayNs> RegisterBus for Aic3101<B, P, D> {
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CodecError> {
        check_width(address, value, 8, 8)?;
        let frame = pack_8_8(address, value);
        write_frame(&mut self.bus, NAME, AIC3101_ADDR, address, value, &frame)
    }

    fn read_register(&mut self, address: u16) -> Result<u16, CodecError> {
        check_width(address, 0, 8, 8)?;
        let mut data = [0u8; 1];
        read_frame(&mut self.bus, NAME, AIC3101_ADDR, address, &[address as u8], &mut data)?;
        let value = data[0] as u16;
        log_read(NAME, AIC3101_ADDR, address, value);
        Ok(value)
    }
}

impl<B: ControlBus, P: OutputPin, D: DelayNs> SequenceTarget for Aic3101<B, P, D> {
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<B: ControlBus, P: OutputPin, D: DelayNs> Codec for Aic3101<B, P, D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<SequenceReport, CodecError> {
        // Hold the device out of reset until the strobe.
        self.reset_pin.set_high().map_err(|_| CodecError::Transport)?;
        self.reset()
    }

    fn reset(&mut self) -> Result<SequenceReport, CodecError> {
        self.strobe_reset()?;
        let policy = self.policy;
        Ok(replay(self, NAME, INIT_TABLE, policy))
    }

    fn dump_registers(&mut self) -> Result<DumpReport, CodecError> {
        Ok(dump_range(self, 0..DUMP_REGS))
    }
}
