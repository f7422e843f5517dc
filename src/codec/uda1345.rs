//! UDA1345 codec driver
//!
//! Control is the three-wire L3 interface, bit-banged on GPIO and
//! write-only. A register write is two bytes, LSB first: an address byte
//! with L3MODE low, then a data byte with L3MODE high.
//!
//! ```text
//! address byte: | 0 0 0 1 0 1 | S | 0 |   device 0x05, S = status (reg & 0x10)
//! data byte:    | r1 r0 | d5 .. d0 |      r = reg & 0x03
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::bus::RegisterBus;
use super::error::CodecError;
use super::retry::RetryPolicy;
use super::sequencer::{replay, SequenceReport, SequenceTarget};
use super::table::RegisterOp;
use super::{Codec, DumpReport};

pub const NAME: &str = "UDA1345";

/// 6-bit L3 device address.
pub const UDA1345_L3_ADDR: u8 = 0x05;

pub mod regs {
    /// DATA0 volume, 1 dB steps, 0 = full scale.
    pub const VOLUME: u16 = 0x00;
    /// DATA0 de-emphasis and mute.
    pub const DEEMPH: u16 = 0x02;
    /// DATA0 ADC/DAC power.
    pub const PWRCTL: u16 = 0x03;
    /// STATUS system clock and data format.
    pub const SYSCLK: u16 = 0x10;
}

/// Mute bit in DEEMPH.
const MUTE: u16 = 0x04;

/// Largest value carried by the data byte.
pub const MAX_VALUE: u16 = 0x3F;

pub static INIT_TABLE: &[RegisterOp] = &[
    RegisterOp::write(regs::PWRCTL, 0x03), // ADC on, DAC on
    RegisterOp::write(regs::VOLUME, 0x00), // full volume
    RegisterOp::write(regs::DEEMPH, 0x00), // no de-emphasis, unmuted
    RegisterOp::write(regs::SYSCLK, 0x20), // 256 fs, I2S, no DC filter
];

/// Address byte for `register`.
#[inline]
pub fn address_byte(register: u16) -> u8 {
    let status = if register & 0x10 != 0 { 0x02 } else { 0x00 };
    (UDA1345_L3_ADDR << 2) | status
}

/// Data byte for `register = value`.
#[inline]
pub fn data_byte(register: u16, value: u16) -> u8 {
    (((register & 0x03) << 6) as u8) | (value & MAX_VALUE) as u8
}

/// Accepted registers are 0x00..=0x03 (DATA0) and 0x10..=0x13 (STATUS).
fn check_register(register: u16, value: u16) -> Result<(), CodecError> {
    if register & !0x13 == 0 && value <= MAX_VALUE {
        Ok(())
    } else {
        Err(CodecError::InvalidRegister { register, value })
    }
}

/// L3 pins and timing.
pub struct L3Port<DATA, CLK, MODE, D> {
    data: DATA,
    clock: CLK,
    mode: MODE,
    delay: D,
}

impl<DATA, CLK, MODE, D> L3Port<DATA, CLK, MODE, D>
where
    DATA: OutputPin,
    CLK: OutputPin,
    MODE: OutputPin,
    D: DelayNs,
{
    pub fn new(data: DATA, clock: CLK, mode: MODE, delay: D) -> Self {
        Self {
            data,
            clock,
            mode,
            delay,
        }
    }

    /// Idle levels: DATA low, CLK high, MODE high.
    pub fn idle(&mut self) -> Result<(), CodecError> {
        self.data.set_low().map_err(|_| CodecError::Transport)?;
        self.clock.set_high().map_err(|_| CodecError::Transport)?;
        self.mode.set_high().map_err(|_| CodecError::Transport)?;
        Ok(())
    }

    /// Shift one byte out LSB first; data is latched on the rising clock.
    fn send_byte(&mut self, mut byte: u8) -> Result<(), CodecError> {
        for _ in 0..8 {
            self.data
                .set_state((byte & 1 != 0).into())
                .map_err(|_| CodecError::Transport)?;
            self.delay.delay_us(1);
            self.clock.set_low().map_err(|_| CodecError::Transport)?;
            self.delay.delay_us(1);
            self.clock.set_high().map_err(|_| CodecError::Transport)?;
            self.delay.delay_us(1);
            byte >>= 1;
        }
        self.delay.delay_us(2);
        Ok(())
    }

    pub fn write(&mut self, address: u8, data: u8) -> Result<(), CodecError> {
        self.mode.set_low().map_err(|_| CodecError::Transport)?;
        self.send_byte(address)?;
        self.mode.set_high().map_err(|_| CodecError::Transport)?;
        self.send_byte(data)
    }
}

pub struct Uda1345<DATA, CLK, MODE, D> {
    port: L3Port<DATA, CLK, MODE, D>,
    policy: RetryPolicy,
}

impl<DATA, CLK, MODE, D> Uda1345<DATA, CLK, MODE, D>
where
    DATA: OutputPin,
    CLK: OutputPin,
    MODE: OutputPin,
    D: DelayNs,
{
    pub fn new(data: DATA, clock: CLK, mode: MODE, delay: D) -> Self {
        Self {
            port: L3Port::new(data, clock, mode, delay),
            policy: RetryPolicy::REGISTER_WRITE,
        }
    }

    /// DAC attenuation in 1 dB steps (0 = full volume, 0x3F = maximum).
    pub fn set_volume(&mut self, attenuation: u8) -> Result<(), CodecError> {
        self.write_register(regs::VOLUME, attenuation as u16)
    }

    pub fn set_mute(&mut self, mute: bool) -> Result<(), CodecError> {
        self.write_register(regs::DEEMPH, if mute { MUTE } else { 0 })
    }
}

impl<DATA, CLK, MODE, D> RegisterBus for Uda1345<DATA, CLK, MODE, D>
where
    DATA: OutputPin,
    CLK: OutputPin,
    MODE: OutputPin,
    D: DelayNs,
{
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CodecError> {
        check_register(address, value)?;
        self.port.write(address_byte(address), data_byte(address, value))?;
        crate::ctrl_debug!("{} write reg 0x{:02X} = 0x{:02X}", NAME, address, value);
        Ok(())
    }

    fn read_register(&mut self, _address: u16) -> Result<u16, CodecError> {
        Err(CodecError::WriteOnly)
    }
}

impl<DATA, CLK, MODE, D> SequenceTarget for Uda1345<DATA, CLK, MODE, D>
where
    DATA: OutputPin,
    CLK: OutputPin,
    MODE: OutputPin,
    D: DelayNs,
{
    fn delay_ms(&mut self, ms: u32) {
        self.port.delay.delay_ms(ms);
    }
}

impl<DATA, CLK, MODE, D> Codec for Uda1345<DATA, CLK, MODE, D>
where
    DATA: OutputPin,
    CLK: OutputPin,
    MODE: OutputPin,
    D: DelayNs,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<SequenceReport, CodecError> {
        self.port.idle()?;
        self.port.delay.delay_us(10);
        self.reset()
    }

    /// No reset line on the control port: replaying the table puts every
    /// register back in its configured state.
    fn reset(&mut self) -> Result<SequenceReport, CodecError> {
        let policy = self.policy;
        Ok(replay(self, NAME, INIT_TABLE, policy))
    }

    fn dump_registers(&mut self) -> Result<DumpReport, CodecError> {
        Err(CodecError::WriteOnly)
    }
}
