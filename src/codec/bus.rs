//! Register bus: uniform register access over per-device wire framing.
//!
//! Two layers:
//! - [`ControlBus`]: raw transport (I2C on target, a mock in tests). Every
//!   transfer is bounded by a hardware timeout.
//! - [`RegisterBus`]: `(address, value)` access implemented by each codec on
//!   top of the transport with its own framing.
//!
//! The frame helpers here do the shared part of every transaction: log it,
//! and on an incomplete transfer reset the peripheral and report one failed
//! attempt. Retrying is the caller's job.

use super::error::{BusPhase, CodecError};

/// Incomplete or timed-out transfer at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// Raw control transport.
pub trait ControlBus {
    /// Write `bytes` to `device` with a stop condition.
    fn write(&mut self, device: u8, bytes: &[u8]) -> Result<(), BusFault>;

    /// Write `bytes` without a stop (repeated start), then read `buffer.len()`
    /// bytes from `device`.
    fn write_read(&mut self, device: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusFault>;

    /// Deinitialize and reinitialize the peripheral to clear a stuck bus.
    fn reset(&mut self);
}

impl<T: ControlBus + ?Sized> ControlBus for &mut T {
    fn write(&mut self, device: u8, bytes: &[u8]) -> Result<(), BusFault> {
        (**self).write(device, bytes)
    }

    fn write_read(&mut self, device: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusFault> {
        (**self).write_read(device, bytes, buffer)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Register-level access, one implementation per codec.
///
/// Addresses and values are carried as `u16`; each device rejects values
/// that do not fit its register format with
/// [`CodecError::InvalidRegister`] before touching the bus.
pub trait RegisterBus {
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CodecError>;

    fn read_register(&mut self, address: u16) -> Result<u16, CodecError>;
}

/// 7-bit address, 9-bit value: `[addr << 1 | d8, d7..d0]`.
#[inline]
pub fn pack_7_9(address: u16, value: u16) -> [u8; 2] {
    [
        (((address & 0x7F) << 1) as u8) | ((value >> 8) & 0x01) as u8,
        (value & 0xFF) as u8,
    ]
}

/// 9-bit value read back as two bytes; bit 0 of the first byte is d8.
#[inline]
pub fn unpack_9(bytes: [u8; 2]) -> u16 {
    (((bytes[0] & 0x01) as u16) << 8) | bytes[1] as u16
}

/// 16-bit address, 16-bit value, both big-endian.
#[inline]
pub fn pack_16_16(address: u16, value: u16) -> [u8; 4] {
    let a = address.to_be_bytes();
    let v = value.to_be_bytes();
    [a[0], a[1], v[0], v[1]]
}

/// 8-bit address, 8-bit value.
#[inline]
pub fn pack_8_8(address: u16, value: u16) -> [u8; 2] {
    [address as u8, value as u8]
}

/// Reject `(address, value)` pairs wider than the device's register format.
#[inline]
pub fn check_width(address: u16, value: u16, addr_bits: u32, value_bits: u32) -> Result<(), CodecError> {
    let fits = |v: u16, bits: u32| bits >= 16 || v >> bits == 0;
    if fits(address, addr_bits) && fits(value, value_bits) {
        Ok(())
    } else {
        Err(CodecError::InvalidRegister {
            register: address,
            value,
        })
    }
}

/// Send a write frame; on failure reset the bus and report it.
pub fn write_frame<B: ControlBus + ?Sized>(
    bus: &mut B,
    name: &str,
    device: u8,
    register: u16,
    value: u16,
    frame: &[u8],
) -> Result<(), CodecError> {
    match bus.write(device, frame) {
        Ok(()) => {
            crate::ctrl_debug!(
                "{} write dev 0x{:02X} reg 0x{:04X} = 0x{:04X}",
                name,
                device,
                register,
                value
            );
            Ok(())
        }
        Err(BusFault) => {
            crate::ctrl_warn!(
                "{} write dev 0x{:02X} reg 0x{:04X} failed - resetting bus",
                name,
                device,
                register
            );
            bus.reset();
            Err(CodecError::Bus {
                device,
                register,
                phase: BusPhase::Write,
            })
        }
    }
}

/// Send an address frame with repeated start and read the reply into
/// `buffer`; on failure reset the bus and report it. The caller assembles
/// and logs the value.
pub fn read_frame<B: ControlBus + ?Sized>(
    bus: &mut B,
    name: &str,
    device: u8,
    register: u16,
    address_frame: &[u8],
    buffer: &mut [u8],
) -> Result<(), CodecError> {
    match bus.write_read(device, address_frame, buffer) {
        Ok(()) => Ok(()),
        Err(BusFault) => {
            crate::ctrl_warn!(
                "{} read dev 0x{:02X} reg 0x{:04X} failed - resetting bus",
                name,
                device,
                register
            );
            bus.reset();
            Err(CodecError::Bus {
                device,
                register,
                phase: BusPhase::Read,
            })
        }
    }
}

/// Log a completed read.
#[inline]
pub fn log_read(name: &str, device: u8, register: u16, value: u16) {
    crate::ctrl_debug!(
        "{} read dev 0x{:02X} reg 0x{:04X} = 0x{:04X}",
        name,
        device,
        register,
        value
    );
}
