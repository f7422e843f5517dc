//! ESP-IDF glue: the I2C control transport and the I2S audio port.
//!
//! Target only. Everything above this layer is host-testable.

pub mod audio;
pub mod i2c;

pub use audio::I2sPort;
pub use i2c::EspI2cBus;
