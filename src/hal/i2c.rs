//! I2C control transport on I2C0.

use esp_idf_svc::hal::delay::TickType;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2c::{self, I2cDriver, I2C0};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::{EspError, TickType_t};

use crate::codec::{BusFault, ControlBus};
use crate::config::I2cConfig;

/// [`ControlBus`] over the ESP-IDF I2C master driver.
///
/// Every transfer is bounded by the configured timeout. `reset` deletes and
/// reinstalls the driver, which releases a slave holding SDA low.
pub struct EspI2cBus {
    driver: Option<I2cDriver<'static>>,
    config: I2cConfig,
    timeout: TickType_t,
}

impl EspI2cBus {
    pub fn new(config: &I2cConfig) -> Result<Self, EspError> {
        Ok(Self {
            driver: Some(open(config)?),
            config: *config,
            timeout: TickType::new_millis(config.timeout_ms as u64).ticks(),
        })
    }
}

fn open(config: &I2cConfig) -> Result<I2cDriver<'static>, EspError> {
    // SAFETY: I2C0 and the two pins are used by this bus only; the previous
    // driver instance, if any, has been dropped.
    let (port, sda, scl) = unsafe {
        (
            I2C0::new(),
            AnyIOPin::new(config.sda_pin),
            AnyIOPin::new(config.scl_pin),
        )
    };
    let hw = i2c::config::Config::new().baudrate(Hertz(config.frequency_hz));
    I2cDriver::new(port, sda, scl, &hw)
}

impl ControlBus for EspI2cBus {
    fn write(&mut self, device: u8, bytes: &[u8]) -> Result<(), BusFault> {
        let driver = self.driver.as_mut().ok_or(BusFault)?;
        driver.write(device, bytes, self.timeout).map_err(|_| BusFault)
    }

    fn write_read(&mut self, device: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusFault> {
        let driver = self.driver.as_mut().ok_or(BusFault)?;
        driver
            .write_read(device, bytes, buffer, self.timeout)
            .map_err(|_| BusFault)
    }

    fn reset(&mut self) {
        // Drop first: the driver must be deleted before it can be installed again.
        self.driver = None;
        match open(&self.config) {
            Ok(driver) => self.driver = Some(driver),
            Err(e) => crate::ctrl_error!("I2C reinit failed: {}", e),
        }
    }
}
