//! I2S audio port: full duplex, 16-bit Philips, ESP32 as clock master.
//!
//! One [`I2sPort::transfer`] per audio buffer: block until the DMA has a
//! full input buffer, let the caller compute the output, queue it.

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2s::config::{DataBitWidth, StdConfig};
use esp_idf_svc::hal::i2s::{I2sBiDir, I2sDriver, I2S0};
use esp_idf_svc::sys::EspError;

use crate::config::I2sConfig;

/// Bytes per interleaved 16-bit sample.
const SAMPLE_BYTES: usize = 2;

pub struct I2sPort<const N: usize> {
    driver: I2sDriver<'static, I2sBiDir>,
    rx_bytes: [[u8; SAMPLE_BYTES]; N],
    tx_bytes: [[u8; SAMPLE_BYTES]; N],
}

impl<const N: usize> I2sPort<N> {
    /// Install and enable the driver. `N` is interleaved samples per buffer.
    pub fn new(config: &I2sConfig, sample_rate: u32) -> Result<Self, EspError> {
        let std_config = StdConfig::philips(sample_rate, DataBitWidth::Bits16);

        // SAFETY: I2S0 and these pins are used by the audio task only.
        let (port, bclk, din, dout, mclk, ws) = unsafe {
            (
                I2S0::new(),
                AnyIOPin::new(config.bclk_pin),
                AnyIOPin::new(config.din_pin),
                AnyIOPin::new(config.dout_pin),
                AnyIOPin::new(config.mclk_pin),
                AnyIOPin::new(config.ws_pin),
            )
        };

        let mut driver = I2sDriver::new_std_bidir(port, &std_config, bclk, din, dout, Some(mclk), ws)?;
        driver.rx_enable()?;
        driver.tx_enable()?;

        Ok(Self {
            driver,
            rx_bytes: [[0; SAMPLE_BYTES]; N],
            tx_bytes: [[0; SAMPLE_BYTES]; N],
        })
    }

    /// Read one input buffer, run `process(output, input)`, write the output.
    pub fn transfer(
        &mut self,
        process: impl FnOnce(&mut [i16; N], &[i16; N]),
    ) -> Result<(), EspError> {
        self.driver.read(self.rx_bytes.as_flattened_mut(), BLOCK)?;

        let input: [i16; N] = core::array::from_fn(|i| i16::from_le_bytes(self.rx_bytes[i]));
        let mut output = [0i16; N];
        process(&mut output, &input);

        for (dst, sample) in self.tx_bytes.iter_mut().zip(output.iter()) {
            *dst = sample.to_le_bytes();
        }
        self.driver.write_all(self.tx_bytes.as_flattened(), BLOCK)
    }
}
