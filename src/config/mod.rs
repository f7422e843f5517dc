//! Module: config
//!
//! Purpose: Board and firmware configuration for codec-audio.
//!
//! Everything here is fixed at build time: the codec backend, pin
//! assignment, sample rate and tone frequency cannot change while running.
//! Only the last selected audio mode survives a power cycle (see [`nvs`]).

use crate::audio::{phase_increment, AudioMode, HandoffWait};
use crate::codec::CodecKind;

// NVS persistence for the selected audio mode
pub mod nvs;

/// I2C control bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    pub sda_pin: i32,
    pub scl_pin: i32,
    pub frequency_hz: u32,
    /// Per-transfer timeout; a transfer that exceeds it counts as one failed
    /// attempt.
    pub timeout_ms: u32,
}

/// Bit-banged L3 control port (UDA1345).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L3Config {
    pub data_pin: i32,
    pub clock_pin: i32,
    pub mode_pin: i32,
}

/// I2S audio port. The ESP32 is clock master; MCLK is 256 fs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2sConfig {
    pub mclk_pin: i32,
    pub bclk_pin: i32,
    pub ws_pin: i32,
    pub dout_pin: i32,
    pub din_pin: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareConfig {
    /// Codec backend brought up at startup.
    pub codec: CodecKind,
    pub i2c: I2cConfig,
    /// Codec RESET line (AIC3101 only).
    pub codec_reset_pin: i32,
    pub l3: L3Config,
    pub i2s: I2sConfig,
    pub sample_rate: u32,
    /// Generator frequency for the saw and sine modes.
    pub tone_hz: u32,
    /// Stereo frames per I2S buffer (one audio callback per buffer).
    pub frames_per_buffer: usize,
    /// Mode used when nothing valid is stored.
    pub initial_mode: AudioMode,
    /// Wait policy for mode handoff and core lockout.
    pub handoff: HandoffWait,
    pub led_pin: i32,
    /// Mode button, active low with pull-up.
    pub button_pin: i32,
    /// Button poll period in the control loop.
    pub poll_ms: u32,
    pub log_tx_pin: i32,
    pub log_baud: u32,
}

impl FirmwareConfig {
    /// Number of selectable audio modes.
    pub const MODE_COUNT: u8 = AudioMode::COUNT;

    /// Phase increment for the configured tone.
    pub const fn tone_increment(&self) -> u32 {
        phase_increment(self.tone_hz, self.sample_rate)
    }

    /// Interleaved samples per buffer (two channels).
    pub const fn samples_per_buffer(&self) -> usize {
        self.frames_per_buffer * 2
    }

    /// Every GPIO number assigned by this configuration.
    pub fn gpio_pins(&self) -> [i32; 14] {
        [
            self.i2c.sda_pin,
            self.i2c.scl_pin,
            self.codec_reset_pin,
            self.l3.data_pin,
            self.l3.clock_pin,
            self.l3.mode_pin,
            self.i2s.mclk_pin,
            self.i2s.bclk_pin,
            self.i2s.ws_pin,
            self.i2s.dout_pin,
            self.i2s.din_pin,
            self.led_pin,
            self.button_pin,
            self.log_tx_pin,
        ]
    }
}

const _: () = assert!(
    CONFIG.tone_hz < CONFIG.sample_rate / 2,
    "tone frequency must be below Nyquist"
);

/// ESP32-S3 DevKitC wiring.
pub const CONFIG: FirmwareConfig = FirmwareConfig {
    codec: CodecKind::Nau88c22,
    i2c: I2cConfig {
        sda_pin: 8,
        scl_pin: 9,
        frequency_hz: 100_000,
        timeout_ms: 10,
    },
    codec_reset_pin: 10,
    l3: L3Config {
        data_pin: 11,
        clock_pin: 12,
        mode_pin: 13,
    },
    i2s: I2sConfig {
        mclk_pin: 16,
        bclk_pin: 17,
        ws_pin: 18,
        dout_pin: 15,
        din_pin: 21,
    },
    sample_rate: 48_000,
    tone_hz: 100,
    frames_per_buffer: 256,
    initial_mode: AudioMode::Saw,
    handoff: HandoffWait::Forever,
    led_pin: 2,
    button_pin: 0,
    poll_ms: 10,
    log_tx_pin: 43,
    log_baud: 115_200,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pins_distinct() {
        let pins = CONFIG.gpio_pins();
        for (i, a) in pins.iter().enumerate() {
            for b in &pins[i + 1..] {
                assert_ne!(a, b, "GPIO {} assigned twice", a);
            }
        }
    }

    #[test]
    fn test_tone_increment() {
        // floor(100 * 2^32 / 48000)
        assert_eq!(CONFIG.tone_increment(), 8_947_848);
    }

    #[test]
    fn test_tone_below_nyquist() {
        assert!(CONFIG.tone_hz < CONFIG.sample_rate / 2);
        assert!(CONFIG.tone_increment() < crate::audio::MAX_INCREMENT);
    }

    #[test]
    fn test_buffer_geometry() {
        assert_eq!(CONFIG.samples_per_buffer(), 512);
        assert!(CONFIG.frames_per_buffer > 0);
    }

    #[test]
    fn test_initial_mode_in_range() {
        assert!(u8::from(CONFIG.initial_mode) < FirmwareConfig::MODE_COUNT);
    }
}
