//! Audio callback: the per-buffer entry point of the audio context.
//!
//! The transfer engine (I2S DMA on target) calls [`AudioEngine::process`]
//! once per completed buffer. Order per buffer: honour a pending lockout,
//! latch the mode, generate.

use super::lockout::AudioLockout;
use super::mode::ModeController;
use super::oscillator::{AudioMode, Oscillator};

pub struct AudioEngine<'a> {
    osc: Oscillator,
    modes: &'a ModeController,
    lockout: &'a AudioLockout,
    buffers: u32,
}

impl<'a> AudioEngine<'a> {
    pub fn new(
        freq_hz: u32,
        sample_rate: u32,
        modes: &'a ModeController,
        lockout: &'a AudioLockout,
    ) -> Self {
        Self {
            osc: Oscillator::new(freq_hz, sample_rate),
            modes,
            lockout,
            buffers: 0,
        }
    }

    /// Fill `output` from the oscillator or from `input` and return the
    /// mode used for this buffer.
    pub fn process(&mut self, output: &mut [i16], input: &[i16]) -> AudioMode {
        self.process_with(output, input, core::hint::spin_loop)
    }

    /// As [`process`](Self::process); `relax` runs while parked by a lockout.
    pub fn process_with(
        &mut self,
        output: &mut [i16],
        input: &[i16],
        relax: impl FnMut(),
    ) -> AudioMode {
        self.lockout.checkpoint(relax);

        // The controller never stores an out-of-range id; Saw is the
        // generator of last resort.
        let mode = AudioMode::from_u8(self.modes.begin_buffer()).unwrap_or(AudioMode::Saw);
        self.osc.fill(mode, output, input);
        self.buffers = self.buffers.wrapping_add(1);
        mode
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.osc
    }

    /// Buffers processed since start (wraps).
    pub fn buffers(&self) -> u32 {
        self.buffers
    }
}
