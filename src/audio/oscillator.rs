//! Phase-accumulator oscillator.
//!
//! A free-running 32-bit phase advances by a fixed increment per frame; its
//! natural wraparound sets the output frequency. Top 10 bits index the sine
//! table, the next 10 bits weight the interpolation toward the next entry.
//!
//! Runs in the audio context only: constant time per sample, no I/O, no
//! blocking, no allocation.

use super::lut::{LUT_BITS, LUT_SIZE, SINE_LUT};

/// Fractional bits used for sine interpolation.
pub const INTERP_BITS: u32 = 10;

const INDEX_SHIFT: u32 = 32 - LUT_BITS;
const FRAC_SHIFT: u32 = INDEX_SHIFT - INTERP_BITS;
const FRAC_MASK: u32 = (1 << INTERP_BITS) - 1;

/// Generation mode, selected once per buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioMode {
    /// Sawtooth from the top 16 phase bits.
    Saw = 0,
    /// Interpolated sine.
    Sine = 1,
    /// Input copied to output.
    Passthrough = 2,
}

impl AudioMode {
    /// Number of modes; the valid mode ids are `0..COUNT`.
    pub const COUNT: u8 = 3;

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Saw),
            1 => Some(Self::Sine),
            2 => Some(Self::Passthrough),
            _ => None,
        }
    }

    /// Next mode in button order, wrapping.
    pub fn next(self) -> Self {
        match self {
            Self::Saw => Self::Sine,
            Self::Sine => Self::Passthrough,
            Self::Passthrough => Self::Saw,
        }
    }
}

impl From<AudioMode> for u8 {
    fn from(m: AudioMode) -> Self {
        m as u8
    }
}

/// Largest increment: just under half a cycle per sample.
pub const MAX_INCREMENT: u32 = (1 << 31) - 1;

/// Phase increment for `freq_hz` at `sample_rate`: `floor(f * 2^32 / fs)`,
/// clamped to [`MAX_INCREMENT`] at and above Nyquist. Zero for a zero rate.
#[inline]
pub const fn phase_increment(freq_hz: u32, sample_rate: u32) -> u32 {
    match ((freq_hz as u64) << 32).checked_div(sample_rate as u64) {
        Some(inc) if inc > MAX_INCREMENT as u64 => MAX_INCREMENT,
        Some(inc) => inc as u32,
        None => 0,
    }
}

/// Linearly interpolated sine at `phase`, in [-32767, 32767].
///
/// Table-aligned phases (`k << 22`) return `SINE_LUT[k]` exactly.
#[inline]
pub fn sine_interp(phase: u32) -> i16 {
    let index = (phase >> INDEX_SHIFT) as usize;
    let frac = ((phase >> FRAC_SHIFT) & FRAC_MASK) as i32;

    let a = SINE_LUT[index] as i32;
    let b = SINE_LUT[(index + 1) & (LUT_SIZE - 1)] as i32;

    ((a * ((1 << INTERP_BITS) - frac) + b * frac) >> INTERP_BITS) as i16
}

/// Sawtooth: the top 16 phase bits as a signed sample.
#[inline]
pub fn saw(phase: u32) -> i16 {
    (phase >> 16) as u16 as i16
}

/// Oscillator state owned by the audio context.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: u32,
    increment: u32,
}

impl Oscillator {
    pub fn new(freq_hz: u32, sample_rate: u32) -> Self {
        Self {
            phase: 0,
            increment: phase_increment(freq_hz, sample_rate),
        }
    }

    pub fn with_increment(increment: u32) -> Self {
        Self { phase: 0, increment }
    }

    #[inline]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    #[inline]
    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// Next sample of a generative mode; advances the phase.
    ///
    /// Passthrough has no generated signal and yields silence here.
    #[inline]
    pub fn next_sample(&mut self, mode: AudioMode) -> i16 {
        let wave = match mode {
            AudioMode::Saw => saw(self.phase),
            AudioMode::Sine => sine_interp(self.phase),
            AudioMode::Passthrough => return 0,
        };
        self.phase = self.phase.wrapping_add(self.increment);
        wave
    }

    /// Fill an interleaved stereo buffer for one transfer.
    ///
    /// Generative modes write `[x, -x]` per frame (negation saturates, so
    /// `-32768` pairs with `32767`). Passthrough copies `input` to `output`
    /// sample for sample; any output beyond the input length is zeroed.
    /// A trailing odd sample in a generative buffer is zeroed.
    pub fn fill(&mut self, mode: AudioMode, output: &mut [i16], input: &[i16]) {
        match mode {
            AudioMode::Saw | AudioMode::Sine => {
                let mut frames = output.chunks_exact_mut(2);
                for frame in &mut frames {
                    let wave = self.next_sample(mode);
                    frame[0] = wave;
                    frame[1] = wave.saturating_neg();
                }
                frames.into_remainder().fill(0);
            }
            AudioMode::Passthrough => {
                let n = output.len().min(input.len());
                output[..n].copy_from_slice(&input[..n]);
                output[n..].fill(0);
            }
        }
    }
}
