//! Phase oscillator tests

use codec_audio_fw::audio::lut::SINE_LUT;
use codec_audio_fw::audio::{phase_increment, saw, sine_interp, AudioMode, Oscillator};

#[test]
fn test_sine_interp_in_range() {
    let mut phase = 0u32;
    for _ in 0..100_000 {
        let v = sine_interp(phase);
        assert!((-32767..=32767).contains(&v), "phase {:#x} -> {}", phase, v);
        phase = phase.wrapping_add(0x0009_3E5B);
    }
    assert!((-32767..=32767).contains(&sine_interp(u32::MAX)));
}

#[test]
fn test_sine_interp_table_aligned_exact() {
    for k in 0..1024u32 {
        assert_eq!(sine_interp(k << 22), SINE_LUT[k as usize], "k = {}", k);
    }
}

#[test]
fn test_sine_interp_wraps() {
    // Just below a full cycle sits between table[1023] and table[0].
    let v = sine_interp(u32::MAX);
    assert!(v <= 0);
    assert!(v >= SINE_LUT[1023]);
    assert_eq!(sine_interp(0u32.wrapping_add(1 << 22)), SINE_LUT[1]);
}

#[test]
fn test_saw_values() {
    assert_eq!(saw(0), 0);
    assert_eq!(saw(0x7FFF_0000), 32767);
    assert_eq!(saw(0x8000_0000), -32768);
    assert_eq!(saw(0xFFFF_FFFF), -1);
}

#[test]
fn test_generative_fill_writes_inverted_right_channel() {
    let mut osc = Oscillator::new(100, 48_000);
    let mut out = [0i16; 64];
    osc.fill(AudioMode::Sine, &mut out, &[]);

    let mut reference = Oscillator::new(100, 48_000);
    for frame in out.chunks_exact(2) {
        let x = reference.next_sample(AudioMode::Sine);
        assert_eq!(frame[0], x);
        assert_eq!(frame[1], -x);
    }
    assert_eq!(osc.phase(), reference.phase());
}

#[test]
fn test_saw_negation_saturates() {
    // The second frame lands on phase 0x8000_0000, saw = -32768.
    let mut osc = Oscillator::with_increment(0x8000_0000);
    let mut out = [0i16; 4];
    osc.fill(AudioMode::Saw, &mut out, &[]);

    assert_eq!(out, [0, 0, -32768, 32767]);
}

#[test]
fn test_phase_advances_once_per_frame() {
    let inc = phase_increment(100, 48_000);
    let mut osc = Oscillator::with_increment(inc);
    let mut out = [0i16; 512];
    osc.fill(AudioMode::Saw, &mut out, &[]);

    assert_eq!(osc.phase(), inc.wrapping_mul(256));
}

#[test]
fn test_phase_wraps_without_panic() {
    let mut osc = Oscillator::with_increment(u32::MAX);
    let mut out = [0i16; 8];
    osc.fill(AudioMode::Sine, &mut out, &[]);
    assert_eq!(osc.phase(), u32::MAX.wrapping_mul(4));
}

#[test]
fn test_passthrough_copies_input() {
    let mut osc = Oscillator::new(100, 48_000);
    let input: Vec<i16> = (0..32).map(|i| i * 100 - 1600).collect();
    let mut out = [7i16; 32];
    osc.fill(AudioMode::Passthrough, &mut out, &input);

    assert_eq!(&out[..], &input[..]);
    assert_eq!(osc.phase(), 0, "passthrough must not advance the phase");
}

#[test]
fn test_passthrough_zero_fills_short_input() {
    let mut osc = Oscillator::new(100, 48_000);
    let mut out = [7i16; 6];
    osc.fill(AudioMode::Passthrough, &mut out, &[1, 2, 3, 4]);
    assert_eq!(out, [1, 2, 3, 4, 0, 0]);
}

#[test]
fn test_odd_trailing_sample_zeroed() {
    let mut osc = Oscillator::with_increment(1 << 22);
    let mut out = [7i16; 5];
    osc.fill(AudioMode::Sine, &mut out, &[]);
    assert_eq!(out[0], SINE_LUT[0]);
    assert_eq!(out[2], SINE_LUT[1]);
    assert_eq!(out[4], 0);
}
