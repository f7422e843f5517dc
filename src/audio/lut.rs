//! Sine lookup table for the oscillator.
//!
//! 1024 entries covering one full cycle, built by const evaluation so the
//! table lives in flash and costs nothing at boot.

/// log2 of the table length.
pub const LUT_BITS: u32 = 10;

/// Number of entries in the sine LUT.
pub const LUT_SIZE: usize = 1 << LUT_BITS;

/// Peak amplitude. Symmetric so the table can be negated without overflow.
pub const LUT_AMPLITUDE: f64 = 32767.0;

/// `round(32767 * sin(2π * k / 1024))` for k in 0..1024.
///
/// Index 0 = 0°, 256 = 90°, 512 = 180°, 768 = 270°.
pub static SINE_LUT: [i16; LUT_SIZE] = build_table();

const fn build_table() -> [i16; LUT_SIZE] {
    let mut table = [0i16; LUT_SIZE];
    let mut i = 0;
    while i < LUT_SIZE {
        let angle = (i as f64) * 2.0 * core::f64::consts::PI / (LUT_SIZE as f64);
        let scaled = const_sin(angle) * LUT_AMPLITUDE;
        let rounded = if scaled >= 0.0 {
            (scaled + 0.5) as i32
        } else {
            (scaled - 0.5) as i32
        };
        table[i] = clamp_sample(rounded);
        i += 1;
    }
    table
}

const fn clamp_sample(v: i32) -> i16 {
    if v > 32767 {
        32767
    } else if v < -32767 {
        -32767
    } else {
        v as i16
    }
}

/// Const-compatible sine.
///
/// Folds the argument into [-π/2, π/2] before the Taylor series so the
/// truncation error stays far below one LSB of a 16-bit sample.
const fn const_sin(x: f64) -> f64 {
    use core::f64::consts::{FRAC_PI_2, PI};

    let mut x = x;
    while x > PI {
        x -= 2.0 * PI;
    }
    while x < -PI {
        x += 2.0 * PI;
    }
    // sin(π - x) = sin(x)
    if x > FRAC_PI_2 {
        x = PI - x;
    } else if x < -FRAC_PI_2 {
        x = -PI - x;
    }

    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    let mut n = 1;
    while n < 8 {
        term = -term * x2 / (((2 * n) * (2 * n + 1)) as f64);
        sum += term;
        n += 1;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_points_exact() {
        assert_eq!(SINE_LUT[0], 0);
        assert_eq!(SINE_LUT[256], 32767);
        assert_eq!(SINE_LUT[512], 0);
        assert_eq!(SINE_LUT[768], -32767);
    }

    #[test]
    fn test_odd_symmetry() {
        for k in 1..LUT_SIZE / 2 {
            assert_eq!(SINE_LUT[k], -SINE_LUT[LUT_SIZE - k], "k = {}", k);
        }
    }
}
