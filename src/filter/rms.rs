use libm::sqrtf;

use super::Sample;

/// Quadratic mean of a completed window, in raw ADC units.
pub fn compute_rms<const WINDOW_SIZE: usize>(window: &[Sample; WINDOW_SIZE]) -> f32 {
    if WINDOW_SIZE == 0 {
        return 0.0;
    }

    // i16 squared fits in i32 but a window of them doesn't, sum in i64
    let mut sum_sq: i64 = 0;
    for s in window.iter() {
        let s = *s as i64;
        sum_sq += s * s;
    }

    sqrtf(sum_sq as f32 / WINDOW_SIZE as f32)
}
