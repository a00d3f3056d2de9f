//! Tolerance constants for audio testing.
//!
//! Different operations require different precision levels.

/// Floating point rounding errors (for passthrough, exact gain).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// DSP processing tolerance (overlap-add, interpolation).
pub const DSP_EPSILON: f32 = 1e-4;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// One 8-bit quantization step.
pub const INT8_EPSILON: f32 = 1.0 / 128.0;

/// One 16-bit quantization step.
pub const INT16_EPSILON: f32 = 1.0 / 32767.0;

/// One 24-bit quantization step.
pub const INT24_EPSILON: f32 = 1.0 / 8388607.0;

/// Generate a normalized staircase signal in range [-1, 1].
pub fn generate_normalized_staircase(num_samples: usize) -> Vec<f32> {
    if num_samples <= 1 {
        return vec![0.0; num_samples];
    }
    let max = (num_samples - 1) as f32;
    (0..num_samples)
        .map(|i| (i as f32 / max) * 2.0 - 1.0)
        .collect()
}

/// Generate an impulse signal (single sample at 1.0, rest zeros).
pub fn generate_impulse(num_samples: usize, position: usize) -> Vec<f32> {
    let mut samples = vec![0.0; num_samples];
    if position < num_samples {
        samples[position] = 1.0;
    }
    samples
}

/// Largest absolute difference between two equally long signals.
pub fn max_difference(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "signal lengths differ");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}
