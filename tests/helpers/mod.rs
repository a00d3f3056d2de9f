//! Test helpers and fixtures for cadenza integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (passthrough, unity gain)
//! - `DSP_EPSILON` (1e-4): Overlap-add and interpolation
//! - `INT*_EPSILON`: One quantization step of an integer encoding

#![allow(dead_code)]

pub mod tolerances;

use cadenza::prelude::*;
use cadenza::Buffer;
use std::sync::Arc;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard block size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 512;

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// A reader over interleaved `samples`.
pub fn reader_from(samples: &[f32], specs: Specs) -> BufferReader {
    let mut buffer = Buffer::with_samples(samples.len());
    buffer.as_f32_mut().copy_from_slice(samples);
    BufferReader::new(Arc::new(buffer), specs)
}

/// Drain `reader` block by block until end of stream.
pub fn read_all(reader: &mut dyn Reader, block: usize) -> Vec<f32> {
    let channels = reader.specs().samples_per_frame();
    let mut out = Vec::new();
    let mut scratch = vec![0.0f32; block * channels];
    loop {
        let status = reader.read(block, &mut scratch).unwrap();
        out.extend_from_slice(&scratch[..status.frames * channels]);
        if status.eos {
            return out;
        }
    }
}
