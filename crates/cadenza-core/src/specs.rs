//! Stream description value types.
//!
//! The canonical format flowing between processing stages is interleaved
//! 32-bit float, described by [`Specs`]. Raw encodings only appear at
//! file and device boundaries, described by [`DeviceSpecs`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical sample type between processing stages.
pub type Sample = f32;

/// Sample encoding.
///
/// Integral encodings are signed two's-complement except [`SampleFormat::U8`],
/// which is unsigned with a zero offset of 128. Float encodings are
/// normalized to [-1.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleFormat {
    U8,
    S16,
    /// Packed 3-byte signed integer in host byte order.
    S24,
    S32,
    #[default]
    Float32,
    Float64,
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 6] = [
        SampleFormat::U8,
        SampleFormat::S16,
        SampleFormat::S24,
        SampleFormat::S32,
        SampleFormat::Float32,
        SampleFormat::Float64,
    ];

    /// Bytes per scalar sample.
    pub const fn sample_size(&self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S24 => 3,
            SampleFormat::S32 | SampleFormat::Float32 => 4,
            SampleFormat::Float64 => 8,
        }
    }

    pub const fn bits(&self) -> u16 {
        (self.sample_size() * 8) as u16
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, SampleFormat::Float32 | SampleFormat::Float64)
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleFormat::U8 => "u8",
            SampleFormat::S16 => "s16",
            SampleFormat::S24 => "s24",
            SampleFormat::S32 => "s32",
            SampleFormat::Float32 => "f32",
            SampleFormat::Float64 => "f64",
        };
        f.write_str(name)
    }
}

/// Channel count and sample rate of a canonical float stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    /// Sample rate in Hz.
    pub rate: f64,
    /// Interleaved channel count.
    pub channels: u16,
}

impl Specs {
    pub const fn new(rate: f64, channels: u16) -> Self {
        Self { rate, channels }
    }

    pub const fn mono(rate: f64) -> Self {
        Self::new(rate, 1)
    }

    pub const fn stereo(rate: f64) -> Self {
        Self::new(rate, 2)
    }

    /// Samples per frame.
    #[inline]
    pub fn samples_per_frame(&self) -> usize {
        self.channels as usize
    }

    /// Bytes per canonical float frame.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.channels as usize * std::mem::size_of::<Sample>()
    }

    pub fn is_valid(&self) -> bool {
        self.channels > 0 && self.rate > 0.0 && self.rate.is_finite()
    }

    /// Whole frames in `seconds` at this rate.
    pub fn frames_for(&self, seconds: f64) -> usize {
        (seconds * self.rate).max(0.0) as usize
    }
}

impl Default for Specs {
    fn default() -> Self {
        Self::stereo(48000.0)
    }
}

/// Specs of a raw-encoded stream at an I/O boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSpecs {
    pub specs: Specs,
    pub format: SampleFormat,
}

impl DeviceSpecs {
    pub const fn new(specs: Specs, format: SampleFormat) -> Self {
        Self { specs, format }
    }

    /// Bytes per encoded frame.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.specs.channels as usize * self.format.sample_size()
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.specs.rate
    }

    #[inline]
    pub fn channels(&self) -> u16 {
        self.specs.channels
    }
}

/// One decodable stream inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Start offset in seconds.
    pub start: f64,
    /// Duration in seconds; 0 or an estimate when unknown.
    pub duration: f64,
    pub specs: DeviceSpecs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_sizes() {
        assert_eq!(SampleFormat::U8.sample_size(), 1);
        assert_eq!(SampleFormat::S16.sample_size(), 2);
        assert_eq!(SampleFormat::S24.sample_size(), 3);
        assert_eq!(SampleFormat::S32.sample_size(), 4);
        assert_eq!(SampleFormat::Float32.sample_size(), 4);
        assert_eq!(SampleFormat::Float64.sample_size(), 8);
        assert_eq!(SampleFormat::S24.bits(), 24);
    }

    #[test]
    fn test_frame_sizes() {
        let specs = Specs::stereo(44100.0);
        assert_eq!(specs.frame_size(), 8);

        let device = DeviceSpecs::new(Specs::new(48000.0, 6), SampleFormat::S24);
        assert_eq!(device.frame_size(), 18);
    }

    #[test]
    fn test_specs_validity() {
        assert!(Specs::mono(48000.0).is_valid());
        assert!(!Specs::new(48000.0, 0).is_valid());
        assert!(!Specs::new(0.0, 2).is_valid());
        assert!(!Specs::new(f64::NAN, 2).is_valid());
    }

    #[test]
    fn test_frames_for() {
        let specs = Specs::mono(48000.0);
        assert_eq!(specs.frames_for(1.0), 48000);
        assert_eq!(specs.frames_for(0.5), 24000);
        assert_eq!(specs.frames_for(-1.0), 0);
    }

    #[test]
    fn test_specs_serde() {
        let device = DeviceSpecs::new(Specs::stereo(44100.0), SampleFormat::S16);
        let json = serde_json::to_string(&device).unwrap();
        let back: DeviceSpecs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, device);
    }
}
