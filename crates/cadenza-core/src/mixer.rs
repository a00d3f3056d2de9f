//! Block mixer with volume envelopes.
//!
//! One mix epoch is `clear` → `mix`/`mix_ramp` any number of times →
//! `read`. The mixer has no internal locking; drive one instance from one
//! thread.

use crate::buffer::Buffer;
use crate::convert::Converter;
use crate::specs::{DeviceSpecs, SampleFormat};

/// Accumulates float streams into one block and emits it in the target
/// encoding.
#[derive(Debug)]
pub struct Mixer {
    specs: DeviceSpecs,
    converter: Converter,
    buffer: Buffer,
    /// Frames in the current epoch.
    length: usize,
}

impl Mixer {
    pub fn new(specs: DeviceSpecs) -> Self {
        Self {
            specs,
            converter: Converter::from_float(specs.format),
            buffer: Buffer::new(0),
            length: 0,
        }
    }

    pub fn specs(&self) -> DeviceSpecs {
        self.specs
    }

    /// Change the target specs. Takes effect at the next `clear`.
    pub fn set_specs(&mut self, specs: DeviceSpecs) {
        self.specs = specs;
        self.converter = Converter::from_float(specs.format);
    }

    /// Frames in the current epoch.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Start a new epoch of `length` frames with a silent accumulator.
    pub fn clear(&mut self, length: usize) {
        let samples = length * self.specs.specs.samples_per_frame();
        self.buffer.assure_size(samples * std::mem::size_of::<f32>(), false);
        self.length = length;
        self.accumulator().fill(0.0);
    }

    /// Add `length` frames of `buffer` scaled by `volume` at frame `start`.
    ///
    /// `length` is clamped to the end of the epoch.
    pub fn mix(&mut self, buffer: &[f32], start: usize, length: usize, volume: f32) {
        let channels = self.specs.specs.samples_per_frame();
        let length = self.clamp(start, length);
        if length == 0 {
            return;
        }
        let out = &mut self.accumulator()[start * channels..];

        for (o, i) in out.iter_mut().zip(&buffer[..length * channels]) {
            *o += i * volume;
        }
    }

    /// Like [`mix`](Self::mix), ramping the volume linearly per frame from
    /// `volume_from` to `volume_to` across the mixed frames.
    pub fn mix_ramp(
        &mut self,
        buffer: &[f32],
        start: usize,
        length: usize,
        volume_to: f32,
        volume_from: f32,
    ) {
        let channels = self.specs.specs.samples_per_frame();
        let length = self.clamp(start, length);
        if length == 0 {
            return;
        }
        let out = &mut self.accumulator()[start * channels..];
        let delta = volume_to - volume_from;

        for i in 0..length {
            let volume = volume_from + delta * (i as f32 / length as f32);
            for c in 0..channels {
                out[i * channels + c] += buffer[i * channels + c] * volume;
            }
        }
    }

    /// Scale the accumulator by `volume` and encode it into `out`.
    ///
    /// Ends the epoch: the accumulator is modified in place, so calling this
    /// twice applies `volume` twice.
    pub fn read(&mut self, out: &mut [u8], volume: f32) {
        let samples = self.length * self.specs.specs.samples_per_frame();
        let accumulator = &mut self.buffer.as_f32_mut()[..samples];
        if volume != 1.0 {
            for s in accumulator.iter_mut() {
                *s *= volume;
            }
        }
        self.converter
            .convert(out, bytemuck::cast_slice(&accumulator[..]), samples);
    }

    /// Bytes `read` writes for the current epoch.
    pub fn output_size(&self) -> usize {
        self.length * self.specs.frame_size()
    }

    fn clamp(&self, start: usize, length: usize) -> usize {
        (start + length).min(self.length).saturating_sub(start)
    }

    fn accumulator(&mut self) -> &mut [f32] {
        let samples = self.length * self.specs.specs.samples_per_frame();
        &mut self.buffer.as_f32_mut()[..samples]
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(DeviceSpecs::new(Default::default(), SampleFormat::Float32))
    }
}
