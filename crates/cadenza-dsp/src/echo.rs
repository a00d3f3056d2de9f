//! Feedback echo.

use cadenza_core::{forward_reader, Buffer, ReadStatus, Reader, Result};
use serde::{Deserialize, Serialize};

/// Echo settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoParams {
    /// Delay in seconds.
    pub delay: f64,
    /// Share of the delayed signal fed back into the delay line.
    pub feedback: f32,
    /// Wet share of the output, 0 = dry only.
    pub mix: f32,
    /// Clear the delay line on seek. When unset, echoes from before the
    /// seek keep sounding after it.
    pub reset_on_seek: bool,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            delay: 0.25,
            feedback: 0.5,
            mix: 0.5,
            reset_on_seek: false,
        }
    }
}

impl EchoParams {
    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    pub fn with_feedback(mut self, feedback: f32) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_mix(mut self, mix: f32) -> Self {
        self.mix = mix;
        self
    }

    pub fn with_reset_on_seek(mut self, reset: bool) -> Self {
        self.reset_on_seek = reset;
        self
    }
}

/// Adds a decaying echo to its delegate.
///
/// The delay line holds `delay * rate` frames. Each processed sample is
/// `in + delayed * feedback`; that value is written back into the delay
/// line and mixed with the dry input by `mix`.
///
/// Delay-line slots only become audible once the read that filled them has
/// returned. Until the line has filled once, a read longer than the delay
/// does not echo material from earlier in the same read; after that every
/// slot is live and long reads echo themselves.
pub struct EchoReader {
    reader: Box<dyn Reader>,
    params: EchoParams,
    input: Buffer,
    delay_buffer: Vec<f32>,
    delay_samples: usize,
    write_position: usize,
    samples_available: usize,
}

impl EchoReader {
    pub fn new(reader: Box<dyn Reader>, params: EchoParams) -> Self {
        let specs = reader.specs();
        let delay_samples = ((params.delay * specs.rate) as usize).max(1);
        tracing::debug!(
            delay_samples,
            feedback = params.feedback,
            mix = params.mix,
            "echo delay line allocated"
        );

        Self {
            reader,
            params,
            input: Buffer::new(0),
            delay_buffer: vec![0.0; delay_samples * specs.samples_per_frame()],
            delay_samples,
            write_position: 0,
            samples_available: 0,
        }
    }

    pub fn params(&self) -> EchoParams {
        self.params
    }

    /// Delay line length in frames.
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Forget all pending echoes.
    pub fn reset(&mut self) {
        self.samples_available = 0;
        self.write_position = 0;
    }
}

impl Reader for EchoReader {
    forward_reader!(specs, is_seekable, length, position);

    fn seek(&mut self, position: i64) {
        self.reader.seek(position);
        if self.params.reset_on_seek {
            tracing::debug!(position, "echo delay line cleared on seek");
            self.reset();
        }
    }

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        let channels = self.reader.specs().samples_per_frame();
        self.input
            .assure_size(length * channels * std::mem::size_of::<f32>(), false);

        let status = self.reader.read(length, self.input.as_f32_mut())?;
        let frames = status.frames;

        let input = self.input.as_f32();
        let EchoParams { feedback, mix, .. } = self.params;

        for i in 0..frames {
            let delay_index = (self.write_position + i) % self.delay_samples;
            for c in 0..channels {
                let index = i * channels + c;
                let slot = delay_index * channels + c;

                let in_sample = input[index];
                let delayed = if delay_index < self.samples_available {
                    self.delay_buffer[slot]
                } else {
                    0.0
                };

                let out_sample = in_sample + delayed * feedback;
                buffer[index] = in_sample * (1.0 - mix) + out_sample * mix;
                self.delay_buffer[slot] = out_sample;
            }
        }

        self.write_position = (self.write_position + frames) % self.delay_samples;
        self.samples_available = (self.samples_available + frames).min(self.delay_samples);

        Ok(status)
    }
}
