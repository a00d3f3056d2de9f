//! Reader applying a [`StretchEngine`] to its delegate.

use super::engine::StretchEngine;
use super::params::TimeStretchParams;
use cadenza_core::{forward_reader, Buffer, Error, ReadStatus, Reader, Result};

/// Changes the duration and pitch of its delegate independently.
///
/// Positions and lengths are reported in output time; seeking maps back to
/// source time through the current time ratio.
pub struct TimeStretchPitchScaleReader {
    reader: Box<dyn Reader>,
    engine: Box<dyn StretchEngine>,
    params: TimeStretchParams,

    /// Interleaved frames pulled from the delegate.
    source: Buffer,
    /// Planar scratch between the engine and the interleaved caller buffer.
    planar: Vec<Vec<f32>>,

    samples_to_drop: usize,
    position: i64,
    source_finished: bool,
}

impl TimeStretchPitchScaleReader {
    /// Fails with [`Error::InvalidState`] when either ratio is outside
    /// [1/256, 256], and with [`Error::InvalidSpecs`] when the engine's
    /// channel count differs from the delegate's.
    pub fn new(
        reader: Box<dyn Reader>,
        engine: Box<dyn StretchEngine>,
        params: TimeStretchParams,
    ) -> Result<Self> {
        params.validate()?;

        let channels = reader.specs().samples_per_frame();
        if engine.channels() != channels {
            return Err(Error::InvalidSpecs(format!(
                "stretch engine has {} channels, source has {}",
                engine.channels(),
                channels
            )));
        }

        let mut stretcher = Self {
            reader,
            engine,
            params,
            source: Buffer::new(0),
            planar: vec![Vec::new(); channels],
            samples_to_drop: 0,
            position: 0,
            source_finished: false,
        };
        stretcher.engine.set_time_ratio(params.time_ratio);
        stretcher.engine.set_pitch_scale(params.pitch_scale);
        stretcher.prime();
        Ok(stretcher)
    }

    pub fn time_ratio(&self) -> f64 {
        self.params.time_ratio
    }

    pub fn pitch_scale(&self) -> f64 {
        self.params.pitch_scale
    }

    pub fn params(&self) -> TimeStretchParams {
        self.params
    }

    /// Out-of-range values are ignored.
    pub fn set_time_ratio(&mut self, ratio: f64) {
        if TimeStretchParams::is_valid_ratio(ratio) {
            self.params.time_ratio = ratio;
            self.engine.set_time_ratio(ratio);
        }
    }

    /// Out-of-range values are ignored.
    pub fn set_pitch_scale(&mut self, scale: f64) {
        if TimeStretchParams::is_valid_ratio(scale) {
            self.params.pitch_scale = scale;
            self.engine.set_pitch_scale(scale);
        }
    }

    /// Reset the engine and feed it its preferred silent start pad.
    fn prime(&mut self) {
        self.engine.reset();
        self.source_finished = false;

        let pad = self.engine.preferred_start_pad();
        for channel in &mut self.planar {
            channel.clear();
            channel.resize(pad, 0.0);
        }
        let slices: Vec<&[f32]> = self.planar.iter().map(|c| &c[..pad]).collect();
        self.engine.feed(&slices, pad, false);

        self.samples_to_drop = self.engine.start_delay();
        tracing::debug!(pad, drop = self.samples_to_drop, "stretch engine primed");
    }

    /// Pull the frames the engine asks for from the delegate and feed them.
    fn feed(&mut self) -> Result<()> {
        let channels = self.planar.len();
        let count = self.engine.samples_required().max(1);

        self.source
            .assure_size(count * channels * std::mem::size_of::<f32>(), false);
        let status = self.reader.read(count, self.source.as_f32_mut())?;

        let interleaved = self.source.as_f32();
        for (c, channel) in self.planar.iter_mut().enumerate() {
            channel.clear();
            channel.extend(
                interleaved[..status.frames * channels]
                    .iter()
                    .skip(c)
                    .step_by(channels),
            );
        }

        let slices: Vec<&[f32]> = self.planar.iter().map(|c| c.as_slice()).collect();
        self.engine.feed(&slices, status.frames, status.eos);
        self.source_finished = status.eos;
        Ok(())
    }
}

impl Reader for TimeStretchPitchScaleReader {
    forward_reader!(specs, is_seekable);

    fn length(&self) -> i64 {
        let length = self.reader.length();
        if length < 0 {
            return length;
        }
        (length as f64 * self.params.time_ratio).round() as i64
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn seek(&mut self, position: i64) {
        let position = position.max(0);
        let source_position = (position as f64 / self.params.time_ratio) as i64;
        tracing::debug!(position, source_position, "stretch reader seek");

        self.reader.seek(source_position);
        self.position = position;
        self.prime();
    }

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        let channels = self.planar.len();
        let mut done = 0;
        let mut eos = false;

        while done < length {
            let available = self.engine.available();
            if available < 0 {
                eos = true;
                break;
            }
            if available == 0 {
                if self.source_finished {
                    // engine flushed but reports nothing more
                    eos = true;
                    break;
                }
                self.feed()?;
                continue;
            }

            let available = available as usize;
            let want = if self.samples_to_drop > 0 {
                self.samples_to_drop.min(available)
            } else {
                (length - done).min(available)
            };

            for channel in &mut self.planar {
                channel.resize(want, 0.0);
            }
            let mut slices: Vec<&mut [f32]> =
                self.planar.iter_mut().map(|c| c.as_mut_slice()).collect();
            let got = self.engine.retrieve(&mut slices, want);

            if self.samples_to_drop > 0 {
                self.samples_to_drop -= got.min(self.samples_to_drop);
                continue;
            }

            for (c, channel) in self.planar.iter().enumerate() {
                for (i, &sample) in channel[..got].iter().enumerate() {
                    buffer[(done + i) * channels + c] = sample;
                }
            }
            done += got;
        }

        self.position += done as i64;
        Ok(ReadStatus::new(done, eos))
    }
}
