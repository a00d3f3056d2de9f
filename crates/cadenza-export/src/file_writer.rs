//! Driving readers into writers.

use crate::error::{ExportError, Result};
use crate::options::WriteOptions;
use cadenza_core::{Codec, Container, DeviceSpecs, FileManager, Reader, Writer};
use std::path::Path;

/// Pulls audio from a reader and pushes it into one or more writers.
///
/// Samples are clamped to [-1.0, 1.0] on the way through, so integer
/// encoders never see out-of-range input.
pub struct FileWriter;

impl FileWriter {
    /// Create a writer for `path` through the registered output plugins.
    pub fn create_writer(
        manager: &FileManager,
        path: impl AsRef<Path>,
        specs: DeviceSpecs,
        container: Container,
        codec: Codec,
        bitrate: u32,
    ) -> Result<Box<dyn Writer>> {
        Ok(manager.create_writer(path, specs, container, codec, bitrate)?)
    }

    /// Copy up to `length` frames (0 = until end of stream) from `reader`
    /// into `writer`, `buffer_size` frames at a time.
    ///
    /// Returns the number of frames written.
    pub fn write_reader(
        reader: &mut dyn Reader,
        writer: &mut dyn Writer,
        length: usize,
        buffer_size: usize,
    ) -> Result<usize> {
        let channels = reader.specs().samples_per_frame();
        let target = writer.specs().channels() as usize;
        if channels != target {
            return Err(ExportError::InvalidOptions(format!(
                "reader has {channels} channels, writer expects {target}"
            )));
        }
        check_buffer_size(buffer_size)?;

        tracing::debug!(length, buffer_size, channels, "writing reader");

        let mut buffer = vec![0.0f32; buffer_size * channels];
        let written = pump(reader, length, buffer_size, &mut buffer, |frames, samples| {
            writer.write(frames, samples)?;
            Ok(())
        })?;

        tracing::debug!(frames = written, "reader written");
        Ok(written)
    }

    /// Copy `reader` into one mono writer per channel.
    ///
    /// Channel `i` goes to `writers[i]`.
    pub fn write_reader_split(
        reader: &mut dyn Reader,
        writers: &mut [Box<dyn Writer>],
        length: usize,
        buffer_size: usize,
    ) -> Result<usize> {
        let channels = reader.specs().samples_per_frame();
        if writers.len() != channels {
            return Err(ExportError::InvalidOptions(format!(
                "reader has {channels} channels, got {} writers",
                writers.len()
            )));
        }
        if let Some(index) = writers.iter().position(|w| w.specs().channels() != 1) {
            return Err(ExportError::InvalidOptions(format!(
                "writer {index} is not mono"
            )));
        }
        check_buffer_size(buffer_size)?;

        tracing::debug!(length, buffer_size, channels, "writing reader split by channel");

        let mut buffer = vec![0.0f32; buffer_size * channels];
        let mut mono = vec![0.0f32; buffer_size];
        let written = pump(reader, length, buffer_size, &mut buffer, |frames, samples| {
            for (channel, writer) in writers.iter_mut().enumerate() {
                for (out, frame) in mono.iter_mut().zip(samples.chunks_exact(channels)) {
                    *out = frame[channel];
                }
                writer.write(frames, &mono[..frames])?;
            }
            Ok(())
        })?;

        tracing::debug!(frames = written, "reader written");
        Ok(written)
    }

    /// [`write_reader`](Self::write_reader) with settings from `options`.
    pub fn write_with_options(
        reader: &mut dyn Reader,
        writer: &mut dyn Writer,
        options: &WriteOptions,
    ) -> Result<usize> {
        Self::write_reader(reader, writer, options.length_or_zero(), options.buffer_size)
    }
}

fn check_buffer_size(buffer_size: usize) -> Result<()> {
    if buffer_size == 0 {
        return Err(ExportError::InvalidOptions(
            "buffer size must be at least one frame".into(),
        ));
    }
    Ok(())
}

/// Read/clamp/sink loop shared by both write modes.
fn pump(
    reader: &mut dyn Reader,
    length: usize,
    buffer_size: usize,
    buffer: &mut [f32],
    mut sink: impl FnMut(usize, &[f32]) -> Result<()>,
) -> Result<usize> {
    let channels = reader.specs().samples_per_frame();
    let mut position = 0;

    while length == 0 || position < length {
        let mut frames = buffer_size;
        if length > 0 {
            frames = frames.min(length - position);
        }

        let status = reader.read(frames, buffer)?;
        let samples = &mut buffer[..status.frames * channels];
        for sample in samples.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }

        if status.frames > 0 {
            sink(status.frames, samples)?;
        }
        position += status.frames;

        if status.eos {
            break;
        }
    }

    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::{Buffer, BufferReader, SampleFormat, Specs};
    use std::sync::Arc;

    #[derive(Default)]
    struct Capture {
        channels: u16,
        samples: Vec<f32>,
        calls: usize,
    }

    impl Writer for Capture {
        fn specs(&self) -> DeviceSpecs {
            DeviceSpecs::new(Specs::new(1000.0, self.channels), SampleFormat::Float32)
        }

        fn position(&self) -> i64 {
            (self.samples.len() / self.channels as usize) as i64
        }

        fn write(&mut self, length: usize, buffer: &[f32]) -> cadenza_core::Result<()> {
            self.calls += 1;
            self.samples
                .extend_from_slice(&buffer[..length * self.channels as usize]);
            Ok(())
        }
    }

    fn capture(channels: u16) -> Capture {
        Capture {
            channels,
            ..Default::default()
        }
    }

    fn source(samples: &[f32], channels: u16) -> BufferReader {
        let mut buffer = Buffer::with_samples(samples.len());
        buffer.as_f32_mut().copy_from_slice(samples);
        BufferReader::new(Arc::new(buffer), Specs::new(1000.0, channels))
    }

    #[test]
    fn test_writes_until_end_and_clamps() {
        let mut reader = source(&[0.5, 2.0, -3.0, -0.25, 1.0], 1);
        let mut writer = capture(1);

        let written = FileWriter::write_reader(&mut reader, &mut writer, 0, 2).unwrap();
        assert_eq!(written, 5);
        assert_eq!(writer.samples, vec![0.5, 1.0, -1.0, -0.25, 1.0]);
        assert_eq!(writer.calls, 3);
    }

    #[test]
    fn test_length_limits_output() {
        let mut reader = source(&[0.1; 20], 2);
        let mut writer = capture(2);

        let written = FileWriter::write_reader(&mut reader, &mut writer, 7, 3).unwrap();
        assert_eq!(written, 7);
        assert_eq!(writer.samples.len(), 14);
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn test_split_by_channel() {
        let mut reader = source(&[0.1, -0.1, 0.2, -0.2, 0.3, -0.3], 2);
        let mut writers: Vec<Box<dyn Writer>> = vec![Box::new(capture(1)), Box::new(capture(1))];

        let written = FileWriter::write_reader_split(&mut reader, &mut writers, 0, 2).unwrap();
        assert_eq!(written, 3);
        assert_eq!(writers[0].position(), 3);
        assert_eq!(writers[1].position(), 3);
    }

    #[test]
    fn test_rejects_mismatched_writers() {
        let mut reader = source(&[0.0; 4], 2);

        let mut writer = capture(1);
        let err = FileWriter::write_reader(&mut reader, &mut writer, 0, 16).unwrap_err();
        assert!(matches!(err, ExportError::InvalidOptions(_)));

        let mut writers: Vec<Box<dyn Writer>> = vec![Box::new(capture(1))];
        let err = FileWriter::write_reader_split(&mut reader, &mut writers, 0, 16).unwrap_err();
        assert!(matches!(err, ExportError::InvalidOptions(_)));

        let mut writers: Vec<Box<dyn Writer>> = vec![Box::new(capture(2)), Box::new(capture(1))];
        let err = FileWriter::write_reader_split(&mut reader, &mut writers, 0, 16).unwrap_err();
        assert!(matches!(err, ExportError::InvalidOptions(_)));
    }

    #[test]
    fn test_zero_buffer_size_is_rejected() {
        let mut reader = source(&[0.0; 4], 1);
        let mut writer = capture(1);
        let err = FileWriter::write_reader(&mut reader, &mut writer, 0, 0).unwrap_err();
        assert!(matches!(err, ExportError::InvalidOptions(_)));
    }

    #[test]
    fn test_write_with_options() {
        let mut reader = source(&[0.25; 10], 1);
        let mut writer = capture(1);
        let options = WriteOptions::default().with_buffer_size(4).with_length(6);

        let written = FileWriter::write_with_options(&mut reader, &mut writer, &options).unwrap();
        assert_eq!(written, 6);
        assert_eq!(writer.calls, 2);
    }

    #[test]
    fn test_manager_without_outputs() {
        let manager = FileManager::new();
        let specs = DeviceSpecs::new(Specs::mono(1000.0), SampleFormat::S16);
        let err = FileWriter::create_writer(&manager, "out.wav", specs, Container::Wav, Codec::Pcm, 0)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ExportError::Core(cadenza_core::Error::FileNotFound(_))
        ));
    }
}
