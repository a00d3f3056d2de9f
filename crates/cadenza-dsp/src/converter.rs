//! Storage encoding change at a write boundary.

use cadenza_core::{
    forward_reader, Buffer, Converter, ReadStatus, Reader, Result, SampleFormat,
};

/// Encodes the float output of its delegate into another [`SampleFormat`].
///
/// The encoded bytes are written into the caller's buffer, reinterpreted as
/// raw memory, so that buffer must hold at least
/// `frames * channels * format.sample_size()` bytes. Rate and channel count
/// pass through unchanged.
pub struct ConverterReader {
    reader: Box<dyn Reader>,
    converter: Converter,
    scratch: Buffer,
}

impl ConverterReader {
    pub fn new(reader: Box<dyn Reader>, format: SampleFormat) -> Self {
        Self {
            reader,
            converter: Converter::from_float(format),
            scratch: Buffer::new(0),
        }
    }

    /// Encoding written by `read`.
    pub fn format(&self) -> SampleFormat {
        self.converter.target_format()
    }

    /// `f32` slots a caller buffer needs to receive `frames` encoded frames.
    pub fn buffer_len(&self, frames: usize) -> usize {
        let bytes = frames * self.reader.specs().samples_per_frame() * self.format().sample_size();
        bytes.div_ceil(std::mem::size_of::<f32>())
    }

    pub fn into_inner(self) -> Box<dyn Reader> {
        self.reader
    }
}

impl Reader for ConverterReader {
    forward_reader!(specs, is_seekable, length, position, seek);

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        let samples_per_frame = self.reader.specs().samples_per_frame();
        self.scratch
            .assure_size(length * samples_per_frame * std::mem::size_of::<f32>(), false);

        let status = self.reader.read(length, self.scratch.as_f32_mut())?;

        self.converter.convert(
            bytemuck::cast_slice_mut(buffer),
            self.scratch.as_bytes(),
            status.frames * samples_per_frame,
        );

        Ok(status)
    }
}
