//! Whole-stream materialization for random access and repeated playback.

use cadenza_core::{Buffer, BufferReader, Reader, Result, Specs};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sizing of the materialization buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamBufferConfig {
    /// Slack added to a known source length, in seconds (default: 1.0)
    pub slack_seconds: f64,
    /// Growth step in seconds of `reference` audio (default: 5.0)
    pub chunk_seconds: f64,
    /// Layout the growth step is measured in (default: 48 kHz, 6 channels)
    pub reference: Specs,
}

impl Default for StreamBufferConfig {
    fn default() -> Self {
        Self {
            slack_seconds: 1.0,
            chunk_seconds: 5.0,
            reference: Specs::new(48000.0, 6),
        }
    }
}

impl StreamBufferConfig {
    pub fn with_chunk_seconds(mut self, seconds: f64) -> Self {
        self.chunk_seconds = seconds;
        self
    }

    pub fn with_slack_seconds(mut self, seconds: f64) -> Self {
        self.slack_seconds = seconds;
        self
    }

    /// Growth step in bytes.
    pub fn chunk_bytes(&self) -> usize {
        self.reference.frames_for(self.chunk_seconds) * self.reference.frame_size()
    }

    /// Growth step in frames of a stream with `specs`; at least one frame.
    pub fn chunk_frames(&self, specs: &Specs) -> usize {
        (self.chunk_bytes() / specs.frame_size().max(1)).max(1)
    }
}

/// A fully decoded stream held in one shared buffer.
///
/// Cloning is cheap; every [`reader`](Self::reader) is an independent cursor
/// over the same samples.
#[derive(Debug, Clone)]
pub struct StreamBuffer {
    buffer: Arc<Buffer>,
    specs: Specs,
}

impl StreamBuffer {
    /// Read `reader` to its end.
    pub fn new(reader: &mut dyn Reader) -> Result<Self> {
        Self::with_config(reader, StreamBufferConfig::default())
    }

    pub fn with_config(reader: &mut dyn Reader, config: StreamBufferConfig) -> Result<Self> {
        let specs = reader.specs();
        let channels = specs.samples_per_frame();
        let frame_size = specs.frame_size();
        let chunk = config.chunk_frames(&specs);

        let mut size = match reader.length() {
            length if length > 0 => length as usize + specs.frames_for(config.slack_seconds),
            _ => chunk,
        };

        let mut buffer = Buffer::new(0);
        let mut index = 0;

        loop {
            buffer.resize(size * frame_size, true);
            let wanted = size - index;
            let status = reader.read(wanted, &mut buffer.as_f32_mut()[index * channels..])?;
            index += status.frames;

            if status.eos {
                break;
            }
            if index == size {
                size += chunk;
                tracing::trace!(frames = index, size, "stream buffer grows");
            }
        }

        buffer.resize(index * frame_size, true);
        tracing::debug!(frames = index, bytes = buffer.size(), "stream materialized");

        Ok(Self {
            buffer: Arc::new(buffer),
            specs,
        })
    }

    /// Wrap samples that are already decoded.
    pub fn from_buffer(buffer: Arc<Buffer>, specs: Specs) -> Self {
        Self { buffer, specs }
    }

    /// A fresh cursor at position 0.
    pub fn reader(&self) -> BufferReader {
        BufferReader::new(Arc::clone(&self.buffer), self.specs)
    }

    pub fn specs(&self) -> Specs {
        self.specs
    }

    /// Length in frames.
    pub fn length(&self) -> usize {
        self.buffer.size() / self.specs.frame_size().max(1)
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }
}
