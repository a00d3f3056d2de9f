//! Reader over an in-memory [`Buffer`].

use crate::buffer::Buffer;
use crate::error::Result;
use crate::reader::{ReadStatus, Reader};
use crate::specs::Specs;
use std::sync::Arc;

/// Reads canonical float frames from a shared, immutable buffer.
///
/// Any number of readers can share one buffer; each keeps its own cursor.
#[derive(Debug, Clone)]
pub struct BufferReader {
    buffer: Arc<Buffer>,
    specs: Specs,
    position: usize,
}

impl BufferReader {
    pub fn new(buffer: Arc<Buffer>, specs: Specs) -> Self {
        Self {
            buffer,
            specs,
            position: 0,
        }
    }

    /// Total frames stored in the buffer.
    #[inline]
    pub fn frames(&self) -> usize {
        match self.specs.frame_size() {
            0 => 0,
            frame_size => self.buffer.size() / frame_size,
        }
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }
}

impl Reader for BufferReader {
    fn specs(&self) -> Specs {
        self.specs
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn length(&self) -> i64 {
        self.frames() as i64
    }

    fn position(&self) -> i64 {
        self.position as i64
    }

    fn seek(&mut self, position: i64) {
        self.position = position.clamp(0, self.frames() as i64) as usize;
    }

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        let channels = self.specs.samples_per_frame();
        let remaining = self.frames().saturating_sub(self.position);

        let status = if length > remaining {
            ReadStatus::end(remaining)
        } else {
            ReadStatus::full(length)
        };

        let start = self.position * channels;
        let count = status.frames * channels;
        buffer[..count].copy_from_slice(&self.buffer.as_f32()[start..start + count]);
        self.position += status.frames;

        Ok(status)
    }
}
