//! Export options.

/// Settings for driving a reader into writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Frames moved per read/write cycle (default: 8192)
    pub buffer_size: usize,
    /// Frames to write; `None` writes until end of stream
    pub length: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            length: None,
        }
    }
}

impl WriteOptions {
    pub fn with_buffer_size(mut self, frames: usize) -> Self {
        self.buffer_size = frames;
        self
    }

    pub fn with_length(mut self, frames: usize) -> Self {
        self.length = Some(frames);
        self
    }

    /// Length in the `0 = until end of stream` convention.
    pub(crate) fn length_or_zero(&self) -> usize {
        self.length.unwrap_or(0)
    }
}
