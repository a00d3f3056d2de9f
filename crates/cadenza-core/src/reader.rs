//! Pull-model stream source contract.

use crate::error::Result;
use crate::specs::Specs;

/// Outcome of one [`Reader::read`] call.
///
/// `frames` may be smaller than requested only together with `eos`.
/// End of stream is signaled per call; a reader keeps answering reads
/// after it reported `eos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadStatus {
    pub frames: usize,
    pub eos: bool,
}

impl ReadStatus {
    #[inline]
    pub const fn new(frames: usize, eos: bool) -> Self {
        Self { frames, eos }
    }

    /// `frames` delivered, stream continues.
    #[inline]
    pub const fn full(frames: usize) -> Self {
        Self::new(frames, false)
    }

    /// `frames` delivered, then the stream ended.
    #[inline]
    pub const fn end(frames: usize) -> Self {
        Self::new(frames, true)
    }
}

/// A stateful cursor over a logical stream of interleaved float frames.
///
/// A single instance is not safe for concurrent use; independent chains
/// may run on separate threads.
pub trait Reader: Send {
    fn specs(&self) -> Specs;

    fn is_seekable(&self) -> bool;

    /// Length in frames; negative when unknown. May be an estimate.
    fn length(&self) -> i64;

    /// Current position in frames.
    fn position(&self) -> i64;

    /// Move to `position` (frames). Best effort: non-seekable readers may
    /// ignore the request or clamp it.
    fn seek(&mut self, position: i64);

    /// Read up to `length` frames into `buffer`, which must hold at least
    /// `length * channels` samples.
    ///
    /// Returns fewer frames only at end of stream. Errors are reserved for
    /// I/O failures of the underlying source.
    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus>;
}

impl<R: Reader + ?Sized> Reader for Box<R> {
    fn specs(&self) -> Specs {
        (**self).specs()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn length(&self) -> i64 {
        (**self).length()
    }

    fn position(&self) -> i64 {
        (**self).position()
    }

    fn seek(&mut self, position: i64) {
        (**self).seek(position)
    }

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        (**self).read(length, buffer)
    }
}
