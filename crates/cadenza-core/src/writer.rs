//! Push-model stream sink contract.

use crate::error::Result;
use crate::specs::DeviceSpecs;

/// A sink accepting interleaved float frames and storing them in its own
/// encoding.
pub trait Writer: Send {
    /// Channel count, rate and the encoding written to the destination.
    fn specs(&self) -> DeviceSpecs;

    /// Frames written so far.
    fn position(&self) -> i64;

    /// Write exactly `length` frames from `buffer`.
    fn write(&mut self, length: usize, buffer: &[f32]) -> Result<()>;

    /// Flush buffered data to the destination. Dropping a writer also
    /// finalizes it, but without a way to report errors.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: Writer + ?Sized> Writer for Box<W> {
    fn specs(&self) -> DeviceSpecs {
        (**self).specs()
    }

    fn position(&self) -> i64 {
        (**self).position()
    }

    fn write(&mut self, length: usize, buffer: &[f32]) -> Result<()> {
        (**self).write(length, buffer)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}
