//! Stream materialization and time-stretching.
//!
//! # Features
//!
//! - **Materialization**: [`StreamBuffer`] decodes a reader once and hands out
//!   independent cursors over the result
//! - **Time-stretching**: [`TimeStretchPitchScaleReader`] changes duration and
//!   pitch through any [`StretchEngine`], with a built-in granular engine
//!
//! # Example
//!
//! ```ignore
//! use cadenza_sampler::StreamBuffer;
//!
//! let mut decoded = files.create_reader("loop.wav")?;
//! let stream = StreamBuffer::new(&mut *decoded)?;
//!
//! // Play it twice, from two independent cursors
//! let first = stream.reader();
//! let second = stream.reader();
//! ```

mod stream_buffer;
pub use stream_buffer::{StreamBuffer, StreamBufferConfig};

pub mod time_stretch;
pub use time_stretch::{
    GrainSize, GranularConfig, GranularStretcher, StretchEngine, TimeStretchParams,
    TimeStretchPitchScaleReader,
};
