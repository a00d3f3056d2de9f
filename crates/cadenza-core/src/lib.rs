//! Pull-based audio streaming core.
//!
//! # Primary API
//!
//! - [`Reader`] / [`Writer`]: stream source and sink contracts
//! - [`Converter`]: sample encoding conversion between any two [`SampleFormat`]s
//! - [`Buffer`] / [`BufferReader`]: aligned memory and a reader over it
//! - [`Mixer`]: block mixing with volume ramps
//! - [`FileManager`]: file plugin registry
//!
//! Between processing stages every stream is interleaved `f32`; raw
//! encodings only appear at file and device boundaries.
//!
//! # Example
//!
//! ```ignore
//! use cadenza_core::*;
//!
//! let mut sine = SineReader::new(440.0, 48000.0);
//! let mut block = vec![0.0f32; 512];
//! let status = sine.read(512, &mut block)?;
//!
//! let mut mixer = Mixer::new(DeviceSpecs::new(Specs::mono(48000.0), SampleFormat::S16));
//! mixer.clear(512);
//! mixer.mix(&block, 0, status.frames, 0.5);
//! let mut out = vec![0u8; mixer.output_size()];
//! mixer.read(&mut out, 1.0);
//! ```

#[macro_use]
mod macros;

pub mod error;
pub use error::{Error, Result};

pub mod specs;
pub use specs::{DeviceSpecs, Sample, SampleFormat, Specs, StreamInfo};

pub mod buffer;
pub use buffer::{Buffer, ALIGNMENT};

pub mod convert;
pub use convert::Converter;

mod reader;
pub use reader::{ReadStatus, Reader};

mod writer;
pub use writer::Writer;

mod buffer_reader;
pub use buffer_reader::BufferReader;

mod generator;
pub use generator::{SilenceReader, SineReader};

pub mod mixer;
pub use mixer::Mixer;

pub mod file;
pub use file::{Codec, Container, FileInput, FileManager, FileOutput};
