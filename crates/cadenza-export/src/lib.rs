//! # Cadenza Export
//!
//! Drives reader chains into file writers and ships the built-in file plugins.
//!
//! ## Example
//!
//! ```ignore
//! use cadenza_core::{Codec, Container, DeviceSpecs, FileManager, SampleFormat};
//! use cadenza_export::{format, FileWriter};
//!
//! let files = FileManager::new();
//! format::register_all(&files);
//!
//! let mut reader = files.create_reader("input.wav")?;
//! let specs = DeviceSpecs::new(reader.specs(), SampleFormat::S24);
//! let mut writer = FileWriter::create_writer(&files, "output.wav", specs, Container::Wav, Codec::Pcm, 0)?;
//!
//! FileWriter::write_reader(&mut reader, &mut writer, 0, 8192)?;
//! writer.finalize()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default) - WAV input and output via hound

pub mod error;
pub mod format;

mod file_writer;
mod options;

pub use error::{ExportError, Result};
pub use file_writer::FileWriter;
pub use options::WriteOptions;

#[cfg(feature = "wav")]
pub use format::{export_wav, register_wav, WavInput, WavOutput};
