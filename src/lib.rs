//! # Cadenza - Pull-based Audio Streaming
//!
//! Reader chains, sample format conversion, mixing and file I/O built from
//! modular subsystems.
//!
//! ## Architecture
//!
//! Cadenza is an umbrella crate that coordinates:
//! - **cadenza-core** - Buffers, conversion engine, Reader/Writer, Mixer, file registry
//! - **cadenza-dsp** - Effect readers (format conversion, echo)
//! - **cadenza-sampler** - Stream materialization and time-stretching
//! - **cadenza-export** - Reader-to-writer export and the WAV plugin
//!
//! ## Quick Start
//!
//! ```ignore
//! use cadenza::prelude::*;
//!
//! let files = FileManager::new();
//! cadenza::export::format::register_all(&files);
//!
//! // Decode, add an echo, write 16-bit PCM
//! let source = files.create_reader("voice.wav")?;
//! let mut echo = EchoReader::new(source, EchoParams::default().with_delay(0.3));
//!
//! let specs = DeviceSpecs::new(echo.specs(), SampleFormat::S16);
//! let mut out = FileWriter::create_writer(&files, "voice_echo.wav", specs, Container::Wav, Codec::Pcm, 0)?;
//! FileWriter::write_reader(&mut echo, &mut out, 0, 8192)?;
//! out.finalize()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - WAV file plugin
//! - `wav` - WAV input and output via hound

/// Re-export of cadenza-core for direct access
pub use cadenza_core as core;

pub use cadenza_core::{
    // Memory and encodings
    Buffer,
    BufferReader,
    Codec,
    Container,
    Converter,
    DeviceSpecs,
    // File registry
    FileInput,
    FileManager,
    FileOutput,
    Mixer,
    ReadStatus,
    // Streaming contracts
    Reader,
    Sample,
    SampleFormat,
    SilenceReader,
    SineReader,
    Specs,
    StreamInfo,
    Writer,
};

// Effect readers
pub use cadenza_dsp as dsp;

pub use cadenza_dsp::{ConverterReader, EchoParams, EchoReader};

// Materialization and time-stretch
pub use cadenza_sampler as sampler;

pub use cadenza_sampler::{
    GrainSize, GranularConfig, GranularStretcher, StreamBuffer, StreamBufferConfig,
    StretchEngine, TimeStretchParams, TimeStretchPitchScaleReader,
};

// Export
pub use cadenza_export as export;

pub use cadenza_export::{ExportError, FileWriter, WriteOptions};

#[cfg(feature = "wav")]
pub use cadenza_export::{export_wav, register_wav, WavInput, WavOutput};

mod error;

pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Error, Result};

    pub use crate::{
        BufferReader, Codec, Container, DeviceSpecs, FileManager, Mixer, ReadStatus, Reader,
        SampleFormat, SilenceReader, SineReader, Specs, Writer,
    };

    pub use crate::{ConverterReader, EchoParams, EchoReader};

    pub use crate::{
        GranularStretcher, StreamBuffer, TimeStretchParams, TimeStretchPitchScaleReader,
    };

    pub use crate::{FileWriter, WriteOptions};
}
