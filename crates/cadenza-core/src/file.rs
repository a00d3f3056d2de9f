//! File plugin registry.
//!
//! Codec plugins register [`FileInput`]s and [`FileOutput`]s with a
//! [`FileManager`]. Lookups try plugins in registration order and the first
//! one that succeeds wins; a plugin error only means "cannot handle this".
//!
//! Register every plugin before handing the manager to concurrent users.
//! Clones share one registry.

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::specs::{DeviceSpecs, StreamInfo};
use crate::writer::Writer;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Container selector, forwarded unchanged to output plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    Ac3,
    Flac,
    Matroska,
    Mp2,
    Mp3,
    Ogg,
    Wav,
    Aac,
}

/// Codec selector, forwarded unchanged to output plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Codec {
    Aac,
    Ac3,
    Flac,
    Mp2,
    Mp3,
    Pcm,
    Vorbis,
    Opus,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Container::Ac3 => "ac3",
            Container::Flac => "flac",
            Container::Matroska => "matroska",
            Container::Mp2 => "mp2",
            Container::Mp3 => "mp3",
            Container::Ogg => "ogg",
            Container::Wav => "wav",
            Container::Aac => "aac",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Codec::Aac => "aac",
            Codec::Ac3 => "ac3",
            Codec::Flac => "flac",
            Codec::Mp2 => "mp2",
            Codec::Mp3 => "mp3",
            Codec::Pcm => "pcm",
            Codec::Vorbis => "vorbis",
            Codec::Opus => "opus",
        };
        f.write_str(name)
    }
}

/// A decoder plugin.
pub trait FileInput: Send + Sync {
    /// Short plugin name for diagnostics.
    fn name(&self) -> &str;

    fn create_reader(&self, path: &Path) -> Result<Box<dyn Reader>>;

    /// Decode from an in-memory copy of a file.
    fn create_reader_from_buffer(&self, buffer: Arc<Buffer>) -> Result<Box<dyn Reader>>;

    /// Describe the decodable streams inside a file.
    fn query_streams(&self, path: &Path) -> Result<Vec<StreamInfo>>;
}

/// An encoder plugin.
pub trait FileOutput: Send + Sync {
    fn name(&self) -> &str;

    fn create_writer(
        &self,
        path: &Path,
        specs: DeviceSpecs,
        container: Container,
        codec: Codec,
        bitrate: u32,
    ) -> Result<Box<dyn Writer>>;
}

#[derive(Default)]
struct Plugins {
    inputs: Vec<Arc<dyn FileInput>>,
    outputs: Vec<Arc<dyn FileOutput>>,
}

/// Ordered registry of file plugins.
#[derive(Clone, Default)]
pub struct FileManager {
    plugins: Arc<RwLock<Plugins>>,
}

impl FileManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_input(&self, input: impl FileInput + 'static) {
        tracing::debug!(plugin = input.name(), "registered file input");
        self.plugins.write().inputs.push(Arc::new(input));
    }

    pub fn register_output(&self, output: impl FileOutput + 'static) {
        tracing::debug!(plugin = output.name(), "registered file output");
        self.plugins.write().outputs.push(Arc::new(output));
    }

    pub fn input_count(&self) -> usize {
        self.plugins.read().inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.plugins.read().outputs.len()
    }

    /// Open `path` with the first input plugin that accepts it.
    pub fn create_reader(&self, path: impl AsRef<Path>) -> Result<Box<dyn Reader>> {
        let path = path.as_ref();
        self.first_input(&path.display().to_string(), |input| input.create_reader(path))
    }

    /// Decode an in-memory file with the first input plugin that accepts it.
    pub fn create_reader_from_buffer(&self, buffer: Arc<Buffer>) -> Result<Box<dyn Reader>> {
        self.first_input("<memory buffer>", |input| {
            input.create_reader_from_buffer(Arc::clone(&buffer))
        })
    }

    /// List the streams of `path` using the first input plugin that accepts it.
    pub fn query_streams(&self, path: impl AsRef<Path>) -> Result<Vec<StreamInfo>> {
        let path = path.as_ref();
        self.first_input(&path.display().to_string(), |input| input.query_streams(path))
    }

    /// Create a writer with the first output plugin that accepts the request.
    pub fn create_writer(
        &self,
        path: impl AsRef<Path>,
        specs: DeviceSpecs,
        container: Container,
        codec: Codec,
        bitrate: u32,
    ) -> Result<Box<dyn Writer>> {
        let path = path.as_ref();
        let outputs = self.plugins.read().outputs.clone();

        for output in &outputs {
            match output.create_writer(path, specs, container, codec, bitrate) {
                Ok(writer) => {
                    tracing::debug!(plugin = output.name(), path = %path.display(), "file output accepted");
                    return Ok(writer);
                }
                Err(err) => {
                    tracing::debug!(plugin = output.name(), error = %err, "file output rejected");
                }
            }
        }

        tracing::warn!(
            path = %path.display(),
            %container,
            %codec,
            plugins = outputs.len(),
            "no file output could write"
        );
        Err(Error::FileNotFound(format!(
            "{} ({} / {})",
            path.display(),
            container,
            codec
        )))
    }

    fn first_input<T>(
        &self,
        what: &str,
        mut attempt: impl FnMut(&dyn FileInput) -> Result<T>,
    ) -> Result<T> {
        let inputs = self.plugins.read().inputs.clone();

        for input in &inputs {
            match attempt(input.as_ref()) {
                Ok(value) => {
                    tracing::debug!(plugin = input.name(), source = what, "file input accepted");
                    return Ok(value);
                }
                Err(err) => {
                    tracing::debug!(plugin = input.name(), error = %err, "file input rejected");
                }
            }
        }

        tracing::warn!(source = what, plugins = inputs.len(), "no file input could read");
        Err(Error::FileNotFound(what.to_string()))
    }
}

impl fmt::Debug for FileManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins = self.plugins.read();
        f.debug_struct("FileManager")
            .field(
                "inputs",
                &plugins.inputs.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "outputs",
                &plugins.outputs.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
