//! WAV file plugin (uses hound).

use crate::error::Result as ExportResult;
use crate::file_writer::FileWriter;
use crate::options::WriteOptions;
use cadenza_core::{
    Buffer, Codec, Container, Converter, DeviceSpecs, Error, FileInput, FileManager, FileOutput,
    ReadStatus, Reader, Result, SampleFormat, Specs, StreamInfo, Writer,
};
use hound::{WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

fn wav_error(e: hound::Error) -> Error {
    match e {
        hound::Error::IoError(io) => Error::Io(io),
        hound::Error::Unsupported => Error::UnsupportedFormat("wav encoding".into()),
        other => Error::file(other.to_string()),
    }
}

/// Sample encoding of a WAV stream, if representable.
fn encoding_of(spec: &WavSpec) -> Option<SampleFormat> {
    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => Some(SampleFormat::U8),
        (hound::SampleFormat::Int, 16) => Some(SampleFormat::S16),
        (hound::SampleFormat::Int, 24) => Some(SampleFormat::S24),
        (hound::SampleFormat::Int, 32) => Some(SampleFormat::S32),
        (hound::SampleFormat::Float, 32) => Some(SampleFormat::Float32),
        _ => None,
    }
}

fn wav_spec(specs: DeviceSpecs) -> hound::Result<WavSpec> {
    if !specs.specs.is_valid() {
        return Err(hound::Error::Unsupported);
    }
    let sample_format = match specs.format {
        SampleFormat::Float32 => hound::SampleFormat::Float,
        SampleFormat::Float64 => return Err(hound::Error::Unsupported),
        _ => hound::SampleFormat::Int,
    };
    Ok(WavSpec {
        channels: specs.channels(),
        sample_rate: specs.rate().round() as u32,
        bits_per_sample: specs.format.bits(),
        sample_format,
    })
}

/// Appends up to `samples` samples as `S`, encoded into `staging`.
///
/// On a decode error the samples staged so far stay in `staging`.
fn stage<R: Read, S: hound::Sample>(
    wav: &mut WavReader<R>,
    samples: usize,
    staging: &mut Vec<u8>,
    encode: impl Fn(S, &mut Vec<u8>),
) -> hound::Result<()> {
    for sample in wav.samples::<S>().take(samples) {
        encode(sample?, staging);
    }
    Ok(())
}

/// A packed host-order 24-bit sample, sign-extended.
fn s24_value(bytes: &[u8]) -> i32 {
    let word = if cfg!(target_endian = "little") {
        [0, bytes[0], bytes[1], bytes[2]]
    } else {
        [bytes[0], bytes[1], bytes[2], 0]
    };
    i32::from_ne_bytes(word) >> 8
}

/// Shared file bytes readable through a [`Cursor`].
struct SharedBytes(Arc<Buffer>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Decodes a WAV stream into canonical float frames.
pub struct WavFileReader<R> {
    wav: WavReader<R>,
    specs: Specs,
    format: SampleFormat,
    // 24-bit samples are staged left-aligned as s32
    converter: Converter,
    staging: Vec<u8>,
    length: usize,
    position: usize,
}

impl WavFileReader<std::io::BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> hound::Result<Self> {
        Self::new(WavReader::open(path)?)
    }
}

impl<R: Read> WavFileReader<R> {
    pub fn new(wav: WavReader<R>) -> hound::Result<Self> {
        let spec = wav.spec();
        let format = encoding_of(&spec).ok_or(hound::Error::Unsupported)?;
        let staging = match format {
            SampleFormat::S24 => SampleFormat::S32,
            other => other,
        };

        Ok(Self {
            length: wav.duration() as usize,
            specs: Specs::new(spec.sample_rate as f64, spec.channels),
            format,
            converter: Converter::to_float(staging),
            staging: Vec::new(),
            position: 0,
            wav,
        })
    }

    /// Encoding stored in the file.
    pub fn format(&self) -> SampleFormat {
        self.format
    }
}

impl<R: Read + Seek + Send> Reader for WavFileReader<R> {
    fn specs(&self) -> Specs {
        self.specs
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn length(&self) -> i64 {
        self.length as i64
    }

    fn position(&self) -> i64 {
        self.position as i64
    }

    fn seek(&mut self, position: i64) {
        let position = position.clamp(0, self.length as i64) as usize;
        match self.wav.seek(position as u32) {
            Ok(()) => self.position = position,
            Err(err) => tracing::warn!(position, error = %err, "wav seek failed"),
        }
    }

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        let channels = self.specs.samples_per_frame();
        let frames = length.min(self.length - self.position);
        let samples = frames * channels;

        self.staging.clear();
        let staging = &mut self.staging;
        let staged = match self.format {
            SampleFormat::U8 => stage(&mut self.wav, samples, staging, |s: i32, out| {
                out.push((s + 128) as u8)
            }),
            SampleFormat::S16 => stage(&mut self.wav, samples, staging, |s: i32, out| {
                out.extend_from_slice(&(s as i16).to_ne_bytes())
            }),
            SampleFormat::S24 => stage(&mut self.wav, samples, staging, |s: i32, out| {
                out.extend_from_slice(&(s << 8).to_ne_bytes())
            }),
            SampleFormat::S32 => stage(&mut self.wav, samples, staging, |s: i32, out| {
                out.extend_from_slice(&s.to_ne_bytes())
            }),
            _ => stage(&mut self.wav, samples, staging, |s: f32, out| {
                out.extend_from_slice(&s.to_ne_bytes())
            }),
        };

        let decoded = self.staging.len() / self.converter.source_format().sample_size();
        self.converter.convert(
            bytemuck::cast_slice_mut(&mut buffer[..decoded]),
            &self.staging,
            decoded,
        );

        let read = decoded / channels;
        self.position += read;
        if let Err(err) = staged {
            tracing::warn!(position = self.position, error = %err, "wav decode failed");
            return Err(wav_error(err));
        }
        Ok(ReadStatus::new(read, read < length))
    }
}

/// Encodes canonical float frames into a WAV file.
pub struct WavFileWriter {
    wav: Option<WavWriter<BufWriter<File>>>,
    specs: DeviceSpecs,
    converter: Converter,
    staging: Vec<u8>,
    position: usize,
}

impl WavFileWriter {
    pub fn create(path: impl AsRef<Path>, specs: DeviceSpecs) -> hound::Result<Self> {
        let wav = WavWriter::create(path, wav_spec(specs)?)?;
        Ok(Self {
            wav: Some(wav),
            specs,
            converter: Converter::from_float(specs.format),
            staging: Vec::new(),
            position: 0,
        })
    }

    /// Flush and patch the header. Later writes fail.
    pub fn finish(&mut self) -> hound::Result<()> {
        match self.wav.take() {
            Some(wav) => wav.finalize(),
            None => Ok(()),
        }
    }

    fn encode(&mut self, length: usize, buffer: &[f32]) -> hound::Result<()> {
        let Some(wav) = self.wav.as_mut() else {
            return Err(hound::Error::IoError(std::io::Error::other(
                "wav writer already finalized",
            )));
        };
        let samples = length * self.specs.channels() as usize;
        let format = self.specs.format;

        if format == SampleFormat::Float32 {
            for &sample in &buffer[..samples] {
                wav.write_sample(sample)?;
            }
            return Ok(());
        }

        self.staging.resize(samples * format.sample_size(), 0);
        self.converter
            .convert(&mut self.staging, bytemuck::cast_slice(&buffer[..samples]), samples);

        match format {
            SampleFormat::U8 => {
                for &byte in &self.staging {
                    wav.write_sample((byte as i16 - 128) as i8)?;
                }
            }
            SampleFormat::S16 => {
                for bytes in self.staging.chunks_exact(2) {
                    wav.write_sample(i16::from_ne_bytes([bytes[0], bytes[1]]))?;
                }
            }
            SampleFormat::S24 => {
                for bytes in self.staging.chunks_exact(3) {
                    wav.write_sample(s24_value(bytes))?;
                }
            }
            _ => {
                for bytes in self.staging.chunks_exact(4) {
                    wav.write_sample(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))?;
                }
            }
        }
        Ok(())
    }
}

impl Writer for WavFileWriter {
    fn specs(&self) -> DeviceSpecs {
        self.specs
    }

    fn position(&self) -> i64 {
        self.position as i64
    }

    fn write(&mut self, length: usize, buffer: &[f32]) -> Result<()> {
        self.encode(length, buffer).map_err(wav_error)?;
        self.position += length;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finish().map_err(wav_error)
    }
}

/// WAV decoder plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavInput;

impl FileInput for WavInput {
    fn name(&self) -> &str {
        "wav"
    }

    fn create_reader(&self, path: &Path) -> Result<Box<dyn Reader>> {
        let reader = WavFileReader::open(path).map_err(wav_error)?;
        Ok(Box::new(reader))
    }

    fn create_reader_from_buffer(&self, buffer: Arc<Buffer>) -> Result<Box<dyn Reader>> {
        let wav = WavReader::new(Cursor::new(SharedBytes(buffer))).map_err(wav_error)?;
        let reader = WavFileReader::new(wav).map_err(wav_error)?;
        Ok(Box::new(reader))
    }

    fn query_streams(&self, path: &Path) -> Result<Vec<StreamInfo>> {
        let reader = WavFileReader::open(path).map_err(wav_error)?;
        let specs = reader.specs();
        Ok(vec![StreamInfo {
            start: 0.0,
            duration: reader.length as f64 / specs.rate,
            specs: DeviceSpecs::new(specs, reader.format()),
        }])
    }
}

/// WAV (PCM) encoder plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavOutput;

impl FileOutput for WavOutput {
    fn name(&self) -> &str {
        "wav"
    }

    fn create_writer(
        &self,
        path: &Path,
        specs: DeviceSpecs,
        container: Container,
        codec: Codec,
        _bitrate: u32,
    ) -> Result<Box<dyn Writer>> {
        if container != Container::Wav || codec != Codec::Pcm {
            return Err(Error::UnsupportedFormat(format!("{container} / {codec}")));
        }
        let writer = WavFileWriter::create(path, specs).map_err(wav_error)?;
        Ok(Box::new(writer))
    }
}

/// Register the WAV input and output plugins.
pub fn register_wav(manager: &FileManager) {
    manager.register_input(WavInput);
    manager.register_output(WavOutput);
}

/// Write `reader` to a WAV file at `path` in `format`.
///
/// Returns the number of frames written.
pub fn export_wav(
    reader: &mut dyn Reader,
    path: impl AsRef<Path>,
    format: SampleFormat,
    options: &WriteOptions,
) -> ExportResult<usize> {
    let specs = DeviceSpecs::new(reader.specs(), format);
    let mut writer = WavFileWriter::create(path, specs)?;
    let frames = FileWriter::write_with_options(reader, &mut writer, options)?;
    writer.finish()?;
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use cadenza_core::{BufferReader, SineReader};
    use tempfile::tempdir;

    const RAMP: [f32; 8] = [0.0, 0.5, -0.5, 0.25, -0.25, 0.999, -1.0, 0.125];

    fn ramp_reader(channels: u16) -> BufferReader {
        let mut buffer = Buffer::with_samples(RAMP.len());
        buffer.as_f32_mut().copy_from_slice(&RAMP);
        BufferReader::new(Arc::new(buffer), Specs::new(8000.0, channels))
    }

    #[test]
    fn test_pcm_formats_survive_a_file() {
        let dir = tempdir().unwrap();

        for format in [
            SampleFormat::U8,
            SampleFormat::S16,
            SampleFormat::S24,
            SampleFormat::S32,
            SampleFormat::Float32,
        ] {
            let path = dir.path().join(format!("ramp_{format}.wav"));
            let specs = DeviceSpecs::new(Specs::stereo(8000.0), format);
            let mut writer = WavOutput
                .create_writer(&path, specs, Container::Wav, Codec::Pcm, 0)
                .unwrap();
            writer.write(4, &RAMP).unwrap();
            assert_eq!(writer.position(), 4);
            writer.finalize().unwrap();

            let mut reader = WavInput.create_reader(&path).unwrap();
            assert_eq!(reader.specs(), Specs::stereo(8000.0));
            assert_eq!(reader.length(), 4);

            let mut out = [0.0f32; 8];
            let status = reader.read(4, &mut out).unwrap();
            assert_eq!(status, ReadStatus::full(4));

            let tolerance = (2.0 / (1u64 << (format.bits() - 1)) as f32).max(1e-6);
            for (got, want) in out.iter().zip(RAMP) {
                assert!(
                    (got - want).abs() <= tolerance,
                    "{format}: {got} vs {want}"
                );
            }
        }
    }

    #[test]
    fn test_reads_past_end_signal_eos() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.wav");
        let frames = export_wav(
            &mut ramp_reader(1),
            &path,
            SampleFormat::S16,
            &WriteOptions::default(),
        )
        .unwrap();
        assert_eq!(frames, 8);

        let mut reader = WavInput.create_reader(&path).unwrap();
        let mut out = [0.0f32; 16];
        assert_eq!(reader.read(5, &mut out).unwrap(), ReadStatus::full(5));
        assert_eq!(reader.read(5, &mut out).unwrap(), ReadStatus::end(3));
        assert_eq!(reader.position(), 8);
        assert_eq!(reader.read(5, &mut out).unwrap(), ReadStatus::end(0));
    }

    #[test]
    fn test_truncated_data_keeps_position_in_step() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("truncated.wav");
        let mut source = SineReader::new(100.0, 8000.0);
        let options = WriteOptions::default().with_length(100);
        export_wav(&mut source, &path, SampleFormat::S16, &options).unwrap();

        // Drop the last 50 of 100 two-byte samples; the header still says 100
        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        let size = file.metadata().unwrap().len();
        file.set_len(size - 100).unwrap();
        drop(file);

        let mut reader = WavInput.create_reader(&path).unwrap();
        assert_eq!(reader.length(), 100);

        let mut out = [0.0f32; 100];
        assert!(reader.read(100, &mut out).is_err());
        assert_eq!(reader.position(), 50);

        let mut expected = [0.0f32; 50];
        SineReader::new(100.0, 8000.0).read(50, &mut expected).unwrap();
        for (got, want) in out[..50].iter().zip(expected) {
            assert!((got - want).abs() <= 2.0 / 32767.0);
        }
    }

    #[test]
    fn test_seek() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seek.wav");
        export_wav(
            &mut ramp_reader(1),
            &path,
            SampleFormat::Float32,
            &WriteOptions::default(),
        )
        .unwrap();

        let mut reader = WavInput.create_reader(&path).unwrap();
        reader.seek(5);
        assert_eq!(reader.position(), 5);
        let mut out = [0.0f32; 1];
        reader.read(1, &mut out).unwrap();
        assert_eq!(out[0], RAMP[5]);

        reader.seek(100);
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_reader_from_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.wav");
        export_wav(
            &mut ramp_reader(2),
            &path,
            SampleFormat::Float32,
            &WriteOptions::default(),
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mut buffer = Buffer::new(bytes.len());
        buffer.as_bytes_mut().copy_from_slice(&bytes);

        let mut reader = WavInput.create_reader_from_buffer(Arc::new(buffer)).unwrap();
        let mut out = [0.0f32; 8];
        assert_eq!(reader.read(4, &mut out).unwrap(), ReadStatus::full(4));
        assert_eq!(out, RAMP);
    }

    #[test]
    fn test_query_streams() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sine.wav");
        let mut sine = SineReader::new(440.0, 8000.0);
        let options = WriteOptions::default().with_length(4000);
        export_wav(&mut sine, &path, SampleFormat::S24, &options).unwrap();

        let streams = WavInput.query_streams(&path).unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].start, 0.0);
        assert!((streams[0].duration - 0.5).abs() < 1e-12);
        assert_eq!(
            streams[0].specs,
            DeviceSpecs::new(Specs::mono(8000.0), SampleFormat::S24)
        );
    }

    #[test]
    fn test_output_rejects_other_requests() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.wav");
        let specs = DeviceSpecs::new(Specs::mono(8000.0), SampleFormat::S16);

        assert!(WavOutput
            .create_writer(&path, specs, Container::Ogg, Codec::Vorbis, 128_000)
            .is_err());
        assert!(WavOutput
            .create_writer(&path, specs, Container::Wav, Codec::Flac, 0)
            .is_err());

        let doubles = DeviceSpecs::new(Specs::mono(8000.0), SampleFormat::Float64);
        let err = WavOutput
            .create_writer(&path, doubles, Container::Wav, Codec::Pcm, 0)
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_export_rejects_float64() {
        let dir = tempdir().unwrap();
        let err = export_wav(
            &mut ramp_reader(1),
            dir.path().join("f64.wav"),
            SampleFormat::Float64,
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_input_rejects_non_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noise.txt");
        std::fs::write(&path, b"definitely not RIFF").unwrap();
        assert!(WavInput.create_reader(&path).is_err());
        assert!(WavInput.query_streams(dir.path().join("missing.wav").as_path()).is_err());
    }

    #[test]
    fn test_registered_through_manager() {
        let manager = FileManager::new();
        register_wav(&manager);
        assert_eq!(manager.input_count(), 1);
        assert_eq!(manager.output_count(), 1);

        let dir = tempdir().unwrap();
        let path = dir.path().join("managed.wav");
        let specs = DeviceSpecs::new(Specs::mono(8000.0), SampleFormat::S16);
        let mut writer = manager
            .create_writer(&path, specs, Container::Wav, Codec::Pcm, 0)
            .unwrap();
        FileWriter::write_reader(&mut ramp_reader(1), &mut writer, 0, 3).unwrap();
        writer.finalize().unwrap();

        let reader = manager.create_reader(&path).unwrap();
        assert_eq!(reader.length(), 8);
    }
}
