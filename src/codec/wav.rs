//! WAV framing
//!
//! Frames `RawSamples` into a RIFF/WAVE byte stream and parses it back.
//! Framing happens entirely in memory; nothing here touches the filesystem
//! except `probe_file`.

use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::codec::pcm::{PcmFormat, RawSamples};
use crate::error::{Result, SonoraError};

/// Header layout of a stream, as declared by the header alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub format: PcmFormat,
    /// Frames per channel
    pub sample_count: u64,
    /// Declared length of the data chunk in bytes
    pub data_len: u64,
    /// Bytes preceding the sample data
    pub header_len: u64,
    /// Whole stream length (`header_len + data_len`)
    pub total_len: u64,
}

impl ContainerInfo {
    /// Playable duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.sample_count as f64 / self.format.sample_rate as f64
    }
}

fn wav_spec(format: &PcmFormat) -> WavSpec {
    WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: SampleFormat::Int,
    }
}

fn hound_error(context: &str, e: hound::Error) -> SonoraError {
    match e {
        hound::Error::IoError(io) => SonoraError::Io(io),
        other => SonoraError::InvalidAudio {
            reason: format!("{}: {}", context, other),
        },
    }
}

/// Encode raw samples into a complete WAV byte stream
pub fn encode(raw: &RawSamples) -> Result<Vec<u8>> {
    let format = raw.format();
    let data_len = raw.byte_len() as usize;
    let mut cursor = Cursor::new(Vec::with_capacity(data_len + 64));

    {
        let mut writer = WavWriter::new(&mut cursor, wav_spec(&format))
            .map_err(|e| hound_error("Failed to write WAV header", e))?;

        match format.bits_per_sample {
            8 => {
                for &sample in raw.samples() {
                    writer
                        .write_sample(sample as i8)
                        .map_err(|e| hound_error("Failed to write sample", e))?;
                }
            }
            16 => {
                for &sample in raw.samples() {
                    writer
                        .write_sample(sample as i16)
                        .map_err(|e| hound_error("Failed to write sample", e))?;
                }
            }
            _ => {
                // 24-bit is stored as i32 in hound
                for &sample in raw.samples() {
                    writer
                        .write_sample(sample)
                        .map_err(|e| hound_error("Failed to write sample", e))?;
                }
            }
        }

        writer
            .finalize()
            .map_err(|e| hound_error("Failed to finalize WAV", e))?;
    }

    let bytes = cursor.into_inner();
    tracing::debug!(
        samples = raw.samples().len(),
        data_len,
        total_len = bytes.len(),
        "framed WAV container"
    );
    Ok(bytes)
}

fn open_reader<R: Read>(reader: R) -> Result<WavReader<R>> {
    let reader = WavReader::new(reader).map_err(|e| hound_error("Failed to parse WAV", e))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(SonoraError::InvalidAudio {
            reason: "only integer PCM is supported".to_string(),
        });
    }
    PcmFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample).validate()?;
    Ok(reader)
}

fn info_from_reader<R: Read>(reader: &WavReader<R>, total_len: u64) -> Result<ContainerInfo> {
    let spec = reader.spec();
    let format = PcmFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample);
    let sample_count = reader.duration() as u64;
    let data_len = reader.len() as u64 * format.bytes_per_sample() as u64;

    if data_len > total_len {
        return Err(SonoraError::InvalidAudio {
            reason: format!(
                "header declares {} data bytes but stream holds {}",
                data_len, total_len
            ),
        });
    }

    Ok(ContainerInfo {
        format,
        sample_count,
        data_len,
        header_len: total_len - data_len,
        total_len,
    })
}

/// Read the header of an in-memory stream without decoding samples
pub fn probe(bytes: &[u8]) -> Result<ContainerInfo> {
    let reader = open_reader(Cursor::new(bytes))?;
    info_from_reader(&reader, bytes.len() as u64)
}

/// Read the header of a stored container
pub fn probe_file(path: &Path) -> Result<ContainerInfo> {
    let file = std::fs::File::open(path)?;
    let total_len = file.metadata()?.len();
    let reader = open_reader(BufReader::new(file))?;
    info_from_reader(&reader, total_len)
}

/// Decode a WAV byte stream back into raw samples
pub fn decode(bytes: &[u8]) -> Result<RawSamples> {
    let mut reader = open_reader(Cursor::new(bytes))?;
    let info = info_from_reader(&reader, bytes.len() as u64)?;

    let samples = reader
        .samples::<i32>()
        .collect::<std::result::Result<Vec<i32>, _>>()
        .map_err(|e| hound_error("Failed to read samples", e))?;

    RawSamples::new(info.format, samples)
}
