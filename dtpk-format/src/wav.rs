//! WAV adapter (mono 16-bit PCM only)

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{DtpkError, Result, WavFormatKind};

/// Sample rate the engine is known to play correctly
pub const EXPECTED_SAMPLE_RATE: u32 = 44100;

/// PCM audio read from or written to a WAV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavAudio {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn wav_error(path: &Path, kind: WavFormatKind) -> DtpkError {
    DtpkError::WavFormat {
        file: file_name(path),
        kind,
    }
}

/// Check the RIFF and WAVE tags before handing the file to hound, so the two
/// cases report distinct errors
fn check_riff_tags(path: &Path) -> Result<()> {
    let mut tags = [0u8; 12];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < tags.len() {
        let n = file.read(&mut tags[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled < 4 || &tags[0..4] != b"RIFF" {
        return Err(wav_error(path, WavFormatKind::NotRiff));
    }
    if filled < 12 || &tags[8..12] != b"WAVE" {
        return Err(wav_error(path, WavFormatKind::NotWave));
    }
    Ok(())
}

/// Read a mono 16-bit PCM WAV file
///
/// A sample rate other than 44100 Hz is logged as a warning, not rejected.
pub fn read_mono_pcm16(path: &Path) -> Result<WavAudio> {
    check_riff_tags(path)?;

    let mut reader = hound::WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(io) => DtpkError::Io(io),
        hound::Error::Unsupported => wav_error(path, WavFormatKind::NotPcm),
        other => wav_error(path, WavFormatKind::Malformed(other.to_string())),
    })?;

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int {
        return Err(wav_error(path, WavFormatKind::NotPcm));
    }
    if spec.channels != 1 {
        return Err(wav_error(path, WavFormatKind::NotMono(spec.channels)));
    }
    if spec.sample_rate != EXPECTED_SAMPLE_RATE {
        tracing::warn!(
            "File '{}' does not have a sample rate of {} Hz ({} Hz)! Audio file may behave improperly.",
            file_name(path),
            EXPECTED_SAMPLE_RATE,
            spec.sample_rate
        );
    }
    if spec.bits_per_sample != 16 {
        return Err(wav_error(path, WavFormatKind::Not16Bit(spec.bits_per_sample)));
    }

    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| wav_error(path, WavFormatKind::Malformed(e.to_string())))?;

    Ok(WavAudio {
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Write a canonical 44-byte-header mono 16-bit PCM WAV file
pub fn write_mono_pcm16(path: &Path, sample_rate: u32, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let map_err = |e: hound::Error| match e {
        hound::Error::IoError(io) => DtpkError::Io(io),
        other => DtpkError::Io(std::io::Error::other(other.to_string())),
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(map_err)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(map_err)?;
    }
    writer.finalize().map_err(map_err)?;
    Ok(())
}
