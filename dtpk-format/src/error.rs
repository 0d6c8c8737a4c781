//! Error types for soundbank export and extraction

use std::path::PathBuf;

use dtpk_adpcm::AdpcmError;

/// Why a WAV file was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WavFormatKind {
    #[error("needs to be encoded in the RIFF format")]
    NotRiff,
    #[error("this is not a .wav file")]
    NotWave,
    #[error("not formatted using PCM")]
    NotPcm,
    #[error("not in mono channel ({0} channels)")]
    NotMono(u16),
    #[error("not encoded in signed 16-bit ({0}-bit)")]
    Not16Bit(u16),
    #[error("malformed WAV data: {0}")]
    Malformed(String),
}

/// Errors raised by the ADPCM codec boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The codec could not be loaded or initialized
    #[error("ADPCM codec unavailable: {0}")]
    Unavailable(String),

    /// The codec rejected the data it was given
    #[error("ADPCM decoding failed: {0}")]
    Decode(#[from] AdpcmError),
}

/// Errors that can occur while exporting, extracting or inspecting soundbanks
#[derive(Debug, thiserror::Error)]
pub enum DtpkError {
    #[error("Input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Input path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Output path is an already existing directory: {}", .0.display())]
    OutputIsDirectory(PathBuf),

    #[error("Output path is an already existing file: {}", .0.display())]
    OutputIsFile(PathBuf),

    #[error("Invalid file identifier provided: {0:?}")]
    InvalidIdentifier(String),

    #[error("The file identifier has to be a 16-bit value, got {0:#X}")]
    IdentifierOutOfRange(u64),

    /// A WAV name is missing its `<index>_` ordering prefix
    #[error(
        "WAV file {0:?} has an incorrect filename format. \
         Did you specify the order of the files in the filename (\"0_name.wav\")?"
    )]
    FilenameOrder(String),

    #[error("The given input folder has no .wav files in it: {}", .0.display())]
    NoInput(PathBuf),

    #[error("A soundbank needs at least one audio file")]
    NoEntries,

    #[error("Invalid WAV file {file}: {kind}")]
    WavFormat { file: String, kind: WavFormatKind },

    #[error("Supplied input file is an invalid DTPK soundbank file: {0}")]
    ContainerFormat(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Entry indices are stored in single bytes
    #[error("Too many audio files: {0} (at most {max})", max = crate::MAX_ENTRIES)]
    TooManyEntries(usize),

    #[error("Sample rate of {file} does not fit the 16-bit field: {rate} Hz")]
    SampleRateOutOfRange { file: String, rate: u32 },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DtpkError {
    /// Process exit code for this error
    ///
    /// - 1: path, identifier, ordering and other general errors
    /// - 2: WAV or container format validation
    /// - 3: codec failures
    pub fn exit_code(&self) -> u8 {
        match self {
            DtpkError::WavFormat { .. }
            | DtpkError::ContainerFormat(_)
            | DtpkError::SampleRateOutOfRange { .. } => 2,
            DtpkError::Codec(_) => 3,
            _ => 1,
        }
    }
}

/// Result alias for soundbank operations
pub type Result<T> = std::result::Result<T, DtpkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DtpkError::NoInput(PathBuf::from("x")).exit_code(), 1);
        assert_eq!(DtpkError::IdentifierOutOfRange(0x1FFFF).exit_code(), 1);
        assert_eq!(DtpkError::FilenameOrder("sound.wav".into()).exit_code(), 1);
        assert_eq!(
            DtpkError::WavFormat {
                file: "a.wav".into(),
                kind: WavFormatKind::NotMono(2)
            }
            .exit_code(),
            2
        );
        assert_eq!(DtpkError::ContainerFormat("bad magic".into()).exit_code(), 2);
        assert_eq!(
            DtpkError::Codec(CodecError::Unavailable("missing".into())).exit_code(),
            3
        );
    }

    #[test]
    fn test_messages() {
        let err = DtpkError::IdentifierOutOfRange(0x1FFFF);
        assert_eq!(
            err.to_string(),
            "The file identifier has to be a 16-bit value, got 0x1FFFF"
        );

        let err = DtpkError::WavFormat {
            file: "0_a.wav".into(),
            kind: WavFormatKind::Not16Bit(8),
        };
        assert_eq!(
            err.to_string(),
            "Invalid WAV file 0_a.wav: not encoded in signed 16-bit (8-bit)"
        );
    }
}
