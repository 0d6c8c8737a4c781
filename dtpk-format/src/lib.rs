//! DTPK soundbank container format
//!
//! Builds and parses the `gcaxDTPK` audio containers used by GameCube-era
//! engines. Audio streams are stored as DSP-ADPCM, encoded and decoded through
//! the [`AdpcmCodec`] trait.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use dtpk_format::{ContainerReader, DspAdpcmCodec};
//!
//! let mut reader = ContainerReader::open(Path::new("BANK.DAT"))?;
//! let header = reader.read_header()?;
//! println!("{} audio files", header.entry_count);
//! reader.extract_all(&DspAdpcmCodec, Path::new("out"))?;
//! # Ok::<(), dtpk_format::DtpkError>(())
//! ```

pub mod align;
pub mod builder;
pub mod codec;
pub mod error;
pub mod export;
pub mod formats;
pub mod reader;
pub mod wav;

pub use builder::{AudioEntry, ContainerBuilder, ContainerLayout};
pub use codec::{AdpcmCodec, DspAdpcmCodec};
pub use error::{CodecError, DtpkError, Result, WavFormatKind};
pub use export::{export_directory, parse_file_identifier};
pub use formats::{CodecInfo, FileEntry, Template};
pub use reader::{ContainerHeader, ContainerReader, DecodedSound};

/// Entry indices are stored in single bytes
pub const MAX_ENTRIES: usize = 256;
