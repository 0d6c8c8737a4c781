//! Soundbank summary report

use std::fmt;
use std::path::Path;

use dtpk_format::{ContainerHeader, ContainerReader, Result};

/// Everything printed by `dtpk info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoReport {
    pub file_name: String,
    pub header: ContainerHeader,
}

impl InfoReport {
    /// Read the header of the soundbank at `path`
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = ContainerReader::open(path)?;
        let header = reader.read_header()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { file_name, header })
    }
}

fn hex_upper(value: u32) -> String {
    format!("0x{:X}", value)
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:-^40}", " General Info ")?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(
            f,
            "File Identifier: {}",
            hex_upper(self.header.file_identifier as u32)
        )?;
        writeln!(f, "Audio File Count: {}", self.header.entry_count)?;
        writeln!(f)?;
        writeln!(f, "{:-^40}", " Technical Details ")?;
        writeln!(f, "Full File Size: {}", hex_upper(self.header.full_file_size))?;
        writeln!(
            f,
            "File Entries Offset: {}",
            hex_upper(self.header.file_entries_offset)
        )?;
        writeln!(
            f,
            "Audio Data Offset: {}",
            hex_upper(self.header.audio_data_offset)
        )?;
        write!(f, "Audio Data Size: {}", hex_upper(self.header.audio_data_size))
    }
}
