//! Static header template
//!
//! The header region and the audio info records contain fields whose meaning
//! is unknown; they are copied verbatim from a template. A template file uses
//! the `Template.dat` layout:
//!
//! ```text
//! 0x000: header prefix      0x278 bytes (starts with "gcaxDTPK")
//! 0x300: audio info header  0x30 bytes
//! 0x330: audio info record  0x40 bytes
//! ```
//!
//! Without a template file the built-in default is used: the magic followed by
//! zeroed static fields.

use std::path::Path;

use super::{DTPK_MAGIC, audio_info, header};
use crate::{DtpkError, Result};

/// Offset of the audio info header inside a template file
pub const TEMPLATE_INFO_HEADER_OFFSET: usize = 0x300;

/// Offset of the audio info record inside a template file
pub const TEMPLATE_INFO_RECORD_OFFSET: usize = 0x330;

/// Smallest valid template file
pub const TEMPLATE_FILE_SIZE: usize = TEMPLATE_INFO_RECORD_OFFSET + audio_info::RECORD_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Header bytes up to the file identifier
    pub header: [u8; header::FILE_IDENTIFIER],
    /// Audio info table header
    pub info_header: [u8; audio_info::HEADER_SIZE],
    /// Audio info record, repeated per entry
    pub info_record: [u8; audio_info::RECORD_SIZE],
}

impl Default for Template {
    fn default() -> Self {
        let mut header = [0u8; header::FILE_IDENTIFIER];
        header[..DTPK_MAGIC.len()].copy_from_slice(DTPK_MAGIC);
        Self {
            header,
            info_header: [0; audio_info::HEADER_SIZE],
            info_record: [0; audio_info::RECORD_SIZE],
        }
    }
}

impl Template {
    /// Parse a template from `Template.dat` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < TEMPLATE_FILE_SIZE {
            return Err(DtpkError::InvalidTemplate(format!(
                "{} bytes, expected at least {}",
                bytes.len(),
                TEMPLATE_FILE_SIZE
            )));
        }
        if !bytes.starts_with(DTPK_MAGIC) {
            return Err(DtpkError::InvalidTemplate(
                "missing gcaxDTPK magic".to_string(),
            ));
        }

        let mut info_header = [0u8; audio_info::HEADER_SIZE];
        info_header.copy_from_slice(
            &bytes[TEMPLATE_INFO_HEADER_OFFSET..TEMPLATE_INFO_HEADER_OFFSET + audio_info::HEADER_SIZE],
        );
        let mut info_record = [0u8; audio_info::RECORD_SIZE];
        info_record.copy_from_slice(&bytes[TEMPLATE_INFO_RECORD_OFFSET..TEMPLATE_FILE_SIZE]);

        let mut prefix = [0u8; header::FILE_IDENTIFIER];
        prefix.copy_from_slice(&bytes[..header::FILE_IDENTIFIER]);

        Ok(Self {
            header: prefix,
            info_header,
            info_record,
        })
    }

    /// Load a template file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            DtpkError::InvalidTemplate(msg) => {
                DtpkError::InvalidTemplate(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load `path` if given, otherwise the built-in default
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading template {:?}", path);
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_file() -> Vec<u8> {
        let mut bytes = vec![0u8; TEMPLATE_FILE_SIZE];
        bytes[..8].copy_from_slice(DTPK_MAGIC);
        bytes[0x20] = 0xAA;
        bytes[0x277] = 0xBB;
        bytes[0x278] = 0xCC; // beyond the header prefix, ignored
        bytes[TEMPLATE_INFO_HEADER_OFFSET] = 0x11;
        bytes[TEMPLATE_INFO_RECORD_OFFSET + 1] = 0x22;
        bytes
    }

    #[test]
    fn test_default_template() {
        let template = Template::default();
        assert_eq!(template.header.len(), 0x278);
        assert!(template.header.starts_with(b"gcaxDTPK"));
        assert!(template.header[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_bytes() {
        let template = Template::from_bytes(&template_file()).unwrap();
        assert_eq!(template.header.len(), 0x278);
        assert_eq!(template.header[0x20], 0xAA);
        assert_eq!(template.header[0x277], 0xBB);
        assert_eq!(template.info_header[0], 0x11);
        assert_eq!(template.info_record[1], 0x22);
    }

    #[test]
    fn test_from_bytes_too_small() {
        let bytes = template_file();
        let result = Template::from_bytes(&bytes[..TEMPLATE_FILE_SIZE - 1]);
        assert!(matches!(result, Err(DtpkError::InvalidTemplate(_))));
    }

    #[test]
    fn test_from_bytes_bad_magic() {
        let mut bytes = template_file();
        bytes[0] = b'X';
        assert!(matches!(
            Template::from_bytes(&bytes),
            Err(DtpkError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Template.dat");
        std::fs::write(&path, template_file()).unwrap();

        let loaded = Template::load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded.header[0x20], 0xAA);
        assert_eq!(Template::load_or_default(None).unwrap(), Template::default());
    }
}
