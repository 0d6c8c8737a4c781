//! DTPK soundbank binary layout
//!
//! Everything in the container is big-endian. The header region has a fixed
//! shape (taken from a template) with size/offset fields patched at fixed
//! positions once the variable-length tables are known.
//!
//! # Layout
//! ```text
//! 0x000: "gcaxDTPK" magic
//! 0x00C: full file length              u32
//! 0x010: end of info + 0x20            u32
//! 0x018: audio blob length + 0x20      u32
//! 0x01C: audio data start              u32
//! 0x0A8: header length                 u32
//! 0x0B8: file entries table offset     u32
//! 0x0BC: end of info                   u32
//! 0x278: file identifier               u16
//! ...    file table, playback flags    (header region, 4-aligned)
//! ...    audio info table              (0x30 header + 0x40 per entry)
//! ...    file entries table            (u32 count-1 + 68 bytes per entry)
//! ...    zero padding to audio data start (power of two)
//! ...    audio blob "gcaxPCMD"         (32-byte header + 8-aligned streams)
//! ...    zero padding to a 256-byte boundary
//! ```

mod codec_info;
mod file_entry;
mod serialization;
mod template;

pub use codec_info::CodecInfo;
pub use file_entry::{FILE_ENTRY_UNK, FILE_ENTRY_UNK3, FileEntry};
pub use serialization::BinarySerializable;
pub use template::Template;

/// Container magic at offset 0
pub const DTPK_MAGIC: &[u8; 8] = b"gcaxDTPK";

/// Audio blob magic
pub const PCMD_MAGIC: &[u8; 8] = b"gcaxPCMD";

/// Fixed value following the audio blob magic
pub const PCMD_VERSION: u32 = 0x024A_0100;

/// Size of the audio blob header (magic, version, size, reserved)
pub const PCMD_HEADER_SIZE: usize = 0x20;

/// Offset of the padded blob length inside the audio blob header
pub const PCMD_SIZE_OFFSET: usize = 0xC;

/// Marker written after the file identifier
pub const HEADER_MARKER: u16 = 0x0008;

/// Bytes per playback flag record
pub const PLAYBACK_FLAG_SIZE: usize = 6;

/// Offset of the first file table entry, relative to the table
pub const FILE_TABLE_BASE: usize = 0xC;

/// Header field offsets
pub mod header {
    pub const FULL_FILE_LENGTH: usize = 0x0C;
    pub const END_OF_INFO_PLUS_20: usize = 0x10;
    pub const AUDIO_BLOB_LENGTH_PLUS_20: usize = 0x18;
    pub const AUDIO_DATA_START: usize = 0x1C;
    pub const HEADER_LENGTH: usize = 0xA8;
    pub const FILE_ENTRIES_OFFSET: usize = 0xB8;
    pub const END_OF_INFO: usize = 0xBC;
    pub const FILE_IDENTIFIER: usize = 0x278;
}

/// Audio info table offsets
pub mod audio_info {
    /// Size of the table header
    pub const HEADER_SIZE: usize = 0x30;
    /// Size of one per-entry record
    pub const RECORD_SIZE: usize = 0x40;
    /// Byte of the table header holding `entry_count - 1`
    pub const DELTA_COUNT: usize = 0x11;
    /// Bytes of each record holding the entry index
    pub const INDEX_FIELDS: [usize; 2] = [0x0, 0x3];
}

/// Playback flag record for entry `index`
pub fn playback_flags(index: u8) -> [u8; PLAYBACK_FLAG_SIZE] {
    [0xC0, 0xDF, index, 0x7F, 0x80, 0xFF]
}

/// Overwrite the big-endian u32 at `offset`
///
/// Panics if `offset + 4` exceeds the buffer; callers patch fixed offsets
/// inside regions whose size they control.
pub fn patch_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Read the big-endian u32 at `offset`
pub fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_flags() {
        assert_eq!(playback_flags(3), [0xC0, 0xDF, 0x03, 0x7F, 0x80, 0xFF]);
    }

    #[test]
    fn test_patch_and_read_u32() {
        let mut buf = vec![0u8; 8];
        patch_u32(&mut buf, 2, 0x1234_5678);
        assert_eq!(buf, [0, 0, 0x12, 0x34, 0x56, 0x78, 0, 0]);
        assert_eq!(read_u32(&buf, 2), Some(0x1234_5678));
        assert_eq!(read_u32(&buf, 5), None);
    }
}
