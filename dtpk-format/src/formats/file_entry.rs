//! File entry record (68 bytes, big-endian)
//!
//! One per audio stream, stored in the file entries table.
//!
//! # Layout
//! ```text
//! 0x00: start_offset  u32  (relative to the audio blob start)
//! 0x04: unk           u32  (always FILE_ENTRY_UNK)
//! 0x08: shifted_size  u32  ((data_size << 1) - 1)
//! 0x0C: coef[16]      i16
//! 0x2C: unk2[3]       u32  (zero)
//! 0x38: unk3          u32  (always FILE_ENTRY_UNK3)
//! 0x3C: sample_rate   u16
//! 0x3E: padding       u16  (zero, keeps data_size 4-aligned)
//! 0x40: data_size     u32  (compressed byte count)
//! ```

use dtpk_adpcm::{COEF_COUNT, samples_for_adpcm_bytes};

use super::BinarySerializable;

/// Reserved field at 0x04; meaning unknown, the engine expects 2
pub const FILE_ENTRY_UNK: u32 = 2;

/// Reserved field at 0x38; meaning unknown, the engine expects 0x200
pub const FILE_ENTRY_UNK3: u32 = 0x200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    pub start_offset: u32,
    pub unk: u32,
    pub shifted_size: u32,
    pub coef: [i16; COEF_COUNT],
    pub unk2: [u32; 3],
    pub unk3: u32,
    pub sample_rate: u16,
    pub data_size: u32,
}

impl FileEntry {
    pub const SIZE: usize = 68;

    /// Create an entry for a stream of `data_size` compressed bytes
    pub fn new(start_offset: u32, data_size: u32, coef: [i16; COEF_COUNT], sample_rate: u16) -> Self {
        Self {
            start_offset,
            unk: FILE_ENTRY_UNK,
            shifted_size: shifted_size(data_size),
            coef,
            unk2: [0; 3],
            unk3: FILE_ENTRY_UNK3,
            sample_rate,
            data_size,
        }
    }

    /// Samples stored in the stream (whole ADPCM frames)
    pub fn sample_count(&self) -> usize {
        samples_for_adpcm_bytes(self.data_size as usize)
    }

    /// End of the stream relative to the audio blob start
    pub fn end_offset(&self) -> u64 {
        self.start_offset as u64 + self.data_size as u64
    }

    /// Write entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0x00..0x04].copy_from_slice(&self.start_offset.to_be_bytes());
        bytes[0x04..0x08].copy_from_slice(&self.unk.to_be_bytes());
        bytes[0x08..0x0C].copy_from_slice(&self.shifted_size.to_be_bytes());
        for (i, c) in self.coef.iter().enumerate() {
            let o = 0x0C + i * 2;
            bytes[o..o + 2].copy_from_slice(&c.to_be_bytes());
        }
        for (i, v) in self.unk2.iter().enumerate() {
            let o = 0x2C + i * 4;
            bytes[o..o + 4].copy_from_slice(&v.to_be_bytes());
        }
        bytes[0x38..0x3C].copy_from_slice(&self.unk3.to_be_bytes());
        bytes[0x3C..0x3E].copy_from_slice(&self.sample_rate.to_be_bytes());
        // 0x3E..0x40 stays 0
        bytes[0x40..0x44].copy_from_slice(&self.data_size.to_be_bytes());
        bytes
    }

    /// Read entry from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u32_at = |o: usize| u32::from_be_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);

        let mut coef = [0i16; COEF_COUNT];
        for (i, c) in coef.iter_mut().enumerate() {
            let o = 0x0C + i * 2;
            *c = i16::from_be_bytes([bytes[o], bytes[o + 1]]);
        }

        Some(Self {
            start_offset: u32_at(0x00),
            unk: u32_at(0x04),
            shifted_size: u32_at(0x08),
            coef,
            unk2: [u32_at(0x2C), u32_at(0x30), u32_at(0x34)],
            unk3: u32_at(0x38),
            sample_rate: u16::from_be_bytes([bytes[0x3C], bytes[0x3D]]),
            data_size: u32_at(0x40),
        })
    }
}

impl BinarySerializable for FileEntry {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

/// Engine encoding of the stream size: `(data_size << 1) - 1`
///
/// Wraps for an empty stream, matching the 32-bit field.
pub fn shifted_size(data_size: u32) -> u32 {
    (data_size << 1).wrapping_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_constants() {
        let entry = FileEntry::new(0x20, 0x100, [0; COEF_COUNT], 44100);
        assert_eq!(entry.unk, 2);
        assert_eq!(entry.unk3, 0x200);
        assert_eq!(entry.unk2, [0; 3]);
        assert_eq!(entry.shifted_size, 0x1FF);
        assert_eq!(entry.end_offset(), 0x120);
    }

    #[test]
    fn test_sample_count() {
        let entry = FileEntry::new(0, 16, [0; COEF_COUNT], 44100);
        assert_eq!(entry.sample_count(), 28);

        let entry = FileEntry::new(0, 20, [0; COEF_COUNT], 44100);
        assert_eq!(entry.sample_count(), 28);
    }

    #[test]
    fn test_byte_layout() {
        let mut coef = [0i16; COEF_COUNT];
        coef[0] = -2;
        coef[15] = 0x0102;
        let entry = FileEntry::new(0x20, 0x38, coef, 0xAC44);
        let bytes = entry.to_bytes();

        assert_eq!(&bytes[0x00..0x04], &[0, 0, 0, 0x20]);
        assert_eq!(&bytes[0x04..0x08], &[0, 0, 0, 2]);
        assert_eq!(&bytes[0x08..0x0C], &[0, 0, 0, 0x6F]);
        assert_eq!(&bytes[0x0C..0x0E], &[0xFF, 0xFE]);
        assert_eq!(&bytes[0x2A..0x2C], &[0x01, 0x02]);
        assert_eq!(&bytes[0x2C..0x38], &[0; 12]);
        assert_eq!(&bytes[0x38..0x3C], &[0, 0, 0x02, 0]);
        assert_eq!(&bytes[0x3C..0x40], &[0xAC, 0x44, 0, 0]);
        assert_eq!(&bytes[0x40..0x44], &[0, 0, 0, 0x38]);

        assert_eq!(FileEntry::from_bytes(&bytes), Some(entry));
    }

    #[test]
    fn test_shifted_size_empty() {
        assert_eq!(shifted_size(0), u32::MAX);
    }
}
