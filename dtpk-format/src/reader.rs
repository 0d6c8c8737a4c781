//! Container reader
//!
//! Navigates an existing soundbank by seeking to fixed header fields. Only the
//! header values and the stream being decoded are held in memory.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::codec::AdpcmCodec;
use crate::formats::{BinarySerializable, DTPK_MAGIC, FileEntry, PCMD_SIZE_OFFSET, header};
use crate::wav::write_mono_pcm16;
use crate::{CodecInfo, DtpkError, Result};

/// Summary fields read from a container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub full_file_size: u32,
    pub audio_data_offset: u32,
    pub file_entries_offset: u32,
    pub entry_count: u32,
    pub file_identifier: u16,
    /// Padded audio blob length, as stored in the blob header
    pub audio_data_size: u32,
}

/// One decoded stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSound {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

/// Reader over a DTPK soundbank
pub struct ContainerReader<R> {
    inner: R,
}

impl ContainerReader<BufReader<File>> {
    /// Open a soundbank file
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DtpkError::NotAFile(path.to_path_buf()));
        }
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> ContainerReader<R> {
    /// Wrap a reader, checking the magic tag
    ///
    /// Only the first 8 bytes are read; anything else is rejected before
    /// touching the rest of the file.
    pub fn new(mut inner: R) -> Result<Self> {
        inner.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 8];
        let mut filled = 0;
        while filled < magic.len() {
            let n = inner.read(&mut magic[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled < magic.len() || &magic != DTPK_MAGIC {
            return Err(DtpkError::ContainerFormat(format!(
                "expected magic {:?}, found {:?}",
                String::from_utf8_lossy(DTPK_MAGIC),
                String::from_utf8_lossy(&magic[..filled])
            )));
        }

        Ok(Self { inner })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_u32_at(&mut self, offset: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn stream_len(&mut self) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::End(0))?)
    }

    /// Read one fixed-size record at `offset`
    fn read_record<T: BinarySerializable>(&mut self, offset: u64) -> Result<Option<T>> {
        let mut buf = vec![0u8; T::SIZE];
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(&mut buf)?;
        Ok(T::deserialize(&buf))
    }

    fn read_u16_at(&mut self, offset: u64) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read the summary fields
    pub fn read_header(&mut self) -> Result<ContainerHeader> {
        let full_file_size = self.read_u32_at(header::FULL_FILE_LENGTH as u64)?;
        let audio_data_offset = self.read_u32_at(header::AUDIO_DATA_START as u64)?;
        let file_entries_offset = self.read_u32_at(header::FILE_ENTRIES_OFFSET as u64)?;
        let delta_count = self.read_u32_at(file_entries_offset as u64)?;
        let entry_count = delta_count.checked_add(1).ok_or_else(|| {
            DtpkError::ContainerFormat(format!("invalid entry count field {:#X}", delta_count))
        })?;

        // The entry table must fit in the stream
        let table_end =
            file_entries_offset as u64 + 4 + entry_count as u64 * FileEntry::SIZE as u64;
        let stream_len = self.stream_len()?;
        if table_end > stream_len {
            return Err(DtpkError::ContainerFormat(format!(
                "{} file entries at {:#X} extend past the end of the file ({:#X})",
                entry_count, file_entries_offset, stream_len
            )));
        }

        let file_identifier = self.read_u16_at(header::FILE_IDENTIFIER as u64)?;
        let audio_data_size =
            self.read_u32_at(audio_data_offset as u64 + PCMD_SIZE_OFFSET as u64)?;

        Ok(ContainerHeader {
            full_file_size,
            audio_data_offset,
            file_entries_offset,
            entry_count,
            file_identifier,
            audio_data_size,
        })
    }

    /// Read the file entry at `index`
    pub fn read_entry(&mut self, header: &ContainerHeader, index: u32) -> Result<FileEntry> {
        if index >= header.entry_count {
            return Err(DtpkError::ContainerFormat(format!(
                "entry {} out of range ({} entries)",
                index, header.entry_count
            )));
        }

        let offset =
            header.file_entries_offset as u64 + 4 + index as u64 * FileEntry::SIZE as u64;
        self.read_record::<FileEntry>(offset)?
            .ok_or_else(|| DtpkError::ContainerFormat(format!("unreadable entry {}", index)))
    }

    /// Read the compressed bytes of `entry`
    pub fn read_audio(&mut self, header: &ContainerHeader, entry: &FileEntry) -> Result<Vec<u8>> {
        let start = header.audio_data_offset as u64 + entry.start_offset as u64;
        let end = start + entry.data_size as u64;
        let stream_len = self.stream_len()?;
        if end > stream_len {
            return Err(DtpkError::ContainerFormat(format!(
                "audio data {:#X}..{:#X} extends past the end of the file ({:#X})",
                start, end, stream_len
            )));
        }

        self.inner.seek(SeekFrom::Start(start))?;
        let mut data = Vec::new();
        (&mut self.inner)
            .take(entry.data_size as u64)
            .read_to_end(&mut data)?;
        if data.len() != entry.data_size as usize {
            return Err(DtpkError::Io(std::io::Error::from(
                std::io::ErrorKind::UnexpectedEof,
            )));
        }
        Ok(data)
    }

    /// Read and decode the stream at `index`
    pub fn decode_entry<C: AdpcmCodec>(
        &mut self,
        codec: &C,
        header: &ContainerHeader,
        index: u32,
    ) -> Result<DecodedSound> {
        let entry = self.read_entry(header, index)?;
        let data = self.read_audio(header, &entry)?;

        let info = CodecInfo::from_coefs(entry.coef);
        let samples = codec.decode(&data, &info, entry.sample_count())?;

        Ok(DecodedSound {
            sample_rate: entry.sample_rate as u32,
            samples,
        })
    }

    /// Decode every stream to `<output_dir>/<index>_Sound.wav`
    ///
    /// Entries are written in table order. The directory is created if
    /// missing.
    pub fn extract_all<C: AdpcmCodec>(
        &mut self,
        codec: &C,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(DtpkError::OutputIsFile(output_dir.to_path_buf()));
        }

        let header = self.read_header()?;
        std::fs::create_dir_all(output_dir)?;

        tracing::info!("Found {} audio files.", header.entry_count);
        tracing::info!("Extracting...");

        let mut written = Vec::new();
        for index in 0..header.entry_count {
            let sound = self.decode_entry(codec, &header, index)?;
            let path = output_dir.join(format!("{}_Sound.wav", index));
            tracing::debug!(
                "Writing {:?} ({} samples, {} Hz)",
                path,
                sound.samples.len(),
                sound.sample_rate
            );
            write_mono_pcm16(&path, sound.sample_rate, &sound.samples)?;
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{AudioEntry, ContainerBuilder};
    use crate::codec::DspAdpcmCodec;
    use std::io::Cursor;

    fn build_bank(rates: &[u32]) -> Vec<u8> {
        let codec = DspAdpcmCodec;
        let entries: Vec<AudioEntry> = rates
            .iter()
            .enumerate()
            .map(|(i, &rate)| {
                let samples: Vec<i16> = (0..(100 + i * 30))
                    .map(|n| ((n as i32 * 211) % 4000 - 2000) as i16)
                    .collect();
                let (data, info) = codec.encode(&samples).unwrap();
                AudioEntry {
                    name: format!("{}_s.wav", i),
                    sample_rate: rate,
                    sample_count: samples.len(),
                    data,
                    info,
                }
            })
            .collect();
        ContainerBuilder::default().build(0xA932, &entries).unwrap()
    }

    #[test]
    fn test_bad_magic_rejected() {
        let result = ContainerReader::new(Cursor::new(b"gcaxDTPX and more".to_vec()));
        assert!(matches!(result, Err(DtpkError::ContainerFormat(_))));

        let result = ContainerReader::new(Cursor::new(b"gcax".to_vec()));
        assert!(matches!(result, Err(DtpkError::ContainerFormat(_))));
    }

    #[test]
    fn test_bad_magic_reads_only_the_tag() {
        let mut cursor = Cursor::new(vec![0xEEu8; 4096]);
        cursor.set_position(100);
        let result = ContainerReader::new(&mut cursor);
        assert!(result.is_err());
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_read_header() {
        let bytes = build_bank(&[44100, 22050, 32000]);
        let mut reader = ContainerReader::new(Cursor::new(bytes.clone())).unwrap();
        let header = reader.read_header().unwrap();

        assert_eq!(header.file_identifier, 0xA932);
        assert_eq!(header.entry_count, 3);
        assert_eq!(header.full_file_size as usize, bytes.len());
        assert!(header.audio_data_offset.is_power_of_two());
        assert!(header.audio_data_offset as usize + header.audio_data_size as usize <= bytes.len());
        assert_eq!(&bytes[header.audio_data_offset as usize..][..8], b"gcaxPCMD");
    }

    #[test]
    fn test_entries_are_ordered_and_in_bounds() {
        let bytes = build_bank(&[44100, 44100, 44100, 44100]);
        let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
        let header = reader.read_header().unwrap();

        let mut previous_end = 0u64;
        for index in 0..header.entry_count {
            let entry = reader.read_entry(&header, index).unwrap();
            assert!(entry.start_offset as u64 >= previous_end);
            assert!(entry.end_offset() <= header.audio_data_size as u64);
            assert_eq!(entry.shifted_size, (entry.data_size << 1) - 1);
            previous_end = entry.end_offset();
        }

        assert!(matches!(
            reader.read_entry(&header, header.entry_count),
            Err(DtpkError::ContainerFormat(_))
        ));
    }

    #[test]
    fn test_decode_entry_sample_count() {
        let bytes = build_bank(&[44100, 22050]);
        let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
        let header = reader.read_header().unwrap();

        // 130 samples -> 10 frames -> 140 decoded samples
        let sound = reader.decode_entry(&DspAdpcmCodec, &header, 1).unwrap();
        assert_eq!(sound.sample_rate, 22050);
        assert_eq!(sound.samples.len(), 140);
    }

    fn corrupt_bank(delta_count: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 0x400];
        bytes[..8].copy_from_slice(DTPK_MAGIC);
        bytes[0x1C..0x20].copy_from_slice(&0x300u32.to_be_bytes());
        bytes[0xB8..0xBC].copy_from_slice(&0x200u32.to_be_bytes());
        bytes[0x200..0x204].copy_from_slice(&delta_count.to_be_bytes());
        bytes
    }

    #[test]
    fn test_entry_count_past_end_of_file() {
        let mut reader = ContainerReader::new(Cursor::new(corrupt_bank(0xFFFF_FFFE))).unwrap();
        assert!(matches!(
            reader.read_header(),
            Err(DtpkError::ContainerFormat(_))
        ));

        // 0x200 + 4 + 12 * 68 = 0x534 > 0x400
        let mut reader = ContainerReader::new(Cursor::new(corrupt_bank(11))).unwrap();
        assert!(matches!(
            reader.read_header(),
            Err(DtpkError::ContainerFormat(_))
        ));

        let mut reader = ContainerReader::new(Cursor::new(corrupt_bank(0))).unwrap();
        assert_eq!(reader.read_header().unwrap().entry_count, 1);
    }

    #[test]
    fn test_extract_corrupt_entry_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = ContainerReader::new(Cursor::new(corrupt_bank(0xFFFF_FFFE))).unwrap();
        assert!(matches!(
            reader.extract_all(&DspAdpcmCodec, &dir.path().join("out")),
            Err(DtpkError::ContainerFormat(_))
        ));
    }

    #[test]
    fn test_audio_size_past_end_of_file() {
        let bytes = build_bank(&[44100]);
        let mut reader = ContainerReader::new(Cursor::new(bytes)).unwrap();
        let header = reader.read_header().unwrap();

        let mut entry = reader.read_entry(&header, 0).unwrap();
        entry.data_size = 0xFFFF_FFF0;
        assert!(matches!(
            reader.read_audio(&header, &entry),
            Err(DtpkError::ContainerFormat(_))
        ));
    }

    #[test]
    fn test_read_entry_matches_table_bytes() {
        let bytes = build_bank(&[44100, 32000]);
        let mut reader = ContainerReader::new(Cursor::new(bytes.clone())).unwrap();
        let header = reader.read_header().unwrap();

        let offset = header.file_entries_offset as usize + 4 + FileEntry::SIZE;
        let raw = &bytes[offset..offset + FileEntry::SIZE];
        let expected = <FileEntry as BinarySerializable>::deserialize(raw).unwrap();
        assert_eq!(reader.read_entry(&header, 1).unwrap(), expected);
        assert_eq!(expected.sample_rate, 32000);
    }

    #[test]
    fn test_truncated_file_is_io_error() {
        let bytes = build_bank(&[44100]);
        let mut reader = ContainerReader::new(Cursor::new(bytes[..0x100].to_vec())).unwrap();
        assert!(matches!(reader.read_header(), Err(DtpkError::Io(_))));
    }

    #[test]
    fn test_extract_all() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BANK.DAT");
        std::fs::write(&path, build_bank(&[44100, 22050, 32000])).unwrap();

        let out = dir.path().join("out");
        let mut reader = ContainerReader::open(&path).unwrap();
        let written = reader.extract_all(&DspAdpcmCodec, &out).unwrap();

        assert_eq!(written.len(), 3);
        for (i, rate) in [44100, 22050, 32000].into_iter().enumerate() {
            let wav = hound::WavReader::open(out.join(format!("{}_Sound.wav", i))).unwrap();
            assert_eq!(wav.spec().sample_rate, rate);
            assert_eq!(wav.spec().channels, 1);
        }
    }

    #[test]
    fn test_extract_output_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let bank = dir.path().join("BANK.DAT");
        std::fs::write(&bank, build_bank(&[44100])).unwrap();
        let out = dir.path().join("out");
        std::fs::write(&out, b"not a directory").unwrap();

        let mut reader = ContainerReader::open(&bank).unwrap();
        assert!(matches!(
            reader.extract_all(&DspAdpcmCodec, &out),
            Err(DtpkError::OutputIsFile(_))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ContainerReader::open(&dir.path().join("missing.DAT")),
            Err(DtpkError::NotAFile(_))
        ));
    }
}
