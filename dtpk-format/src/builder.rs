//! Container builder
//!
//! Assembles a complete soundbank from encoded audio entries. Entry offsets
//! depend on the length of every earlier stream, so entries are laid out in a
//! single forward pass in the order given.

use crate::align::{align32, align256, next_power_of_two_above, pad_to};
use crate::formats::{
    FILE_TABLE_BASE, FileEntry, HEADER_MARKER, PCMD_HEADER_SIZE, PCMD_MAGIC, PCMD_SIZE_OFFSET,
    PCMD_VERSION, PLAYBACK_FLAG_SIZE, Template, audio_info, header, patch_u32, playback_flags,
};
use crate::{CodecInfo, DtpkError, MAX_ENTRIES, Result};

/// One encoded audio stream, ready to be placed in a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEntry {
    /// Source name, used in error messages
    pub name: String,
    pub sample_rate: u32,
    pub sample_count: usize,
    /// Compressed ADPCM bytes
    pub data: Vec<u8>,
    pub info: CodecInfo,
}

/// Sizes and offsets of a container's regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLayout {
    pub header_len: usize,
    pub info_len: usize,
    pub entries_len: usize,
    /// 32-byte-aligned end of the header, info and entry tables
    pub end_of_info: usize,
    /// Next power of two strictly above `end_of_info`
    pub audio_data_start: usize,
    pub audio_blob_len: usize,
    /// `audio_data_start + audio_blob_len` rounded up to 256 bytes
    pub full_file_len: usize,
}

impl ContainerLayout {
    pub fn compute(
        header_len: usize,
        info_len: usize,
        entries_len: usize,
        audio_blob_len: usize,
    ) -> Result<Self> {
        let end_of_info = align32(header_len + info_len + entries_len);
        let audio_data_start = next_power_of_two_above(end_of_info).ok_or_else(|| {
            DtpkError::ContainerFormat(format!("info region too large: {:#X}", end_of_info))
        })?;
        let full_file_len = align256(audio_data_start + audio_blob_len);

        Ok(Self {
            header_len,
            info_len,
            entries_len,
            end_of_info,
            audio_data_start,
            audio_blob_len,
            full_file_len,
        })
    }
}

/// Builds containers from a template
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    template: Template,
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| DtpkError::ContainerFormat(format!("{} exceeds 32 bits: {:#X}", what, value)))
}

impl ContainerBuilder {
    pub fn new(template: Template) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Build a container, returning its bytes
    pub fn build(&self, file_identifier: u16, entries: &[AudioEntry]) -> Result<Vec<u8>> {
        Ok(self.build_with_layout(file_identifier, entries)?.0)
    }

    /// Build a container, returning its bytes and region layout
    pub fn build_with_layout(
        &self,
        file_identifier: u16,
        entries: &[AudioEntry],
    ) -> Result<(Vec<u8>, ContainerLayout)> {
        if entries.is_empty() {
            return Err(DtpkError::NoEntries);
        }
        if entries.len() > MAX_ENTRIES {
            return Err(DtpkError::TooManyEntries(entries.len()));
        }

        // Fits in a byte: at most MAX_ENTRIES entries
        let delta_count = (entries.len() - 1) as u8;

        let mut header = self.build_header(file_identifier, entries.len(), delta_count);
        let info = self.build_audio_info(entries.len(), delta_count);
        let (entry_table, mut blob) = build_entries_and_blob(entries, delta_count)?;

        pad_to::<32>(&mut blob);
        let blob_len = to_u32(blob.len(), "audio data")?;
        patch_u32(&mut blob, PCMD_SIZE_OFFSET, blob_len);

        let layout =
            ContainerLayout::compute(header.len(), info.len(), entry_table.len(), blob.len())?;
        tracing::debug!("Container layout: {:?}", layout);

        patch_u32(
            &mut header,
            header::FULL_FILE_LENGTH,
            to_u32(layout.full_file_len, "file length")?,
        );
        patch_u32(
            &mut header,
            header::END_OF_INFO_PLUS_20,
            to_u32(layout.end_of_info + 0x20, "end of info")?,
        );
        patch_u32(
            &mut header,
            header::AUDIO_BLOB_LENGTH_PLUS_20,
            to_u32(layout.audio_blob_len + 0x20, "audio data")?,
        );
        patch_u32(
            &mut header,
            header::AUDIO_DATA_START,
            to_u32(layout.audio_data_start, "audio data start")?,
        );
        patch_u32(
            &mut header,
            header::HEADER_LENGTH,
            to_u32(layout.header_len, "header length")?,
        );
        patch_u32(
            &mut header,
            header::FILE_ENTRIES_OFFSET,
            to_u32(layout.header_len + layout.info_len, "file entries offset")?,
        );
        patch_u32(
            &mut header,
            header::END_OF_INFO,
            to_u32(layout.end_of_info, "end of info")?,
        );

        let mut out = Vec::with_capacity(layout.full_file_len);
        out.extend_from_slice(&header);
        out.extend_from_slice(&info);
        out.extend_from_slice(&entry_table);
        out.resize(layout.audio_data_start, 0);
        out.extend_from_slice(&blob);
        out.resize(layout.full_file_len, 0);

        Ok((out, layout))
    }

    /// Template prefix, identifier, file table and playback flags
    fn build_header(&self, file_identifier: u16, count: usize, delta_count: u8) -> Vec<u8> {
        let mut header = Vec::with_capacity(
            self.template.header.len() + 8 + count * (4 + PLAYBACK_FLAG_SIZE) + 4,
        );
        header.extend_from_slice(&self.template.header);

        header.extend_from_slice(&file_identifier.to_be_bytes());
        header.extend_from_slice(&HEADER_MARKER.to_be_bytes());
        header.push(delta_count);
        header.extend_from_slice(&[0; 3]);

        // Offsets into the file table: count*4 + 0xC, stepping by 6
        let mut table_offset = (count * 4 + FILE_TABLE_BASE) as u32;
        for _ in 0..count {
            header.extend_from_slice(&table_offset.to_be_bytes());
            table_offset += PLAYBACK_FLAG_SIZE as u32;
        }
        for index in 0..count {
            header.extend_from_slice(&playback_flags(index as u8));
        }

        pad_to::<4>(&mut header);
        header
    }

    fn build_audio_info(&self, count: usize, delta_count: u8) -> Vec<u8> {
        let mut info =
            Vec::with_capacity(audio_info::HEADER_SIZE + count * audio_info::RECORD_SIZE);
        info.extend_from_slice(&self.template.info_header);
        info[audio_info::DELTA_COUNT] = delta_count;

        for index in 0..count {
            let mut record = self.template.info_record;
            for field in audio_info::INDEX_FIELDS {
                record[field] = index as u8;
            }
            info.extend_from_slice(&record);
        }
        info
    }
}

/// File entry table and audio blob, in one pass over the entries
fn build_entries_and_blob(entries: &[AudioEntry], delta_count: u8) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut table = Vec::with_capacity(4 + entries.len() * FileEntry::SIZE);
    table.extend_from_slice(&(delta_count as u32).to_be_bytes());

    let mut blob = Vec::with_capacity(
        PCMD_HEADER_SIZE + entries.iter().map(|e| e.data.len() + 8).sum::<usize>(),
    );
    blob.extend_from_slice(PCMD_MAGIC);
    blob.extend_from_slice(&PCMD_VERSION.to_be_bytes());
    blob.resize(PCMD_HEADER_SIZE, 0);

    for entry in entries {
        let sample_rate =
            u16::try_from(entry.sample_rate).map_err(|_| DtpkError::SampleRateOutOfRange {
                file: entry.name.clone(),
                rate: entry.sample_rate,
            })?;

        let file_entry = FileEntry::new(
            to_u32(blob.len(), "audio data")?,
            to_u32(entry.data.len(), "audio stream")?,
            entry.info.coef,
            sample_rate,
        );
        table.extend_from_slice(&file_entry.to_bytes());

        blob.extend_from_slice(&entry.data);
        pad_to::<8>(&mut blob);
    }

    Ok((table, blob))
}
