//! Export pipeline
//!
//! Turns a directory of `<index>_<name>.wav` files into a soundbank.

use std::path::{Path, PathBuf};

use crate::builder::{AudioEntry, ContainerBuilder};
use crate::codec::AdpcmCodec;
use crate::formats::Template;
use crate::wav::read_mono_pcm16;
use crate::{DtpkError, Result};

/// Parse a file identifier given as decimal or `0x`/`0X` hex
pub fn parse_file_identifier(text: &str) -> Result<u16> {
    let trimmed = text.trim();
    let value = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else {
        trimmed.parse::<u64>()
    }
    .map_err(|_| DtpkError::InvalidIdentifier(text.to_string()))?;

    u16::try_from(value).map_err(|_| DtpkError::IdentifierOutOfRange(value))
}

/// Ordering key of a WAV file name: the integer before the first `_`
pub fn order_key(file_name: &str) -> Option<u64> {
    let (prefix, _) = file_name.split_once('_')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

fn is_wav(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// List the `.wav` files in `dir`, sorted by their numeric prefix
///
/// Gaps and duplicate prefixes are allowed; duplicates keep name order.
pub fn collect_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DtpkError::NotADirectory(dir.to_path_buf()));
    }

    let mut keyed = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !is_wav(&path) {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = order_key(&name).ok_or_else(|| DtpkError::FilenameOrder(name.clone()))?;
        keyed.push((key, name, path));
    }

    if keyed.is_empty() {
        return Err(DtpkError::NoInput(dir.to_path_buf()));
    }

    keyed.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(keyed.into_iter().map(|(_, _, path)| path).collect())
}

/// Read and encode one WAV file
pub fn load_entry<C: AdpcmCodec>(path: &Path, codec: &C) -> Result<AudioEntry> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracing::info!("Encoding '{}'", name);

    let wav = read_mono_pcm16(path)?;
    let (data, info) = codec.encode(&wav.samples)?;

    Ok(AudioEntry {
        name,
        sample_rate: wav.sample_rate,
        sample_count: wav.samples.len(),
        data,
        info,
    })
}

/// Default output path for an input directory: `<input_dir>.DAT`
///
/// Paths without a final name (`.`, `dir/..`) are resolved first so the
/// output lands next to the directory, never inside it.
pub fn default_output_path(input_dir: &Path) -> PathBuf {
    let resolved = match input_dir.file_name() {
        Some(_) => input_dir.to_path_buf(),
        None => input_dir
            .canonicalize()
            .unwrap_or_else(|_| input_dir.to_path_buf()),
    };

    match resolved.file_name() {
        Some(name) => {
            let mut name = name.to_os_string();
            name.push(".DAT");
            resolved.with_file_name(name)
        }
        // Filesystem root
        None => resolved.join("soundbank.DAT"),
    }
}

/// Export every WAV in `input_dir` into a soundbank at `output`
///
/// The container is assembled in memory; nothing is written if any input
/// fails to load.
pub fn export_directory<C: AdpcmCodec>(
    input_dir: &Path,
    file_identifier: u16,
    output: &Path,
    template: Template,
    codec: &C,
) -> Result<()> {
    if !input_dir.is_dir() {
        return Err(DtpkError::NotADirectory(input_dir.to_path_buf()));
    }
    if output.is_dir() {
        return Err(DtpkError::OutputIsDirectory(output.to_path_buf()));
    }

    let files = collect_wav_files(input_dir)?;
    tracing::debug!("Exporting {} files from {:?}", files.len(), input_dir);

    let entries = files
        .iter()
        .map(|path| load_entry(path, codec))
        .collect::<Result<Vec<_>>>()?;

    let bytes = ContainerBuilder::new(template).build(file_identifier, &entries)?;
    std::fs::write(output, &bytes)?;

    tracing::info!(
        "Wrote {:?} ({} audio files, {} bytes)",
        output,
        entries.len(),
        bytes.len()
    );
    Ok(())
}
