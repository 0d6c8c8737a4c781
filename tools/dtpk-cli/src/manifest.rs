//! Manifest parsing and build orchestration
//!
//! Parses `soundbank.toml`:
//!
//! ```toml
//! identifier = "0xA932"
//! input = "sounds"
//! output = "build/SOUNDS.DAT"   # optional, defaults to <input>.DAT
//! template = "Template.dat"     # optional
//! ```
//!
//! Relative paths resolve against the manifest's directory.

use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use dtpk_format::export::default_output_path;
use dtpk_format::{
    AdpcmCodec, DtpkError, Result, Template, export_directory, parse_file_identifier,
};

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "soundbank.toml";

/// File identifier written either as a string (`"0xA932"`) or an integer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdentifierValue {
    Number(i64),
    Text(String),
}

impl IdentifierValue {
    pub fn resolve(&self) -> Result<u16> {
        match self {
            IdentifierValue::Number(n) if *n < 0 => {
                Err(DtpkError::InvalidIdentifier(n.to_string()))
            }
            IdentifierValue::Number(n) => {
                u16::try_from(*n).map_err(|_| DtpkError::IdentifierOutOfRange(*n as u64))
            }
            IdentifierValue::Text(text) => parse_file_identifier(text),
        }
    }
}

/// Root manifest structure
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub identifier: IdentifierValue,
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub template: Option<PathBuf>,
}

/// A manifest with every path resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub identifier: u16,
    pub input: PathBuf,
    pub output: PathBuf,
    pub template: Option<PathBuf>,
}

fn read_manifest(path: &Path) -> anyhow::Result<Manifest> {
    if !path.is_file() {
        bail!("manifest not found");
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    read_manifest(path).map_err(|e| DtpkError::Manifest {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })
}

impl Manifest {
    /// Resolve identifier and paths relative to `base_dir`
    pub fn plan(&self, base_dir: &Path) -> Result<BuildPlan> {
        let identifier = self.identifier.resolve()?;
        let input = base_dir.join(&self.input);
        let output = match &self.output {
            Some(output) => base_dir.join(output),
            None => default_output_path(&input),
        };
        let template = self.template.as_ref().map(|t| base_dir.join(t));

        Ok(BuildPlan {
            identifier,
            input,
            output,
            template,
        })
    }
}

/// Load `manifest_path` and export the soundbank it describes
pub fn build<C: AdpcmCodec>(manifest_path: &Path, codec: &C) -> Result<BuildPlan> {
    let manifest = load_manifest(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
    let plan = manifest.plan(base_dir)?;
    tracing::debug!("Build plan: {:?}", plan);

    let template = Template::load_or_default(plan.template.as_deref())?;
    export_directory(&plan.input, plan.identifier, &plan.output, template, codec)?;
    Ok(plan)
}
