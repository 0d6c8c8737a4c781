//! dtpk - DTPK soundbank tool
//!
//! Exports directories of WAV files to GameCube DTPK soundbanks and extracts
//! them back.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use dtpk_cli::info::InfoReport;
use dtpk_cli::manifest::{self, DEFAULT_MANIFEST};
use dtpk_format::export::default_output_path;
use dtpk_format::{
    ContainerReader, DspAdpcmCodec, DtpkError, Template, export_directory, parse_file_identifier,
};

#[derive(Parser)]
#[command(name = "dtpk")]
#[command(about = "DTPK soundbank export and extraction tool")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a directory of WAV files into a soundbank
    Export {
        /// Directory of "<index>_<name>.wav" files
        input_dir: PathBuf,

        /// File identifier (decimal or 0x-prefixed hex, 16-bit)
        file_identifier: String,

        /// Output soundbank (default: <input_dir>.DAT)
        output: Option<PathBuf>,

        /// Template file providing the static header bytes
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Extract every audio file of a soundbank as WAV
    Extract {
        /// Input soundbank
        input_file: PathBuf,

        /// Output directory
        output_dir: PathBuf,
    },

    /// Print soundbank header information
    Info {
        /// Input soundbank
        input_file: PathBuf,
    },

    /// Export a soundbank from a manifest file
    Build {
        /// Path to soundbank.toml manifest
        #[arg(default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}

fn run(command: Commands) -> Result<(), DtpkError> {
    let codec = DspAdpcmCodec;

    match command {
        Commands::Export {
            input_dir,
            file_identifier,
            output,
            template,
        } => {
            let identifier = parse_file_identifier(&file_identifier)?;
            let output = output.unwrap_or_else(|| default_output_path(&input_dir));
            let template = Template::load_or_default(template.as_deref())?;

            tracing::info!("Exporting {:?} -> {:?}", input_dir, output);
            export_directory(&input_dir, identifier, &output, template, &codec)?;
            tracing::info!("Done!");
        }

        Commands::Extract {
            input_file,
            output_dir,
        } => {
            tracing::info!("Extracting {:?} -> {:?}", input_file, output_dir);
            let mut reader = ContainerReader::open(&input_file)?;
            let written = reader.extract_all(&codec, &output_dir)?;
            tracing::info!("Extracted {} audio files.", written.len());
        }

        Commands::Info { input_file } => {
            let report = InfoReport::read(&input_file)?;
            println!("{}", report);
        }

        Commands::Build { manifest } => {
            tracing::info!("Building soundbank from {:?}", manifest);
            let plan = manifest::build(&manifest, &codec)?;
            tracing::info!("Build complete: {:?}", plan.output);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
