use clap::{Args, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use msgpact_contract::{load_file, DirectionKind, MessageRegistry, RegistryConfig};

use crate::exit::{load_error, CliResult};
use crate::output::OutputFormat;

pub mod check;
pub mod contracts;
pub mod export;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one message against a direction contract.
    Check(CheckArgs),
    /// List the messages of both direction contracts.
    Contracts(ContractsArgs),
    /// Print the JSON Schema of every message in one direction.
    Export(ExportArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Check(args) => check::run(args, format),
        Command::Contracts(args) => contracts::run(args, format),
        Command::Export(args) => export::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    ToHost,
    ToPeer,
}

impl From<DirectionArg> for DirectionKind {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::ToHost => DirectionKind::ToHost,
            DirectionArg::ToPeer => DirectionKind::ToPeer,
        }
    }
}

#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// Declaration document (JSON).
    pub document: PathBuf,
    /// Reject fields that are not declared.
    #[arg(long)]
    pub strict: bool,
    /// Maximum declaration document size in bytes.
    #[arg(long, value_name = "BYTES", env = "MSGPACT_MAX_DOCUMENT_SIZE")]
    pub max_document_size: Option<usize>,
}

impl DocumentArgs {
    pub fn config(&self) -> RegistryConfig {
        let defaults = RegistryConfig::default();
        RegistryConfig {
            strict_mode: self.strict,
            max_document_size: self.max_document_size.unwrap_or(defaults.max_document_size),
        }
    }

    pub fn load(&self) -> CliResult<MessageRegistry> {
        load_registry(&self.document, self.config())
    }
}

fn load_registry(path: &Path, config: RegistryConfig) -> CliResult<MessageRegistry> {
    load_file(path, config)
        .map_err(|err| load_error(&format!("failed loading {}", path.display()), err))
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub document: DocumentArgs,
    /// Direction the message travels in.
    #[arg(long, short = 'd')]
    pub direction: DirectionArg,
    /// Message name.
    #[arg(long, short = 'm')]
    pub message: String,
    /// JSON payload.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the payload from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ContractsArgs {
    #[command(flatten)]
    pub document: DocumentArgs,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub document: DocumentArgs,
    /// Direction to export.
    #[arg(long, short = 'd')]
    pub direction: DirectionArg,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
