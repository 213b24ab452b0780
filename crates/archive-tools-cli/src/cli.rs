//! CLI argument parsing using clap.

use archive_tools_core::ChecksumAlgorithm;
use archive_tools_core::CompressionCodec;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "archive-tool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new archive with a manifest of its contents
    Create(CreateArgs),
    /// Verify archive contents against the manifest
    Verify(VerifyArgs),
    /// List the entries of the manifest
    List(ListArgs),
    /// Show every manifest field of one entry
    Info(InfoArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

/// Compression choices accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl CompressionArg {
    pub const fn codec(self) -> Option<CompressionCodec> {
        match self {
            Self::None => None,
            Self::Gzip => Some(CompressionCodec::Gzip),
            Self::Bzip2 => Some(CompressionCodec::Bzip2),
            Self::Xz => Some(CompressionCodec::Xz),
            Self::Zstd => Some(CompressionCodec::Zstd),
        }
    }
}

/// Checksum choices accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChecksumArg {
    Sha256,
    Sha512,
    Blake3,
}

impl From<ChecksumArg> for ChecksumAlgorithm {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Sha256 => Self::Sha256,
            ChecksumArg::Sha512 => Self::Sha512,
            ChecksumArg::Blake3 => Self::Blake3,
        }
    }
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Archive file to create (must not exist)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Files, directories or symbolic links to add
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Directory under which members are stored in the archive
    #[arg(short, long, value_name = "DIR")]
    pub basedir: Option<PathBuf>,

    /// Compression codec (default: inferred from the archive name)
    #[arg(short, long, value_enum)]
    pub compression: Option<CompressionArg>,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub level: Option<u8>,

    /// Leave this path and everything below it out (can be repeated)
    #[arg(long = "exclude", short = 'x', value_name = "PATH")]
    pub excludes: Vec<PathBuf>,

    /// Checksum algorithm for regular files (can be repeated)
    #[arg(long = "checksum", value_enum, value_name = "ALG")]
    pub checksums: Vec<ChecksumArg>,

    /// Comment written into the manifest header
    #[arg(long, value_name = "TEXT")]
    pub comment: Option<String>,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show type, mode, size and modification time
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args)]
pub struct InfoArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Entry path as listed in the manifest
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_explicit_compression_wins() {
        let cli = Cli::parse_from([
            "archive-tool",
            "create",
            "--compression",
            "none",
            "out.tar.gz",
            "base",
        ]);
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.compression, Some(CompressionArg::None));
        assert_eq!(args.compression.and_then(CompressionArg::codec), None);
    }

    #[test]
    fn test_repeated_flags() {
        let cli = Cli::parse_from([
            "archive-tool",
            "create",
            "out.tar.xz",
            "base",
            "-x",
            "base/a",
            "--exclude",
            "base/b",
            "--checksum",
            "sha512",
            "--checksum",
            "blake3",
        ]);
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.excludes.len(), 2);
        assert_eq!(args.checksums, vec![ChecksumArg::Sha512, ChecksumArg::Blake3]);
        assert_eq!(args.compression, None);
    }

    #[test]
    fn test_level_range() {
        assert!(
            Cli::try_parse_from(["archive-tool", "create", "-l", "10", "a.tar", "base"]).is_err()
        );
    }
}
