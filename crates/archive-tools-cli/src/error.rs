//! Error conversion utilities for CLI.
//!
//! Converts archive-tools-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use archive_tools_core::ArchiveError;
use std::path::Path;

/// Converts `ArchiveError` to a user-friendly anyhow error with a hint.
pub fn convert_archive_error(err: ArchiveError, archive: &Path) -> anyhow::Error {
    match err {
        ArchiveError::EmptyArchive => {
            anyhow!(
                "Refusing to create an empty archive '{}'\n\
                 HINT: Name at least one file or directory to add.",
                archive.display()
            )
        }
        ArchiveError::MixedPaths => {
            anyhow!(
                "Cannot create '{}': absolute and relative paths are mixed\n\
                 HINT: Pass either only absolute or only relative paths.",
                archive.display()
            )
        }
        ArchiveError::InvalidPath { path, reason } => {
            anyhow!(
                "Invalid path '{}': {reason}\n\
                 HINT: Paths must be normalized, without '.', '..' or symlinked directories.",
                path.display()
            )
        }
        ArchiveError::InvalidBasedir { basedir, reason } => {
            anyhow!(
                "Invalid base directory '{}': {reason}\n\
                 HINT: Use a relative, normalized --basedir.",
                basedir.display()
            )
        }
        ArchiveError::PathNotInBasedir { path, basedir } => {
            anyhow!(
                "Path '{}' is not below base directory '{}'\n\
                 HINT: Relative paths must all start with the base directory; use --basedir to change it.",
                path.display(),
                basedir.display()
            )
        }
        ArchiveError::ReservedName { path } => {
            anyhow!(
                "Cannot add '{}': this filename is reserved\n\
                 HINT: Exclude it with --exclude {}.",
                path.display(),
                path.display()
            )
        }
        ArchiveError::UnsupportedType { path } => {
            anyhow!(
                "Cannot add '{}': unsupported file type\n\
                 HINT: Only directories, regular files and symbolic links can be archived; \
                 exclude it with --exclude.",
                path.display()
            )
        }
        ArchiveError::SourceNotFound { path } => {
            anyhow!(
                "Source not found: {}\n\
                 HINT: Relative paths are resolved against the current directory.",
                path.display()
            )
        }
        ArchiveError::AlreadyExists { path } => {
            anyhow!(
                "Archive '{}' already exists\n\
                 HINT: Remove it first or choose another name.",
                path.display()
            )
        }
        err @ ArchiveError::Integrity { .. } => {
            anyhow!(
                "Verification failed: {err}\n\
                 HINT: The archive was modified or damaged after it was created."
            )
        }
        ArchiveError::InvalidManifest(reason) => {
            anyhow!(
                "Invalid manifest in '{}': {reason}\n\
                 HINT: The archive may be corrupted or was not created by archive-tool.",
                archive.display()
            )
        }
        ArchiveError::Read { path, reason } => {
            anyhow!(
                "Cannot read '{}': {reason}\n\
                 HINT: Supported containers: tar, tar.gz, tar.bz2, tar.xz, tar.zst.",
                path.display()
            )
        }
        ArchiveError::UnsupportedChecksum { algorithm } => {
            anyhow!(
                "Archive '{}' uses unsupported checksum algorithm '{algorithm}'\n\
                 HINT: Supported algorithms: sha256, sha512, blake3.",
                archive.display()
            )
        }
        ArchiveError::InvalidConfig(reason) => {
            anyhow!("Invalid options: {reason}")
        }
        ArchiveError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {io_err}",
                archive.display()
            )
        }
        ArchiveError::Usage(_) => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Converts a core result, attaching the archive path to any error.
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, archive))
}
