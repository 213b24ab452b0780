//! Error types for archive creation and verification.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while creating, opening or verifying an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No input paths were given.
    #[error("refusing to create an empty archive")]
    EmptyArchive,

    /// An input or exclude path is not in normalized form.
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// Absolute and relative input paths were mixed in one archive.
    #[error("mixing of absolute and relative paths is not allowed")]
    MixedPaths,

    /// The base directory is absolute, unnormalized or not a directory.
    #[error("invalid base directory {basedir}: {reason}")]
    InvalidBasedir {
        /// The rejected base directory.
        basedir: PathBuf,
        /// Why the base directory was rejected.
        reason: String,
    },

    /// A relative input path lies outside the base directory.
    #[error("invalid path {path}: must be a subpath of base directory {basedir}")]
    PathNotInBasedir {
        /// The input path.
        path: PathBuf,
        /// The base directory it should live under.
        basedir: PathBuf,
    },

    /// An input path would collide with a reserved member name.
    #[error("cannot add {path}: this filename is reserved")]
    ReservedName {
        /// The colliding member name.
        path: PathBuf,
    },

    /// The filesystem object is neither a directory, a regular file nor a
    /// symbolic link.
    #[error("{path}: unsupported file type")]
    UnsupportedType {
        /// The offending path.
        path: PathBuf,
    },

    /// An input path does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The archive path already exists and was left untouched.
    #[error("archive {path} already exists")]
    AlreadyExists {
        /// The existing path.
        path: PathBuf,
    },

    /// Archive contents do not match the manifest, or the manifest itself is
    /// missing or corrupt.
    #[error("{archive}: {}{reason}", member_prefix(.path))]
    Integrity {
        /// The archive being checked.
        archive: PathBuf,
        /// The offending member, when the error concerns one member.
        path: Option<PathBuf>,
        /// What did not match.
        reason: String,
    },

    /// A manifest document cannot be parsed or is internally inconsistent.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// An operation was attempted on an archive in the wrong state.
    #[error("{0}")]
    Usage(String),

    /// The container cannot be opened or read.
    #[error("cannot read {path}: {reason}")]
    Read {
        /// The archive path.
        path: PathBuf,
        /// The underlying failure.
        reason: String,
    },

    /// A checksum algorithm name is not supported.
    #[error("unsupported checksum algorithm: {algorithm}")]
    UnsupportedChecksum {
        /// The unknown algorithm name.
        algorithm: String,
    },

    /// Creation settings are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[allow(clippy::ref_option)]
fn member_prefix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(String::new, |p| format!("{}: ", p.display()))
}

impl ArchiveError {
    /// Creates an integrity error for one archive member.
    pub(crate) fn integrity(archive: &Path, path: &Path, reason: impl Into<String>) -> Self {
        Self::Integrity {
            archive: archive.to_path_buf(),
            path: Some(path.to_path_buf()),
            reason: reason.into(),
        }
    }

    /// Creates an integrity error concerning the archive as a whole.
    pub(crate) fn integrity_archive(archive: &Path, reason: impl Into<String>) -> Self {
        Self::Integrity {
            archive: archive.to_path_buf(),
            path: None,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error was raised while validating creation
    /// input, before anything was written.
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_tools_core::ArchiveError;
    ///
    /// assert!(ArchiveError::MixedPaths.is_validation_error());
    /// assert!(!ArchiveError::Usage("archive is closed".into()).is_validation_error());
    /// ```
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyArchive
                | Self::InvalidPath { .. }
                | Self::MixedPaths
                | Self::InvalidBasedir { .. }
                | Self::PathNotInBasedir { .. }
                | Self::ReservedName { .. }
                | Self::UnsupportedType { .. }
                | Self::SourceNotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::UnsupportedChecksum { .. }
                | Self::InvalidConfig(_)
        )
    }

    /// Returns `true` if this error reports a mismatch between an archive
    /// and its manifest.
    #[must_use]
    pub const fn is_integrity_error(&self) -> bool {
        matches!(self, Self::Integrity { .. } | Self::InvalidManifest(_))
    }

    /// Returns the path of the entry this error is about, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_tools_core::ArchiveError;
    /// use std::path::{Path, PathBuf};
    ///
    /// let err = ArchiveError::UnsupportedType {
    ///     path: PathBuf::from("base/fifo"),
    /// };
    /// assert_eq!(err.entry_path(), Some(Path::new("base/fifo")));
    /// assert_eq!(ArchiveError::EmptyArchive.entry_path(), None);
    /// ```
    #[must_use]
    pub fn entry_path(&self) -> Option<&Path> {
        match self {
            Self::InvalidPath { path, .. }
            | Self::PathNotInBasedir { path, .. }
            | Self::ReservedName { path }
            | Self::UnsupportedType { path }
            | Self::SourceNotFound { path } => Some(path),
            Self::Integrity { path, .. } => path.as_deref(),
            _ => None,
        }
    }
}
