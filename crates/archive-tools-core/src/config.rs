//! Configuration for archive creation.

use crate::ArchiveError;
use crate::Result;
use crate::container::codec::CompressionCodec;
use crate::manifest::checksum::ChecksumAlgorithm;
use std::path::Path;
use std::path::PathBuf;

/// Settings for one `create` call.
///
/// # Examples
///
/// ```
/// use archive_tools_core::ChecksumAlgorithm;
/// use archive_tools_core::CompressionCodec;
/// use archive_tools_core::CreationConfig;
///
/// let config = CreationConfig::default()
///     .with_basedir("base")
///     .with_exclude("base/data/tmp")
///     .with_compression(Some(CompressionCodec::Xz))
///     .with_checksums(vec![ChecksumAlgorithm::Sha256, ChecksumAlgorithm::Blake3]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationConfig {
    /// Relative directory under which members are stored.
    ///
    /// Default: `None` (inferred from the inputs and the archive name).
    pub basedir: Option<PathBuf>,

    /// Paths to leave out of the walk, with everything below them.
    ///
    /// Default: empty.
    pub excludes: Vec<PathBuf>,

    /// Codec wrapped around the tar stream.
    ///
    /// Default: `None` (plain tar).
    pub compression: Option<CompressionCodec>,

    /// Compression level on a 1-9 scale.
    ///
    /// Default: `None` (codec default).
    pub compression_level: Option<u8>,

    /// Algorithms used to checksum regular files.
    ///
    /// Default: `[sha256]`.
    pub checksums: Vec<ChecksumAlgorithm>,

    /// Directory that relative inputs and excludes are resolved against.
    ///
    /// Default: `None` (the process working directory).
    pub workdir: Option<PathBuf>,

    /// Free text written into the manifest header.
    ///
    /// Default: `None`.
    pub comment: Option<String>,
}

impl Default for CreationConfig {
    fn default() -> Self {
        Self {
            basedir: None,
            excludes: Vec::new(),
            compression: None,
            compression_level: None,
            checksums: vec![ChecksumAlgorithm::default()],
            workdir: None,
            comment: None,
        }
    }
}

impl CreationConfig {
    /// Creates a `CreationConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory.
    #[must_use]
    pub fn with_basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.basedir = Some(basedir.into());
        self
    }

    /// Adds one exclude path.
    #[must_use]
    pub fn with_exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excludes.push(path.into());
        self
    }

    /// Replaces the exclude list.
    #[must_use]
    pub fn with_excludes(mut self, paths: Vec<PathBuf>) -> Self {
        self.excludes = paths;
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub fn with_compression(mut self, codec: Option<CompressionCodec>) -> Self {
        self.compression = codec;
        self
    }

    /// Sets the compression level (1-9).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Sets the checksum algorithms.
    #[must_use]
    pub fn with_checksums(mut self, algorithms: Vec<ChecksumAlgorithm>) -> Self {
        self.checksums = algorithms;
        self
    }

    /// Sets the working directory for relative inputs.
    #[must_use]
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Sets the manifest comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the compression level is outside 1-9 or
    /// the checksum list is empty or repeats an algorithm.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::InvalidConfig(format!(
                "compression level {level} is outside 1-9"
            )));
        }
        if self.checksums.is_empty() {
            return Err(ArchiveError::InvalidConfig(
                "at least one checksum algorithm is required".into(),
            ));
        }
        for (i, algorithm) in self.checksums.iter().enumerate() {
            if self.checksums[..i].contains(algorithm) {
                return Err(ArchiveError::InvalidConfig(format!(
                    "checksum algorithm {algorithm} listed twice"
                )));
            }
        }
        Ok(())
    }

    /// Resolves the working directory, canonicalized.
    pub(crate) fn resolve_workdir(&self) -> Result<PathBuf> {
        let dir = match &self.workdir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        canonical_dir(&dir)
    }
}

fn canonical_dir(dir: &Path) -> Result<PathBuf> {
    let canonical = dir.canonicalize().map_err(|e| {
        ArchiveError::InvalidConfig(format!("working directory {}: {e}", dir.display()))
    })?;
    if !canonical.is_dir() {
        return Err(ArchiveError::InvalidConfig(format!(
            "working directory {} is not a directory",
            dir.display()
        )));
    }
    Ok(canonical)
}
