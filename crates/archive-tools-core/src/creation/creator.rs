//! Builder for creating archives with fluent API.

use std::path::Path;
use std::path::PathBuf;

use crate::Archive;
use crate::ArchiveError;
use crate::Result;
use crate::config::CreationConfig;
use crate::container::CompressionCodec;
use crate::creation::progress::NoopProgress;
use crate::creation::progress::ProgressCallback;
use crate::creation::report::CreationReport;
use crate::manifest::checksum::ChecksumAlgorithm;

/// Builder for creating archives with fluent API.
///
/// # Examples
///
/// ```no_run
/// use archive_tools_core::ArchiveCreator;
///
/// let report = ArchiveCreator::new()
///     .output("base.tar.gz")
///     .add_source("base/data")
///     .add_source("base/msg.txt")
///     .exclude("base/data/tmp")
///     .compression_level(9)
///     .create()?;
///
/// println!("Created archive with {} files", report.files_added);
/// # Ok::<(), archive_tools_core::ArchiveError>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveCreator {
    output_path: Option<PathBuf>,
    sources: Vec<PathBuf>,
    metadata: Vec<(String, Vec<u8>)>,
    config: CreationConfig,
    explicit_codec: bool,
}

impl ArchiveCreator {
    /// Creates a new `ArchiveCreator` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output archive path.
    ///
    /// Unless [`ArchiveCreator::compression`] is called, the codec is
    /// chosen from the file extension, falling back to gzip.
    #[must_use]
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a source file or directory.
    #[must_use]
    pub fn add_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds multiple source files or directories.
    #[must_use]
    pub fn sources<P: AsRef<Path>>(mut self, paths: &[P]) -> Self {
        self.sources
            .extend(paths.iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Sets the full configuration.
    #[must_use]
    pub fn config(mut self, config: CreationConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the base directory.
    #[must_use]
    pub fn basedir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.basedir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds an exclude path.
    #[must_use]
    pub fn exclude<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.excludes.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets the codec explicitly; `None` writes a plain tar.
    #[must_use]
    pub fn compression(mut self, codec: Option<CompressionCodec>) -> Self {
        self.config.compression = codec;
        self.explicit_codec = true;
        self
    }

    /// Sets the compression level (1-9).
    #[must_use]
    pub fn compression_level(mut self, level: u8) -> Self {
        self.config.compression_level = Some(level);
        self
    }

    /// Replaces the checksum algorithms.
    #[must_use]
    pub fn checksums(mut self, algorithms: Vec<ChecksumAlgorithm>) -> Self {
        self.config.checksums = algorithms;
        self
    }

    /// Sets the manifest comment.
    #[must_use]
    pub fn comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.config.comment = Some(comment.into());
        self
    }

    /// Sets the directory relative sources are resolved against.
    #[must_use]
    pub fn workdir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.workdir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a metadata member.
    #[must_use]
    pub fn metadata<S: Into<String>, D: Into<Vec<u8>>>(mut self, name: S, data: D) -> Self {
        self.metadata.push((name.into(), data.into()));
        self
    }

    /// Creates the archive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if no output path is set, and every error
    /// [`Archive::create`] returns.
    pub fn create(self) -> Result<CreationReport> {
        self.create_with_progress(&mut NoopProgress)
    }

    /// Creates the archive, reporting progress.
    ///
    /// # Errors
    ///
    /// See [`ArchiveCreator::create`].
    pub fn create_with_progress(
        mut self,
        progress: &mut dyn ProgressCallback,
    ) -> Result<CreationReport> {
        let output_path = self
            .output_path
            .ok_or_else(|| ArchiveError::InvalidConfig("output path not set".into()))?;

        if !self.explicit_codec && self.config.compression.is_none() {
            self.config.compression = codec_for(&output_path);
        }

        let mut archive = Archive::new(&output_path);
        for (name, data) in self.metadata {
            archive.add_metadata(&name, data)?;
        }
        archive.create_with_progress(&self.sources, &self.config, progress)
    }
}

/// Codec implied by the archive file name; gzip when it names none.
#[must_use]
pub fn codec_for(path: &Path) -> Option<CompressionCodec> {
    CompressionCodec::from_path(path).unwrap_or(Some(CompressionCodec::Gzip))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;
    use tempfile::TempDir;

    #[test]
    fn test_builder_basic() {
        let creator = ArchiveCreator::new()
            .output("test.tar.gz")
            .add_source("base");

        assert_eq!(creator.output_path, Some(PathBuf::from("test.tar.gz")));
        assert_eq!(creator.sources, vec![PathBuf::from("base")]);
    }

    #[test]
    fn test_builder_config_methods() {
        let creator = ArchiveCreator::new()
            .sources(&["base/a", "base/b"])
            .basedir("base")
            .exclude("base/a/tmp")
            .compression(Some(CompressionCodec::Xz))
            .compression_level(9)
            .checksums(vec![ChecksumAlgorithm::Blake3])
            .comment("nightly");

        assert_eq!(creator.sources.len(), 2);
        assert_eq!(creator.config.basedir, Some(PathBuf::from("base")));
        assert_eq!(creator.config.excludes, vec![PathBuf::from("base/a/tmp")]);
        assert_eq!(creator.config.compression, Some(CompressionCodec::Xz));
        assert_eq!(creator.config.compression_level, Some(9));
        assert_eq!(creator.config.checksums, vec![ChecksumAlgorithm::Blake3]);
        assert_eq!(creator.config.comment.as_deref(), Some("nightly"));
    }

    #[test]
    fn test_builder_no_output_error() {
        let result = ArchiveCreator::new().add_source("base").create();
        assert!(matches!(result, Err(ArchiveError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_no_sources_error() {
        let out = TempDir::new().unwrap();
        let result = ArchiveCreator::new()
            .output(out.path().join("a.tar"))
            .workdir(out.path())
            .create();
        assert!(matches!(result, Err(ArchiveError::EmptyArchive)));
    }

    #[test]
    fn test_codec_for() {
        assert_eq!(codec_for(Path::new("a.tar")), None);
        assert_eq!(codec_for(Path::new("a.tgz")), Some(CompressionCodec::Gzip));
        assert_eq!(codec_for(Path::new("a.tar.zst")), Some(CompressionCodec::Zstd));
        assert_eq!(codec_for(Path::new("a.backup")), Some(CompressionCodec::Gzip));
    }

    #[test]
    fn test_codec_inferred_from_extension() {
        let tree = TestTree::new()
            .dir("base", 0o755)
            .file("base/msg.txt", 0o644, b"Hello world!\n")
            .build();
        let out = TempDir::new().unwrap();
        let path = out.path().join("base.tar.xz");

        ArchiveCreator::new()
            .output(&path)
            .add_source("base")
            .workdir(tree.root())
            .metadata("notes", "x")
            .create()
            .unwrap();

        let magic = std::fs::read(&path).unwrap();
        assert_eq!(
            CompressionCodec::detect(&magic[..6]),
            Some(CompressionCodec::Xz)
        );
    }
}
