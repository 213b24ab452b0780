//! Archive creation reporting.

use std::time::Duration;

/// Report of an archive creation operation.
///
/// # Examples
///
/// ```
/// use archive_tools_core::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_read = 1024;
/// report.archive_size = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Number of regular files added.
    pub files_added: usize,

    /// Number of directories added.
    pub directories_added: usize,

    /// Number of symbolic links added.
    pub symlinks_added: usize,

    /// Number of metadata members added, not counting the manifest.
    pub metadata_added: usize,

    /// Bytes of file content read from the sources.
    pub bytes_read: u64,

    /// Size of the finished archive file.
    pub archive_size: u64,

    /// Duration of the creation operation.
    pub duration: Duration,

    /// Warnings generated during creation.
    pub warnings: Vec<String>,
}

impl CreationReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of manifest entries written.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added
    }

    /// Returns the ratio of content bytes to archive bytes.
    ///
    /// Returns 0.0 if either side is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.archive_size == 0 || self.bytes_read == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.archive_size as f64
    }

    /// Returns the space saved as a percentage of the content bytes.
    ///
    /// Returns 0.0 if nothing was read. Container overhead can make the
    /// archive larger than its content, in which case the result is 0.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_read == 0 || self.archive_size >= self.bytes_read {
            return 0.0;
        }
        (1.0 - self.archive_size as f64 / self.bytes_read as f64) * 100.0
    }
}
