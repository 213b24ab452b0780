//! High-level public API for archive creation and verification.

use std::path::Path;
use std::path::PathBuf;

use crate::Archive;
use crate::Result;
use crate::config::CreationConfig;
use crate::creation::CreationReport;
use crate::inspection::VerificationReport;

/// Creates an archive from source files and directories.
///
/// Sources must be either all relative (resolved against
/// `config.workdir`) or all absolute.
///
/// # Errors
///
/// Returns a validation error before anything is written if the inputs are
/// rejected, `AlreadyExists` if `output_path` exists, and I/O errors from
/// reading sources or writing the archive.
///
/// # Examples
///
/// ```no_run
/// use archive_tools_core::CreationConfig;
/// use archive_tools_core::create_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CreationConfig::default().with_exclude("base/tmp");
/// let report = create_archive("base.tar.gz", &["base"], &config)?;
/// println!("Created archive with {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn create_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    output_path: P,
    sources: &[Q],
    config: &CreationConfig,
) -> Result<CreationReport> {
    let sources: Vec<PathBuf> = sources.iter().map(|s| s.as_ref().to_path_buf()).collect();
    Archive::new(output_path).create(&sources, config)
}

/// Opens an archive and verifies every member against its manifest.
///
/// # Errors
///
/// Returns `Read` if the archive cannot be read, and `Integrity` or
/// `InvalidManifest` if it does not match its manifest.
///
/// # Examples
///
/// ```no_run
/// use archive_tools_core::verify_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = verify_archive("base.tar.gz")?;
/// println!("{} members ok", report.members_checked);
/// # Ok(())
/// # }
/// ```
pub fn verify_archive<P: AsRef<Path>>(archive_path: P) -> Result<VerificationReport> {
    Archive::open(archive_path)?.verify()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;
    use tempfile::TempDir;

    #[test]
    fn test_create_then_verify() {
        let tree = TestTree::new()
            .dir("base", 0o755)
            .file("base/msg.txt", 0o644, b"Hello world!\n")
            .build();
        let out = TempDir::new().unwrap();
        let path = out.path().join("base.tar.bz2");
        let config = CreationConfig::default()
            .with_workdir(tree.root())
            .with_compression(Some(crate::CompressionCodec::Bzip2));

        let created = create_archive(&path, &["base"], &config).unwrap();
        let verified = verify_archive(&path).unwrap();
        assert_eq!(created.total_items(), verified.members_checked);
    }

    #[test]
    fn test_verify_missing_file() {
        let out = TempDir::new().unwrap();
        let err = verify_archive(out.path().join("nope.tar")).unwrap_err();
        assert!(matches!(err, crate::ArchiveError::Read { .. }));
    }
}
