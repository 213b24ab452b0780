//! Manifest entries and their construction from the filesystem.

use crate::ArchiveError;
use crate::Result;
use crate::manifest::checksum::ChecksumAlgorithm;
use crate::manifest::checksum::Checksums;
use crate::manifest::checksum::checksum_reader;
use std::fs::File;
use std::fs::Metadata;
use std::path::Path;
use std::path::PathBuf;

/// Type-specific part of a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory.
    Directory,

    /// Regular file with its size and content digests.
    File {
        /// Size in bytes.
        size: u64,
        /// Digests keyed by algorithm name.
        checksum: Checksums,
    },

    /// Symbolic link, stored as-is and never followed.
    Symlink {
        /// Link target exactly as read from the filesystem.
        target: PathBuf,
    },
}

impl EntryKind {
    /// Returns the type name used in the manifest document.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Directory => "dir",
            Self::File { .. } => "file",
            Self::Symlink { .. } => "symlink",
        }
    }
}

/// One declared archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Filesystem path as given at creation (absolute or relative).
    pub path: PathBuf,

    /// Permission bits (`st_mode & 0o7777`).
    pub mode: u32,

    /// Modification time in whole seconds since the epoch.
    pub mtime: i64,

    /// Type and type-specific fields.
    pub kind: EntryKind,
}

impl ManifestEntry {
    /// Reads an entry from the filesystem.
    ///
    /// `path` is the path recorded in the manifest, `fs_path` is where the
    /// object actually lives (they differ when relative inputs are resolved
    /// against a working directory). Regular files are hashed with every
    /// algorithm in `algorithms` while streaming their content.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for anything other than a directory, regular
    /// file or symbolic link, `InvalidPath` if the path or link target is not
    /// valid UTF-8, and I/O errors from reading metadata or content.
    pub fn from_filesystem(
        path: &Path,
        fs_path: &Path,
        algorithms: &[ChecksumAlgorithm],
    ) -> Result<Self> {
        require_utf8(path, path)?;

        let metadata = std::fs::symlink_metadata(fs_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ArchiveError::SourceNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ArchiveError::Io(e)
            }
        })?;
        let file_type = metadata.file_type();

        let kind = if file_type.is_symlink() {
            let target = std::fs::read_link(fs_path)?;
            require_utf8(path, &target)?;
            EntryKind::Symlink { target }
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            let file = File::open(fs_path)?;
            let (checksum, size) = checksum_reader(file, algorithms)?;
            EntryKind::File { size, checksum }
        } else {
            return Err(ArchiveError::UnsupportedType {
                path: path.to_path_buf(),
            });
        };

        Ok(Self {
            path: path.to_path_buf(),
            mode: file_mode(&metadata),
            mtime: file_mtime(&metadata),
            kind,
        })
    }

    /// Returns the type name used in the manifest document.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns `true` for directory entries.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Returns `true` for regular file entries.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File { .. })
    }

    /// Returns `true` for symbolic link entries.
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }

    /// Size in bytes, for regular files.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        match self.kind {
            EntryKind::File { size, .. } => Some(size),
            _ => None,
        }
    }

    /// Recorded digests, for regular files.
    #[must_use]
    pub const fn checksum(&self) -> Option<&Checksums> {
        match &self.kind {
            EntryKind::File { checksum, .. } => Some(checksum),
            _ => None,
        }
    }

    /// Link target, for symbolic links.
    #[must_use]
    pub fn target(&self) -> Option<&Path> {
        match &self.kind {
            EntryKind::Symlink { target } => Some(target),
            _ => None,
        }
    }
}

fn require_utf8(path: &Path, value: &Path) -> Result<()> {
    if value.to_str().is_none() {
        return Err(ArchiveError::InvalidPath {
            path: path.to_path_buf(),
            reason: "not valid UTF-8".into(),
        });
    }
    Ok(())
}

/// Permission bits of a filesystem object.
#[cfg(unix)]
pub(crate) fn file_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode() & 0o7777
}

#[cfg(not(unix))]
pub(crate) fn file_mode(metadata: &Metadata) -> u32 {
    let base = if metadata.is_dir() { 0o755 } else { 0o644 };
    if metadata.permissions().readonly() {
        base & !0o222
    } else {
        base
    }
}

/// Modification time truncated to whole seconds.
#[cfg(unix)]
pub(crate) fn file_mtime(metadata: &Metadata) -> i64 {
    use std::os::unix::fs::MetadataExt;
    metadata.mtime()
}

#[cfg(not(unix))]
pub(crate) fn file_mtime(metadata: &Metadata) -> i64 {
    let Ok(modified) = metadata.modified() else {
        return 0;
    };
    match modified.duration_since(std::time::UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => {
            // round down, matching the unix st_mtime seconds
            let before = before.duration();
            let secs = before.as_secs() + u64::from(before.subsec_nanos() > 0);
            i64::try_from(secs).map_or(i64::MIN, |s| -s)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_regular_file_entry() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("msg.txt");
        fs::write(&file, "hello").unwrap();

        let entry = ManifestEntry::from_filesystem(
            Path::new("base/msg.txt"),
            &file,
            &[ChecksumAlgorithm::Sha256],
        )
        .unwrap();

        assert_eq!(entry.path, Path::new("base/msg.txt"));
        assert_eq!(entry.type_name(), "file");
        assert_eq!(entry.size(), Some(5));
        assert_eq!(
            entry.checksum().unwrap()["sha256"],
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert!(entry.target().is_none());
    }

    #[test]
    fn test_directory_entry() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("data");
        fs::create_dir(&dir).unwrap();

        let entry = ManifestEntry::from_filesystem(Path::new("base/data"), &dir, &[]).unwrap();
        assert!(entry.is_dir());
        assert_eq!(entry.size(), None);
        assert_eq!(entry.checksum(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_and_mtime() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("rnd.dat");
        fs::write(&file, [0u8; 16]).unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o600)).unwrap();

        let entry = ManifestEntry::from_filesystem(Path::new("rnd.dat"), &file, &[]).unwrap();
        assert_eq!(entry.mode, 0o600);

        let expected = fs::metadata(&file)
            .unwrap()
            .modified()
            .unwrap()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert_eq!(entry.mtime, i64::try_from(expected).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_entry_is_not_followed() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("s.dat");
        std::os::unix::fs::symlink("data/rnd1.dat", &link).unwrap();

        let entry = ManifestEntry::from_filesystem(Path::new("base/s.dat"), &link, &[]).unwrap();
        assert!(entry.is_symlink());
        assert_eq!(entry.target(), Some(Path::new("data/rnd1.dat")));
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_unsupported() {
        let temp = TempDir::new().unwrap();
        let fifo = temp.path().join("fifo");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        let err = ManifestEntry::from_filesystem(Path::new("base/fifo"), &fifo, &[]).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedType { .. }));
    }

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = ManifestEntry::from_filesystem(
            Path::new("base/nope"),
            &temp.path().join("nope"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ArchiveError::SourceNotFound { .. }));
    }
}
