//! Test utilities for building source trees and checking manifests.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::Manifest;
use crate::manifest::checksum::ChecksumAlgorithm;
use crate::manifest::checksum::checksum_reader;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// One object of a test tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestItem {
    /// Directory with permission bits.
    Dir {
        /// Path relative to the tree root.
        path: PathBuf,
        /// Permission bits.
        mode: u32,
    },
    /// Regular file with permission bits and content.
    File {
        /// Path relative to the tree root.
        path: PathBuf,
        /// Permission bits.
        mode: u32,
        /// File content.
        content: Vec<u8>,
    },
    /// Symbolic link.
    Symlink {
        /// Path relative to the tree root.
        path: PathBuf,
        /// Link target.
        target: PathBuf,
    },
}

impl TestItem {
    /// Path relative to the tree root.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Dir { path, .. } | Self::File { path, .. } | Self::Symlink { path, .. } => path,
        }
    }
}

/// Builder for a source tree in a temporary directory.
///
/// Directory permissions are applied after all content is written, so
/// read-only directories can still be populated.
///
/// # Examples
///
/// ```
/// use archive_tools_core::test_utils::TestTree;
///
/// let tree = TestTree::new()
///     .dir("base", 0o755)
///     .file("base/msg.txt", 0o644, b"Hello world!\n")
///     .build();
/// assert!(tree.root().join("base/msg.txt").is_file());
/// ```
#[derive(Debug)]
pub struct TestTree {
    _dir: TempDir,
    root: PathBuf,
    items: Vec<TestItem>,
}

impl TestTree {
    /// Creates an empty tree in a new temporary directory.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        Self {
            _dir: dir,
            root,
            items: Vec::new(),
        }
    }

    /// Adds a directory.
    #[must_use]
    pub fn dir(mut self, path: &str, mode: u32) -> Self {
        self.items.push(TestItem::Dir {
            path: PathBuf::from(path),
            mode,
        });
        self
    }

    /// Adds a regular file.
    #[must_use]
    pub fn file(mut self, path: &str, mode: u32, content: &[u8]) -> Self {
        self.items.push(TestItem::File {
            path: PathBuf::from(path),
            mode,
            content: content.to_vec(),
        });
        self
    }

    /// Adds a regular file of `size` pseudo-random bytes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn random_file(self, path: &str, mode: u32, size: usize) -> Self {
        let mut state = size as u64 ^ 0x9e37_79b9_7f4a_7c15;
        let content: Vec<u8> = (0..size)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                (state >> 56) as u8
            })
            .collect();
        self.file(path, mode, &content)
    }

    /// Adds a symbolic link.
    #[must_use]
    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        self.items.push(TestItem::Symlink {
            path: PathBuf::from(path),
            target: PathBuf::from(target),
        });
        self
    }

    /// Creates every item on disk.
    #[must_use]
    pub fn build(self) -> Self {
        for item in &self.items {
            let path = self.root.join(item.path());
            match item {
                TestItem::Dir { .. } => fs::create_dir_all(&path).unwrap(),
                TestItem::File { mode, content, .. } => {
                    fs::write(&path, content).unwrap();
                    set_mode(&path, *mode);
                }
                TestItem::Symlink { target, .. } => make_symlink(target, &path),
            }
        }
        for item in self.items.iter().rev() {
            if let TestItem::Dir { path, mode } = item {
                set_mode(&self.root.join(path), *mode);
            }
        }
        self
    }

    /// Canonical root of the tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every item in insertion order.
    #[must_use]
    pub fn items(&self) -> &[TestItem] {
        &self.items
    }

    /// Items that survive `excludes`, with `includes` taking precedence.
    ///
    /// Mirrors the expected selection for a walk of the whole tree.
    #[must_use]
    pub fn selected(&self, excludes: &[&str], includes: &[&str]) -> Vec<&TestItem> {
        self.items
            .iter()
            .filter(|item| {
                let path = item.path();
                !excludes.iter().any(|e| path.starts_with(e))
                    || includes.iter().any(|i| path.starts_with(i))
            })
            .collect()
    }

    /// Items at or below `prefix`.
    #[must_use]
    pub fn below(&self, prefix: &str) -> Vec<&TestItem> {
        self.items
            .iter()
            .filter(|item| item.path().starts_with(prefix))
            .collect()
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Asserts that `manifest` holds exactly `items`, with paths prefixed by
/// `prefix` when inputs were absolute.
pub fn assert_manifest(manifest: &Manifest, items: &[&TestItem], prefix: Option<&Path>) {
    assert_eq!(manifest.len(), items.len(), "number of manifest entries");
    for item in items {
        let path = prefix.map_or_else(|| item.path().to_path_buf(), |p| p.join(item.path()));
        let entry = manifest
            .find(&path)
            .unwrap_or_else(|| panic!("{} missing from manifest", path.display()));
        match item {
            TestItem::Dir { mode, .. } => {
                assert!(entry.is_dir(), "{} is not a directory", path.display());
                assert_eq!(entry.mode, *mode, "mode of {}", path.display());
            }
            TestItem::File { mode, content, .. } => {
                assert!(entry.is_file(), "{} is not a file", path.display());
                assert_eq!(entry.mode, *mode, "mode of {}", path.display());
                assert_eq!(entry.size(), Some(content.len() as u64));
                let (expected, _) =
                    checksum_reader(&content[..], &[ChecksumAlgorithm::Sha256]).unwrap();
                assert_eq!(
                    entry.checksum().unwrap().get("sha256"),
                    expected.get("sha256"),
                    "checksum of {}",
                    path.display()
                );
            }
            TestItem::Symlink { target, .. } => {
                assert!(entry.is_symlink(), "{} is not a symlink", path.display());
                assert_eq!(entry.target(), Some(target.as_path()));
            }
        }
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) {
    let mut permissions = fs::metadata(path).unwrap().permissions();
    permissions.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, permissions).unwrap();
}

#[cfg(unix)]
fn make_symlink(target: &Path, path: &Path) {
    std::os::unix::fs::symlink(target, path).unwrap();
}

#[cfg(windows)]
fn make_symlink(target: &Path, path: &Path) {
    std::os::windows::fs::symlink_file(target, path).unwrap();
}
