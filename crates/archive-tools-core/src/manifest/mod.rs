//! The manifest: an ordered record of every archive member.
//!
//! Entries are kept in insertion order, which is also the order in which
//! members are written to the container. Paths are unique within one
//! manifest.

pub mod checksum;
pub mod document;
pub mod entry;

use crate::ArchiveError;
use crate::Result;
use checksum::ChecksumAlgorithm;
use document::ManifestHead;
use entry::ManifestEntry;
use std::collections::HashMap;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// File name of the manifest member, stored directly below the base
/// directory as the first member of every archive.
pub const MANIFEST_NAME: &str = ".manifest.toml";

/// Ordered collection of manifest entries with lookup by path.
///
/// # Examples
///
/// ```no_run
/// use archive_tools_core::ChecksumAlgorithm;
/// use archive_tools_core::Manifest;
/// use std::path::Path;
///
/// let mut manifest = Manifest::new(&[ChecksumAlgorithm::Sha256]);
/// manifest.add(Path::new("base/msg.txt"), Path::new("/data/base/msg.txt"))?;
///
/// let mut out = Vec::new();
/// manifest.write(&mut out)?;
/// let copy = Manifest::read(&out[..])?;
/// assert_eq!(copy.entries(), manifest.entries());
/// # Ok::<(), archive_tools_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Manifest {
    head: ManifestHead,
    algorithms: Vec<ChecksumAlgorithm>,
    comment: Option<String>,
    entries: Vec<ManifestEntry>,
    index: HashMap<PathBuf, usize>,
}

impl Manifest {
    /// Creates an empty manifest hashing regular files with `algorithms`.
    #[must_use]
    pub fn new(algorithms: &[ChecksumAlgorithm]) -> Self {
        let head = ManifestHead {
            checksums: algorithms.iter().map(|a| a.name().to_string()).collect(),
            ..ManifestHead::default()
        };
        Self {
            head,
            algorithms: algorithms.to_vec(),
            comment: None,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Classifies the object at `fs_path`, hashes it if it is a regular file,
    /// and appends it under `path`.
    ///
    /// # Errors
    ///
    /// Fails on unsupported file types, duplicate paths and I/O errors.
    pub fn add(&mut self, path: &Path, fs_path: &Path) -> Result<&ManifestEntry> {
        let entry = ManifestEntry::from_filesystem(path, fs_path, &self.algorithms)?;
        self.push(entry)?;
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Appends an already constructed entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if an entry with the same path exists.
    pub fn push(&mut self, entry: ManifestEntry) -> Result<()> {
        if self.index.contains_key(&entry.path) {
            return Err(ArchiveError::InvalidPath {
                path: entry.path,
                reason: "duplicate manifest entry".into(),
            });
        }
        self.index.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Looks up an entry by exact path.
    #[must_use]
    pub fn find(&self, path: &Path) -> Option<&ManifestEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Document-level information.
    #[must_use]
    pub const fn head(&self) -> &ManifestHead {
        &self.head
    }

    /// Algorithms used when hashing new entries.
    #[must_use]
    pub fn algorithms(&self) -> &[ChecksumAlgorithm] {
        &self.algorithms
    }

    /// Sets the free-text comment written into the document header.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Records the name of an extra metadata member.
    pub(crate) fn add_metadata_name(&mut self, name: &str) {
        self.head.metadata.push(name.to_string());
    }

    /// Serializes the manifest as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W: Write>(&self, mut sink: W) -> Result<()> {
        let text = document::render(&self.head, &self.entries, self.comment.as_deref())?;
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Deserializes a manifest written by [`Manifest::write`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidManifest` if the document is not valid UTF-8, cannot
    /// be parsed, declares an unsupported version, contains an unknown entry
    /// type or repeats a path.
    pub fn read<R: Read>(mut source: R) -> Result<Self> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ArchiveError::InvalidManifest("not valid UTF-8".into()))?;

        let (head, entries) = document::parse(&text)?;
        let algorithms = head
            .checksums
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();

        let mut manifest = Self {
            head,
            algorithms,
            comment: None,
            entries: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
        };
        for entry in entries {
            manifest.push(entry).map_err(|e| match e {
                ArchiveError::InvalidPath { path, reason } => {
                    ArchiveError::InvalidManifest(format!("{}: {reason}", path.display()))
                }
                other => other,
            })?;
        }
        Ok(manifest)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
