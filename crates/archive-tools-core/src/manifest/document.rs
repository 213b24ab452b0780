//! TOML representation of a manifest.
//!
//! The document starts with a comment line carrying the format version,
//! optionally followed by free-text comment lines, then a `[head]` table and
//! one `[[entry]]` table per member in insertion order:
//!
//! ```text
//! # archive-tools manifest 1.0
//! # nightly backup
//! [head]
//! version = "1.0"
//! generator = "archive-tools 0.1.0"
//! date = "2024-05-01T12:00:00Z"
//! checksums = ["sha256"]
//! metadata = []
//!
//! [[entry]]
//! path = "base"
//! type = "dir"
//! mode = 493
//! mtime = 1714564800
//! ```

use crate::ArchiveError;
use crate::Result;
use crate::manifest::checksum::Checksums;
use crate::manifest::entry::EntryKind;
use crate::manifest::entry::ManifestEntry;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// Manifest format version written by this crate.
pub const FORMAT_VERSION: &str = "1.0";

/// Prefix of the header line that carries the format version.
pub const HEADER_PREFIX: &str = "# archive-tools manifest ";

const SUPPORTED_MAJOR: &str = "1";

/// Document-level information about a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHead {
    /// Format version.
    pub version: String,

    /// Program that wrote the manifest.
    #[serde(default)]
    pub generator: String,

    /// Creation time, RFC 3339.
    #[serde(default)]
    pub date: String,

    /// Names of the checksum algorithms used for regular files.
    #[serde(default)]
    pub checksums: Vec<String>,

    /// Names of extra metadata members stored next to the manifest.
    #[serde(default)]
    pub metadata: Vec<String>,
}

impl Default for ManifestHead {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            generator: concat!("archive-tools ", env!("CARGO_PKG_VERSION")).to_string(),
            date: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            checksums: Vec::new(),
            metadata: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    head: ManifestHead,
    #[serde(default)]
    entry: Vec<Record>,
}

/// Flat on-disk shape of one entry; type-specific fields are optional here
/// and checked when converting to [`ManifestEntry`].
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    mode: u32,
    mtime: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checksum: Option<Checksums>,
}

impl From<&ManifestEntry> for Record {
    fn from(entry: &ManifestEntry) -> Self {
        let (size, target, checksum) = match &entry.kind {
            EntryKind::Directory => (None, None, None),
            EntryKind::File { size, checksum } => (Some(*size), None, Some(checksum.clone())),
            EntryKind::Symlink { target } => {
                (None, Some(target.to_string_lossy().into_owned()), None)
            }
        };
        Self {
            path: entry.path.to_string_lossy().into_owned(),
            kind: entry.type_name().to_string(),
            mode: entry.mode,
            mtime: entry.mtime,
            size,
            target,
            checksum,
        }
    }
}

impl TryFrom<Record> for ManifestEntry {
    type Error = ArchiveError;

    fn try_from(record: Record) -> Result<Self> {
        let invalid = |reason: String| ArchiveError::InvalidManifest(reason);
        let kind = match record.kind.as_str() {
            "dir" => EntryKind::Directory,
            "file" => EntryKind::File {
                size: record
                    .size
                    .ok_or_else(|| invalid(format!("{}: file entry without size", record.path)))?,
                checksum: record.checksum.ok_or_else(|| {
                    invalid(format!("{}: file entry without checksum", record.path))
                })?,
            },
            "symlink" => EntryKind::Symlink {
                target: record
                    .target
                    .map(PathBuf::from)
                    .ok_or_else(|| invalid(format!("{}: symlink without target", record.path)))?,
            },
            other => return Err(invalid(format!("{}: invalid type '{other}'", record.path))),
        };
        Ok(Self {
            path: PathBuf::from(record.path),
            mode: record.mode,
            mtime: record.mtime,
            kind,
        })
    }
}

/// Renders a manifest document.
pub(crate) fn render(
    head: &ManifestHead,
    entries: &[ManifestEntry],
    comment: Option<&str>,
) -> Result<String> {
    let document = Document {
        head: head.clone(),
        entry: entries.iter().map(Record::from).collect(),
    };
    let body = toml::to_string(&document)
        .map_err(|e| ArchiveError::InvalidManifest(format!("cannot serialize: {e}")))?;

    let mut text = format!("{HEADER_PREFIX}{}\n", head.version);
    if let Some(comment) = comment {
        for line in comment.lines() {
            text.push_str("# ");
            text.push_str(line);
            text.push('\n');
        }
    }
    text.push_str(&body);
    Ok(text)
}

/// Parses a manifest document into its head and ordered entries.
pub(crate) fn parse(text: &str) -> Result<(ManifestHead, Vec<ManifestEntry>)> {
    let sniffed = sniff_version(text);
    let document: Document = toml::from_str(text)
        .map_err(|e| ArchiveError::InvalidManifest(format!("cannot parse: {e}")))?;

    let version = sniffed.unwrap_or(document.head.version.as_str());
    if version.split('.').next() != Some(SUPPORTED_MAJOR) {
        return Err(ArchiveError::InvalidManifest(format!(
            "unsupported manifest version {version}"
        )));
    }

    let entries = document
        .entry
        .into_iter()
        .map(ManifestEntry::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok((document.head, entries))
}

/// Extracts the format version from the leading header line, if present.
///
/// # Examples
///
/// ```
/// use archive_tools_core::manifest::document::sniff_version;
///
/// assert_eq!(sniff_version("# archive-tools manifest 1.0\n[head]\n"), Some("1.0"));
/// assert_eq!(sniff_version("[head]\nversion = \"1.0\"\n"), None);
/// ```
#[must_use]
pub fn sniff_version(text: &str) -> Option<&str> {
    text.lines()
        .next()
        .and_then(|line| line.strip_prefix(HEADER_PREFIX))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
