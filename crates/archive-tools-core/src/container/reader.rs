//! Container reader with a header index.
//!
//! Compressed tar streams are not seekable, so every pass over member data
//! rewinds the file and decodes from the start. Headers are indexed once when
//! the reader is opened.

use crate::ArchiveError;
use crate::Result;
use crate::container::codec::CompressionCodec;
use crate::container::codec::MAGIC_LEN;
use crate::io::CountingReader;
use crate::manifest::checksum::ChecksumAlgorithm;
use crate::manifest::checksum::Checksums;
use crate::manifest::checksum::checksum_reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Kind of a container member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Directory.
    Directory,
    /// Regular file.
    File,
    /// Symbolic link.
    Symlink,
    /// Anything else (hard links, devices, ...).
    Other,
}

impl MemberKind {
    fn from_tar(kind: tar::EntryType) -> Self {
        if kind.is_dir() {
            Self::Directory
        } else if kind.is_file() {
            Self::File
        } else if kind.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}

/// Header information of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member name with `.` components and trailing slashes removed.
    pub name: PathBuf,
    /// Member kind.
    pub kind: MemberKind,
    /// Permission bits.
    pub mode: u32,
    /// Modification time in seconds since the epoch.
    pub mtime: i64,
    /// Data size in bytes.
    pub size: u64,
    /// Link target, for symbolic links.
    pub link_target: Option<PathBuf>,
}

/// Digest of one regular member, as produced by
/// [`ContainerReader::digest_members`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDigest {
    /// Checksums keyed by algorithm name.
    pub checksums: Checksums,
    /// Number of data bytes hashed.
    pub size: u64,
}

/// Read access to an archive file.
#[derive(Debug)]
pub struct ContainerReader {
    path: PathBuf,
    file: Option<File>,
    codec: Option<CompressionCodec>,
    members: Vec<MemberInfo>,
    index: HashMap<PathBuf, usize>,
}

impl ContainerReader {
    /// Opens `path`, detects its codec and indexes every member header.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the file cannot be opened or is not a readable
    /// container.
    pub fn open(path: &Path) -> Result<Self> {
        let read_error = |reason: String| ArchiveError::Read {
            path: path.to_path_buf(),
            reason,
        };

        let mut file = File::open(path).map_err(|e| read_error(e.to_string()))?;
        let codec = sniff_codec(&mut file).map_err(|e| read_error(e.to_string()))?;

        let mut reader = Self {
            path: path.to_path_buf(),
            file: Some(file),
            codec,
            members: Vec::new(),
            index: HashMap::new(),
        };
        reader
            .build_index()
            .map_err(|e| read_error(e.to_string()))?;
        tracing::debug!(
            path = %path.display(),
            codec = codec.map_or("none", CompressionCodec::name),
            members = reader.members.len(),
            "indexed container"
        );
        Ok(reader)
    }

    fn build_index(&mut self) -> Result<()> {
        let mut members = Vec::new();
        {
            let mut archive = self.stream()?;
            for entry in archive.entries()? {
                let mut entry = entry?;
                let pax_time = pax_mtime(&mut entry)?;
                let header = entry.header();
                let link_target = entry.link_name()?.map(|t| t.into_owned());
                let mtime = match pax_time {
                    Some(mtime) => mtime,
                    None => i64::try_from(header.mtime()?).unwrap_or(i64::MAX),
                };
                members.push(MemberInfo {
                    name: normalize_name(&entry.path()?),
                    kind: MemberKind::from_tar(header.entry_type()),
                    mode: header.mode()? & 0o7777,
                    mtime,
                    size: entry.size(),
                    link_target,
                });
            }
        }

        // later members shadow earlier ones with the same name
        self.index = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        self.members = members;
        Ok(())
    }

    /// Returns a tar stream positioned at the first member.
    fn stream(&self) -> Result<tar::Archive<Box<dyn Read + '_>>> {
        let mut file = self
            .file
            .as_ref()
            .ok_or_else(|| ArchiveError::Usage("archive is closed".into()))?;
        file.seek(SeekFrom::Start(0))?;
        let buffered = BufReader::new(file);
        let decoder: Box<dyn Read + '_> = match self.codec {
            None => Box::new(buffered),
            Some(CompressionCodec::Gzip) => Box::new(flate2::bufread::MultiGzDecoder::new(buffered)),
            Some(CompressionCodec::Bzip2) => Box::new(bzip2::bufread::MultiBzDecoder::new(buffered)),
            Some(CompressionCodec::Xz) => Box::new(xz2::bufread::XzDecoder::new_multi_decoder(buffered)),
            Some(CompressionCodec::Zstd) => Box::new(zstd::Decoder::with_buffer(buffered)?),
        };
        Ok(tar::Archive::new(decoder))
    }

    /// Path of the archive file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Codec detected on open, `None` for plain tar.
    #[must_use]
    pub const fn codec(&self) -> Option<CompressionCodec> {
        self.codec
    }

    /// Every member header in archive order.
    #[must_use]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn member(&self, name: &Path) -> Option<&MemberInfo> {
        self.index.get(name).map(|&i| &self.members[i])
    }

    /// Returns `true` until [`ContainerReader::close`] is called.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Reads the full data of one member.
    ///
    /// # Errors
    ///
    /// Returns `Usage` if the reader is closed, `Read` if no such member
    /// exists, or an I/O error while decoding.
    pub fn read_member(&self, name: &Path) -> Result<Vec<u8>> {
        let Some(&position) = self.index.get(name) else {
            return Err(ArchiveError::Read {
                path: self.path.clone(),
                reason: format!("no member named {}", name.display()),
            });
        };

        let mut archive = self.stream()?;
        for (i, entry) in archive.entries()?.enumerate() {
            let mut entry = entry?;
            if i == position {
                let mut data = Vec::new();
                entry.read_to_end(&mut data)?;
                return Ok(data);
            }
        }
        Err(ArchiveError::Read {
            path: self.path.clone(),
            reason: format!("member {} vanished while reading", name.display()),
        })
    }

    /// Digests the selected regular members in a single pass.
    ///
    /// `selection` maps member names to the algorithms to compute. Returns
    /// the digests keyed by member name together with the total number of
    /// bytes hashed.
    ///
    /// # Errors
    ///
    /// Returns `Usage` if the reader is closed or an I/O error while decoding.
    pub fn digest_members(
        &self,
        selection: &HashMap<PathBuf, Vec<ChecksumAlgorithm>>,
    ) -> Result<(HashMap<PathBuf, MemberDigest>, u64)> {
        let mut digests = HashMap::with_capacity(selection.len());
        if selection.is_empty() {
            return Ok((digests, 0));
        }

        let wanted: HashMap<usize, (&PathBuf, &Vec<ChecksumAlgorithm>)> = selection
            .iter()
            .filter_map(|(name, algorithms)| {
                self.index
                    .get(name)
                    .filter(|&&i| self.members[i].kind == MemberKind::File)
                    .map(|&i| (i, (name, algorithms)))
            })
            .collect();

        let mut hashed = 0u64;
        let mut archive = self.stream()?;
        for (i, entry) in archive.entries()?.enumerate() {
            let entry = entry?;
            let Some((name, algorithms)) = wanted.get(&i) else {
                continue;
            };
            let mut counted = CountingReader::new(entry);
            let (checksums, size) = checksum_reader(&mut counted, algorithms)?;
            hashed += counted.total_bytes();
            digests.insert((*name).clone(), MemberDigest { checksums, size });
            if digests.len() == wanted.len() {
                break;
            }
        }
        Ok((digests, hashed))
    }

    /// Releases the file handle. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            tracing::debug!(path = %self.path.display(), "closed container");
        }
    }
}

impl Drop for ContainerReader {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reads the leading magic bytes and rewinds.
/// Reads a PAX `mtime` record, rounding fractional seconds down.
fn pax_mtime<R: Read>(entry: &mut tar::Entry<'_, R>) -> std::io::Result<Option<i64>> {
    let Some(extensions) = entry.pax_extensions()? else {
        return Ok(None);
    };
    for extension in extensions {
        let extension = extension?;
        if extension.key().ok() != Some("mtime") {
            continue;
        }
        let value = extension
            .value()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        return Ok(Some(parse_pax_time(value).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid PAX mtime {value:?}"),
            )
        })?));
    }
    Ok(None)
}

fn parse_pax_time(value: &str) -> Option<i64> {
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds: i64 = whole.parse().ok()?;
    if whole.starts_with('-') && fraction.bytes().any(|b| b != b'0') {
        seconds.checked_sub(1)
    } else {
        Some(seconds)
    }
}

fn sniff_codec(file: &mut File) -> std::io::Result<Option<CompressionCodec>> {
    let mut magic = Vec::with_capacity(MAGIC_LEN);
    file.by_ref().take(MAGIC_LEN as u64).read_to_end(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(CompressionCodec::detect(&magic))
}

/// Drops `.` components and trailing separators from a member name.
pub(crate) fn normalize_name(name: &Path) -> PathBuf {
    name.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
