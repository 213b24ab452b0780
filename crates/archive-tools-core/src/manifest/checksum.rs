//! Content checksums for regular file members.
//!
//! Digests are computed incrementally over a bounded buffer so that members
//! of arbitrary size never have to be held in memory.

use crate::ArchiveError;
use crate::Result;
use sha2::Digest;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// Size of the read buffer used while hashing.
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Mapping from algorithm name to lowercase hex digest.
pub type Checksums = BTreeMap<String, String>;

/// Supported checksum algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecksumAlgorithm {
    /// SHA-256, the default.
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
    /// BLAKE3.
    Blake3,
}

impl ChecksumAlgorithm {
    /// Returns the name used for this algorithm in manifests.
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_tools_core::ChecksumAlgorithm;
    ///
    /// assert_eq!(ChecksumAlgorithm::Sha256.name(), "sha256");
    /// assert_eq!(ChecksumAlgorithm::Blake3.name(), "blake3");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }

    fn hasher(self) -> Hasher {
        match self {
            Self::Sha256 => Hasher::Sha256(sha2::Sha256::new()),
            Self::Sha512 => Hasher::Sha512(sha2::Sha512::new()),
            Self::Blake3 => Hasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "blake3" => Ok(Self::Blake3),
            other => Err(ArchiveError::UnsupportedChecksum {
                algorithm: other.to_string(),
            }),
        }
    }
}

enum Hasher {
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> String {
        match self {
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Sha512(h) => format!("{:x}", h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Digests a byte stream with every requested algorithm in a single pass.
///
/// Returns the checksums together with the number of bytes consumed.
///
/// # Examples
///
/// ```
/// use archive_tools_core::ChecksumAlgorithm;
/// use archive_tools_core::manifest::checksum::checksum_reader;
///
/// let (sums, size) = checksum_reader(&b"hello"[..], &[ChecksumAlgorithm::Sha256])?;
/// assert_eq!(size, 5);
/// assert_eq!(
///     sums["sha256"],
///     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
/// );
/// # Ok::<(), archive_tools_core::ArchiveError>(())
/// ```
pub fn checksum_reader<R: Read>(
    mut reader: R,
    algorithms: &[ChecksumAlgorithm],
) -> Result<(Checksums, u64)> {
    let mut hashers: Vec<(ChecksumAlgorithm, Hasher)> =
        algorithms.iter().map(|&a| (a, a.hasher())).collect();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for (_, hasher) in &mut hashers {
            hasher.update(&buffer[..n]);
        }
        total += n as u64;
    }

    let sums = hashers
        .into_iter()
        .map(|(algorithm, hasher)| (algorithm.name().to_string(), hasher.finalize()))
        .collect();
    Ok((sums, total))
}

/// Returns the algorithms recorded in a checksum map that this build can
/// compute. Unknown names are skipped.
pub fn known_algorithms(checksums: &Checksums) -> Vec<ChecksumAlgorithm> {
    checksums
        .keys()
        .filter_map(|name| name.parse().ok())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_empty_input() {
        let (sums, size) = checksum_reader(Cursor::new(b""), &[ChecksumAlgorithm::Sha256]).unwrap();
        assert_eq!(size, 0);
        assert_eq!(sums["sha256"], EMPTY_SHA256);
    }

    #[test]
    fn test_multiple_algorithms_single_pass() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let (sums, size) = checksum_reader(
            Cursor::new(data),
            &[
                ChecksumAlgorithm::Sha256,
                ChecksumAlgorithm::Sha512,
                ChecksumAlgorithm::Blake3,
            ],
        )
        .unwrap();

        assert_eq!(size, data.len() as u64);
        assert_eq!(sums.len(), 3);
        assert_eq!(
            sums["sha256"],
            "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592"
        );
        assert_eq!(sums["sha512"].len(), 128);
        assert_eq!(sums["blake3"], blake3::hash(data).to_hex().to_string());
    }

    #[test]
    fn test_streams_across_buffer_boundaries() {
        let data = vec![0xA5u8; HASH_BUFFER_SIZE * 3 + 17];
        let (streamed, size) =
            checksum_reader(Cursor::new(&data), &[ChecksumAlgorithm::Sha256]).unwrap();
        assert_eq!(size, data.len() as u64);
        assert_eq!(
            streamed["sha256"],
            format!("{:x}", sha2::Sha256::digest(&data))
        );
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!(
            "sha512".parse::<ChecksumAlgorithm>().unwrap(),
            ChecksumAlgorithm::Sha512
        );
        let err = "md5".parse::<ChecksumAlgorithm>().unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedChecksum { .. }));
    }

    #[test]
    fn test_known_algorithms_skips_unknown_names() {
        let mut sums = Checksums::new();
        sums.insert("sha256".into(), EMPTY_SHA256.into());
        sums.insert("crc32".into(), "0".into());
        assert_eq!(known_algorithms(&sums), vec![ChecksumAlgorithm::Sha256]);
    }
}
