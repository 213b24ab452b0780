//! Compression codecs wrapped around the tar stream.
//!
//! The codec is chosen by the caller when writing and detected from the
//! leading magic bytes when reading, so the archive file name never has to
//! agree with its content.

use crate::ArchiveError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Number of leading bytes needed by [`CompressionCodec::detect`].
pub const MAGIC_LEN: usize = 6;

/// Compression codec applied to the whole container.
///
/// # Examples
///
/// ```
/// use archive_tools_core::CompressionCodec;
///
/// let codec: CompressionCodec = "zstd".parse()?;
/// assert_eq!(codec.extension(), "tar.zst");
/// # Ok::<(), archive_tools_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    /// Deflate via `flate2`.
    Gzip,
    /// Burrows-Wheeler via `bzip2`.
    Bzip2,
    /// LZMA2 via `xz2`.
    Xz,
    /// Zstandard via `zstd`.
    Zstd,
}

impl CompressionCodec {
    /// All supported codecs.
    pub const ALL: [Self; 4] = [Self::Gzip, Self::Bzip2, Self::Xz, Self::Zstd];

    /// Conventional archive extension for this codec.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
            Self::Xz => "tar.xz",
            Self::Zstd => "tar.zst",
        }
    }

    /// Codec name as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    /// Identifies the codec from the first bytes of a file.
    ///
    /// Returns `None` for anything that is not one of the supported
    /// compressed formats, which readers treat as a plain tar stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_tools_core::CompressionCodec;
    ///
    /// assert_eq!(
    ///     CompressionCodec::detect(&[0x1f, 0x8b, 0x08, 0x00]),
    ///     Some(CompressionCodec::Gzip)
    /// );
    /// assert_eq!(CompressionCodec::detect(b"base/\0\0\0"), None);
    /// ```
    #[must_use]
    pub fn detect(magic: &[u8]) -> Option<Self> {
        if magic.starts_with(GZIP_MAGIC) {
            Some(Self::Gzip)
        } else if magic.starts_with(BZIP2_MAGIC) {
            Some(Self::Bzip2)
        } else if magic.starts_with(XZ_MAGIC) {
            Some(Self::Xz)
        } else if magic.starts_with(ZSTD_MAGIC) {
            Some(Self::Zstd)
        } else {
            None
        }
    }

    /// Infers the codec from an archive file name.
    ///
    /// The outer `Option` is `None` when the extension is not recognized;
    /// `Some(None)` means a plain `.tar`.
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_tools_core::CompressionCodec;
    /// use std::path::Path;
    ///
    /// assert_eq!(
    ///     CompressionCodec::from_path(Path::new("a.tgz")),
    ///     Some(Some(CompressionCodec::Gzip))
    /// );
    /// assert_eq!(CompressionCodec::from_path(Path::new("a.tar")), Some(None));
    /// assert_eq!(CompressionCodec::from_path(Path::new("a.zip")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Option<Self>> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "tar" => Some(None),
            "gz" | "tgz" => Some(Some(Self::Gzip)),
            "bz2" | "tbz" | "tbz2" => Some(Some(Self::Bzip2)),
            "xz" | "txz" => Some(Some(Self::Xz)),
            "zst" | "tzst" => Some(Some(Self::Zstd)),
            _ => None,
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionCodec {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(Self::Gzip),
            "bzip2" | "bz2" => Ok(Self::Bzip2),
            "xz" => Ok(Self::Xz),
            "zstd" | "zst" => Ok(Self::Zstd),
            other => Err(ArchiveError::InvalidConfig(format!(
                "unknown compression codec '{other}'"
            ))),
        }
    }
}
