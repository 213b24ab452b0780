//! Mapping of the user-facing compression level to codec settings.
//!
//! Levels follow one scale for every codec: 1-3 favor speed, 6 (or none)
//! is the codec default, 7-9 favor ratio.

use crate::container::codec::CompressionCodec;

/// Codec-specific compression setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// `flate2` level.
    Flate2(flate2::Compression),
    /// `bzip2` level.
    Bzip2(bzip2::Compression),
    /// `xz2` preset.
    Xz(u32),
    /// `zstd` level.
    Zstd(i32),
}

impl CompressionLevel {
    /// Resolves `level` for `codec`.
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_tools_core::CompressionCodec;
    /// use archive_tools_core::creation::compression::CompressionLevel;
    ///
    /// assert_eq!(
    ///     CompressionLevel::for_codec(CompressionCodec::Zstd, Some(9)),
    ///     CompressionLevel::Zstd(19)
    /// );
    /// ```
    #[must_use]
    pub fn for_codec(codec: CompressionCodec, level: Option<u8>) -> Self {
        match codec {
            CompressionCodec::Gzip => Self::Flate2(flate2_level(level)),
            CompressionCodec::Bzip2 => Self::Bzip2(bzip2_level(level)),
            CompressionCodec::Xz => Self::Xz(xz_level(level)),
            CompressionCodec::Zstd => Self::Zstd(zstd_level(level)),
        }
    }
}

fn flate2_level(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n.min(9))),
    }
}

fn bzip2_level(level: Option<u8>) -> bzip2::Compression {
    match level {
        None | Some(6) => bzip2::Compression::default(),
        Some(0 | 1) => bzip2::Compression::fast(),
        Some(7..=u8::MAX) => bzip2::Compression::best(),
        Some(n) => bzip2::Compression::new(u32::from(n)),
    }
}

fn xz_level(level: Option<u8>) -> u32 {
    level.map_or(6, |n| u32::from(n.min(9)))
}

#[allow(clippy::match_same_arms)]
fn zstd_level(level: Option<u8>) -> i32 {
    match level {
        None | Some(6) => 3,
        Some(1) => 1,
        Some(2) => 2,
        Some(7) => 10,
        Some(8) => 15,
        Some(9) => 19,
        _ => 3,
    }
}
