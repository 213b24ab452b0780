//! Exclusive-create container writer.
//!
//! The archive file is opened with `create_new`, so an existing path is never
//! touched. Until [`ContainerWriter::finish`] succeeds the writer owns the
//! new file and removes it when dropped.

use crate::ArchiveError;
use crate::Result;
use crate::container::codec::CompressionCodec;
use crate::creation::compression::CompressionLevel;
use crate::io::CountingReader;
use crate::io::CountingWriter;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tar::Builder;
use tar::EntryType;
use tar::Header;

type Sink = CountingWriter<BufWriter<File>>;

enum Encoder {
    Plain(Sink),
    Gzip(flate2::write::GzEncoder<Sink>),
    Bzip2(bzip2::write::BzEncoder<Sink>),
    Xz(xz2::write::XzEncoder<Sink>),
    Zstd(zstd::Encoder<'static, Sink>),
}

impl Encoder {
    fn new(sink: Sink, codec: Option<CompressionCodec>, level: Option<u8>) -> Result<Self> {
        let Some(codec) = codec else {
            return Ok(Self::Plain(sink));
        };
        Ok(match CompressionLevel::for_codec(codec, level) {
            CompressionLevel::Flate2(l) => Self::Gzip(flate2::write::GzEncoder::new(sink, l)),
            CompressionLevel::Bzip2(l) => Self::Bzip2(bzip2::write::BzEncoder::new(sink, l)),
            CompressionLevel::Xz(l) => Self::Xz(xz2::write::XzEncoder::new(sink, l)),
            CompressionLevel::Zstd(l) => Self::Zstd(zstd::Encoder::new(sink, l)?),
        })
    }

    /// Flushes the codec trailer and returns the underlying sink.
    fn finish(self) -> std::io::Result<Sink> {
        match self {
            Self::Plain(sink) => Ok(sink),
            Self::Gzip(e) => e.finish(),
            Self::Bzip2(e) => e.finish(),
            Self::Xz(e) => e.finish(),
            Self::Zstd(e) => e.finish(),
        }
    }
}

impl Write for Encoder {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
            Self::Bzip2(w) => w.write(buf),
            Self::Xz(w) => w.write(buf),
            Self::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
            Self::Bzip2(w) => w.flush(),
            Self::Xz(w) => w.flush(),
            Self::Zstd(w) => w.flush(),
        }
    }
}

/// Metadata stored in a member header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberMeta {
    /// Permission bits.
    pub mode: u32,
    /// Modification time in seconds since the epoch.
    pub mtime: i64,
}

impl MemberMeta {
    fn header(self, kind: EntryType, size: u64) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(kind);
        header.set_mode(self.mode);
        header.set_mtime(u64::try_from(self.mtime).unwrap_or(0));
        header.set_size(size);
        header
    }

    /// PAX `mtime` record for times the ustar field cannot hold.
    fn pax_mtime(self) -> Option<String> {
        (self.mtime < 0).then(|| self.mtime.to_string())
    }
}

/// Appends members to a new archive file.
pub struct ContainerWriter {
    path: PathBuf,
    builder: Option<Builder<Encoder>>,
    committed: bool,
}

impl std::fmt::Debug for ContainerWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerWriter")
            .field("path", &self.path)
            .field("open", &self.builder.is_some())
            .field("committed", &self.committed)
            .finish()
    }
}

impl ContainerWriter {
    /// Creates `path` exclusively and prepares it for writing.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if anything exists at `path`, or an I/O error
    /// if the file cannot be created.
    pub fn create(
        path: &Path,
        codec: Option<CompressionCodec>,
        level: Option<u8>,
    ) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    ArchiveError::AlreadyExists {
                        path: path.to_path_buf(),
                    }
                } else {
                    ArchiveError::Io(e)
                }
            })?;

        let mut writer = Self {
            path: path.to_path_buf(),
            builder: None,
            committed: false,
        };
        let sink = CountingWriter::new(BufWriter::new(file));
        writer.builder = Some(Builder::new(Encoder::new(sink, codec, level)?));
        Ok(writer)
    }

    fn builder(&mut self) -> Result<&mut Builder<Encoder>> {
        self.builder
            .as_mut()
            .ok_or_else(|| ArchiveError::Usage("container writer is finished".into()))
    }

    /// Returns the builder after emitting any PAX records `meta` needs.
    fn builder_for(&mut self, meta: MemberMeta) -> Result<&mut Builder<Encoder>> {
        let builder = self.builder()?;
        if let Some(mtime) = meta.pax_mtime() {
            builder.append_pax_extensions([("mtime", mtime.as_bytes())])?;
        }
        Ok(builder)
    }

    /// Appends a directory member.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the header cannot be written.
    pub fn append_dir(&mut self, name: &Path, meta: MemberMeta) -> Result<()> {
        let mut header = meta.header(EntryType::Directory, 0);
        self.builder_for(meta)?
            .append_data(&mut header, name, std::io::empty())?;
        Ok(())
    }

    /// Appends a regular file member of exactly `size` bytes read from
    /// `data`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails or if `data` yields a different
    /// number of bytes than `size`.
    pub fn append_file<R: Read>(
        &mut self,
        name: &Path,
        meta: MemberMeta,
        size: u64,
        data: R,
    ) -> Result<()> {
        let mut header = meta.header(EntryType::Regular, size);
        let mut reader = CountingReader::new(data.take(size));
        self.builder_for(meta)?
            .append_data(&mut header, name, &mut reader)?;
        if reader.total_bytes() != size {
            return Err(ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{} changed while being archived", name.display()),
            )));
        }
        Ok(())
    }

    /// Appends a symbolic link member pointing at `target`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the header cannot be written.
    pub fn append_symlink(&mut self, name: &Path, target: &Path, meta: MemberMeta) -> Result<()> {
        let mut header = meta.header(EntryType::Symlink, 0);
        self.builder_for(meta)?
            .append_link(&mut header, name, target)?;
        Ok(())
    }

    /// Writes the tar trailer, finishes the codec and syncs the file.
    ///
    /// Returns the size of the archive file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if any of the trailing writes fail; the file is
    /// removed in that case.
    pub fn finish(mut self) -> Result<u64> {
        let builder = self
            .builder
            .take()
            .ok_or_else(|| ArchiveError::Usage("container writer is finished".into()))?;
        let size = Self::finish_builder(builder)?;
        self.committed = true;
        Ok(size)
    }

    fn finish_builder(builder: Builder<Encoder>) -> Result<u64> {
        let encoder = builder.into_inner()?;
        let mut sink = encoder.finish()?;
        sink.flush()?;
        let size = sink.total_bytes();
        let file = sink
            .into_inner()
            .into_inner()
            .map_err(std::io::IntoInnerError::into_error)?;
        file.sync_all()?;
        Ok(size)
    }
}

impl Drop for ContainerWriter {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.builder.take());
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "cannot remove incomplete archive");
        } else {
            tracing::debug!(path = %self.path.display(), "removed incomplete archive");
        }
    }
}
