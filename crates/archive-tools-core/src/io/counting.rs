//! Byte-counting stream adapters.
//!
//! The writer measures the on-disk size of a container as it is produced;
//! the reader measures how many member bytes a verification pass hashed.

use std::io::Read;
use std::io::Write;

/// Writer that counts bytes successfully handed to the inner writer.
///
/// # Examples
///
/// ```
/// use archive_tools_core::io::CountingWriter;
/// use std::io::Write;
///
/// let mut writer = CountingWriter::new(Vec::new());
/// writer.write_all(b"Hello world!\n")?;
/// assert_eq!(writer.total_bytes(), 13);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W> CountingWriter<W> {
    /// Wraps `inner` with a zero count.
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes written so far.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.count
    }

    /// Returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Borrows the inner writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Reader that counts bytes returned from the inner reader.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    /// Wraps `inner` with a zero count.
    #[must_use]
    pub const fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes read so far.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.count
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
