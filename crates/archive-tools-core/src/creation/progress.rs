//! Progress reporting during archive creation.
//!
//! [`ProgressTracker`] numbers members as they are written and forwards
//! lifecycle events to a [`ProgressCallback`]; [`ProgressReader`] reports
//! member data as it is copied into the container, batched to keep callback
//! overhead low on large files.

use std::io::Read;
use std::path::Path;

const DEFAULT_BATCH: u64 = 1024 * 1024;

/// Receives progress updates while an archive is written.
///
/// # Examples
///
/// ```
/// use archive_tools_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Printer;
///
/// impl ProgressCallback for Printer {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before a member is written. `current` is 1-based.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called as member data is copied, with the bytes since the last call.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after a member is written.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the container is finished.
    fn on_complete(&mut self);
}

/// Progress callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

/// Counts members and forwards events to a callback.
pub struct ProgressTracker<'a> {
    progress: &'a mut dyn ProgressCallback,
    current: usize,
    total: usize,
}

impl<'a> ProgressTracker<'a> {
    /// Creates a tracker for `total` members.
    #[must_use]
    pub fn new(progress: &'a mut dyn ProgressCallback, total: usize) -> Self {
        Self {
            progress,
            current: 0,
            total,
        }
    }

    /// Reports the start of the next member.
    pub fn on_entry_start(&mut self, path: &Path) {
        self.current += 1;
        self.progress.on_entry_start(path, self.total, self.current);
    }

    /// Reports a finished member.
    pub fn on_entry_complete(&mut self, path: &Path) {
        self.progress.on_entry_complete(path);
    }

    /// Reports the end of the operation.
    pub fn on_complete(&mut self) {
        self.progress.on_complete();
    }

    /// Wraps `inner` so that data read from it is reported as written.
    pub fn reader<R>(&mut self, inner: R) -> ProgressReader<'_, R> {
        ProgressReader::new(inner, &mut *self.progress)
    }
}

/// Reader that reports bytes read to a progress callback in batches.
///
/// Remaining bytes are reported when the reader is dropped.
pub struct ProgressReader<'a, R> {
    inner: R,
    progress: &'a mut dyn ProgressCallback,
    pending: u64,
    batch: u64,
}

impl<'a, R> ProgressReader<'a, R> {
    /// Wraps `inner`, reporting every 1 MiB.
    #[must_use]
    pub fn new(inner: R, progress: &'a mut dyn ProgressCallback) -> Self {
        Self::with_batch_threshold(inner, progress, DEFAULT_BATCH)
    }

    /// Wraps `inner`, reporting every `batch` bytes.
    #[must_use]
    pub fn with_batch_threshold(
        inner: R,
        progress: &'a mut dyn ProgressCallback,
        batch: u64,
    ) -> Self {
        Self {
            inner,
            progress,
            pending: 0,
            batch,
        }
    }

    fn flush_progress(&mut self) {
        if self.pending > 0 {
            self.progress.on_bytes_written(self.pending);
            self.pending = 0;
        }
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pending += n as u64;
        if self.pending >= self.batch {
            self.flush_progress();
        }
        Ok(n)
    }
}

impl<R> Drop for ProgressReader<'_, R> {
    fn drop(&mut self) {
        self.flush_progress();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recorder {
        started: Vec<(PathBuf, usize, usize)>,
        completed: Vec<PathBuf>,
        bytes: Vec<u64>,
        finished: bool,
    }

    impl ProgressCallback for Recorder {
        fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
            self.started.push((path.to_path_buf(), total, current));
        }

        fn on_bytes_written(&mut self, bytes: u64) {
            self.bytes.push(bytes);
        }

        fn on_entry_complete(&mut self, path: &Path) {
            self.completed.push(path.to_path_buf());
        }

        fn on_complete(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn test_tracker_numbers_entries() {
        let mut recorder = Recorder::default();
        {
            let mut tracker = ProgressTracker::new(&mut recorder, 2);
            for name in ["base", "base/msg.txt"] {
                tracker.on_entry_start(Path::new(name));
                tracker.on_entry_complete(Path::new(name));
            }
            tracker.on_complete();
        }
        assert_eq!(
            recorder.started,
            vec![(PathBuf::from("base"), 2, 1), (PathBuf::from("base/msg.txt"), 2, 2)]
        );
        assert_eq!(recorder.completed.len(), 2);
        assert!(recorder.finished);
    }

    #[test]
    fn test_reader_batches_and_flushes_on_drop() {
        let mut recorder = Recorder::default();
        let data = vec![0u8; 10];
        {
            let mut reader = ProgressReader::with_batch_threshold(&data[..], &mut recorder, 4);
            let mut buf = [0u8; 3];
            while reader.read(&mut buf).unwrap() > 0 {}
        }
        assert_eq!(recorder.bytes.iter().sum::<u64>(), 10);
        assert_eq!(recorder.bytes, vec![6, 4]);
    }

    #[test]
    fn test_tracker_reader() {
        let mut recorder = Recorder::default();
        {
            let mut tracker = ProgressTracker::new(&mut recorder, 1);
            let mut reader = tracker.reader(&b"hello"[..]);
            let mut out = Vec::new();
            reader.read_to_end(&mut out).unwrap();
        }
        assert_eq!(recorder.bytes, vec![5]);
    }
}
