//! The archive handle: creation, opening and verification.
//!
//! An [`Archive`] is either new (created with [`Archive::new`], written once
//! with [`Archive::create`]) or opened for reading with [`Archive::open`].
//! Every archive starts with its manifest member, `<basedir>/.manifest.toml`,
//! followed by any metadata members and then one member per manifest entry.

use crate::ArchiveError;
use crate::Result;
use crate::config::CreationConfig;
use crate::container::ContainerReader;
use crate::container::ContainerWriter;
use crate::container::MemberKind;
use crate::container::MemberMeta;
use crate::creation::progress::NoopProgress;
use crate::creation::progress::ProgressCallback;
use crate::creation::progress::ProgressTracker;
use crate::creation::report::CreationReport;
use crate::creation::validate::member_name;
use crate::creation::validate::validate_inputs;
use crate::creation::walker::InputWalker;
use crate::creation::walker::WalkedEntry;
use crate::inspection::report::VerificationReport;
use crate::inspection::verify::verify_members;
use crate::manifest::MANIFEST_NAME;
use crate::manifest::Manifest;
use crate::manifest::entry::EntryKind;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

/// Permission bits of the manifest and metadata members.
const READ_ONLY: u32 = 0o444;

/// An archive file together with its manifest.
///
/// # Examples
///
/// ```no_run
/// use archive_tools_core::Archive;
/// use archive_tools_core::CreationConfig;
/// use std::path::PathBuf;
///
/// let mut archive = Archive::new("base.tar.gz");
/// archive.create(&[PathBuf::from("base")], &CreationConfig::default())?;
///
/// let archive = Archive::open("base.tar.gz")?;
/// archive.verify()?;
/// # Ok::<(), archive_tools_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    metadata: Vec<(String, Vec<u8>)>,
    manifest: Option<Manifest>,
    basedir: Option<PathBuf>,
    reader: Option<ContainerReader>,
}

impl Archive {
    /// Prepares a new archive at `path`. Nothing is written until
    /// [`Archive::create`] is called.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            metadata: Vec::new(),
            manifest: None,
            basedir: None,
            reader: None,
        }
    }

    /// Adds an extra metadata member, stored read-only as `<basedir>/<name>`
    /// right after the manifest.
    ///
    /// # Errors
    ///
    /// Returns `Usage` if the archive was already created or opened,
    /// `ReservedName` for the manifest name, and `InvalidPath` if `name` is
    /// not a plain file name or was added before.
    pub fn add_metadata(&mut self, name: &str, data: impl Into<Vec<u8>>) -> Result<()> {
        if self.manifest.is_some() {
            return Err(ArchiveError::Usage(
                "metadata must be added before the archive is created".into(),
            ));
        }
        check_metadata_name(name)?;
        if self.metadata.iter().any(|(n, _)| n == name) {
            return Err(ArchiveError::InvalidPath {
                path: PathBuf::from(name),
                reason: "metadata member added twice".into(),
            });
        }
        self.metadata.push((name.to_string(), data.into()));
        Ok(())
    }

    /// Creates the archive from `sources`.
    ///
    /// # Errors
    ///
    /// All validation errors are returned before the archive file is
    /// created. `AlreadyExists` is returned if anything exists at the
    /// archive path; that file is left untouched. On any later failure the
    /// partially written archive is removed.
    pub fn create(
        &mut self,
        sources: &[PathBuf],
        config: &CreationConfig,
    ) -> Result<CreationReport> {
        self.create_with_progress(sources, config, &mut NoopProgress)
    }

    /// Creates the archive from `sources`, reporting progress.
    ///
    /// # Errors
    ///
    /// See [`Archive::create`].
    pub fn create_with_progress(
        &mut self,
        sources: &[PathBuf],
        config: &CreationConfig,
        progress: &mut dyn ProgressCallback,
    ) -> Result<CreationReport> {
        if self.manifest.is_some() {
            return Err(ArchiveError::Usage(format!(
                "archive {} was already created or opened",
                self.path.display()
            )));
        }
        let start = Instant::now();
        let mut report = CreationReport::new();

        config.validate()?;
        let workdir = config.resolve_workdir()?;
        let inputs = validate_inputs(
            &self.path,
            sources,
            config.basedir.as_deref(),
            &config.excludes,
            &workdir,
        )?;
        let basedir = inputs.basedir.clone();
        tracing::debug!(basedir = %basedir.display(), inputs = inputs.paths.len(), "validated inputs");

        let walk = InputWalker::new(&inputs).walk()?;
        for exclude in &walk.unused_excludes {
            report.add_warning(format!("exclude path {} matches nothing", exclude.display()));
        }
        self.check_reserved(&basedir, &walk.entries)?;
        tracing::debug!(entries = walk.entries.len(), "walked inputs");

        let mut manifest = Manifest::new(&config.checksums);
        manifest.set_comment(config.comment.clone());
        for (name, _) in &self.metadata {
            manifest.add_metadata_name(name);
        }
        for entry in &walk.entries {
            manifest.add(&entry.path, &entry.fs_path)?;
        }
        tracing::debug!(entries = manifest.len(), "built manifest");

        let mut staged = tempfile::tempfile()?;
        manifest.write(&mut staged)?;
        let staged_len = staged.stream_position()?;
        staged.seek(SeekFrom::Start(0))?;

        let mut writer =
            ContainerWriter::create(&self.path, config.compression, config.compression_level)?;
        let now = MemberMeta {
            mode: READ_ONLY,
            mtime: chrono::Utc::now().timestamp(),
        };
        writer.append_file(&basedir.join(MANIFEST_NAME), now, staged_len, &mut staged)?;
        for (name, data) in &self.metadata {
            writer.append_file(&basedir.join(name), now, data.len() as u64, &data[..])?;
            report.metadata_added += 1;
        }

        let mut tracker = ProgressTracker::new(progress, manifest.len());
        for (entry, walked) in manifest.iter().zip(&walk.entries) {
            tracker.on_entry_start(&entry.path);
            let name = member_name(&basedir, &entry.path);
            let meta = MemberMeta {
                mode: entry.mode,
                mtime: entry.mtime,
            };
            match &entry.kind {
                EntryKind::Directory => {
                    writer.append_dir(&name, meta)?;
                    report.directories_added += 1;
                }
                EntryKind::File { size, .. } => {
                    let file = File::open(&walked.fs_path)?;
                    writer.append_file(&name, meta, *size, tracker.reader(file))?;
                    report.files_added += 1;
                    report.bytes_read += size;
                }
                EntryKind::Symlink { target } => {
                    writer.append_symlink(&name, target, meta)?;
                    report.symlinks_added += 1;
                }
            }
            tracker.on_entry_complete(&entry.path);
        }

        report.archive_size = writer.finish()?;
        tracker.on_complete();
        report.duration = start.elapsed();
        tracing::info!(
            path = %self.path.display(),
            entries = manifest.len(),
            bytes = report.archive_size,
            "created archive"
        );

        self.manifest = Some(manifest);
        self.basedir = Some(basedir);
        Ok(report)
    }

    /// Rejects inputs whose member name collides with the manifest or a
    /// metadata member.
    fn check_reserved(&self, basedir: &Path, entries: &[WalkedEntry]) -> Result<()> {
        let reserved: HashSet<PathBuf> = std::iter::once(MANIFEST_NAME)
            .chain(self.metadata.iter().map(|(name, _)| name.as_str()))
            .map(|name| basedir.join(name))
            .collect();
        match entries
            .iter()
            .find(|e| reserved.contains(&member_name(basedir, &e.path)))
        {
            Some(entry) => Err(ArchiveError::ReservedName {
                path: entry.path.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Opens an existing archive and reads its manifest.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the file is not a readable container, `Integrity` if
    /// the first member is not a manifest, and `InvalidManifest` if the
    /// manifest cannot be parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ContainerReader::open(path)?;

        let manifest_member = reader
            .members()
            .first()
            .filter(|m| {
                m.kind == MemberKind::File && m.name.file_name() == Some(OsStr::new(MANIFEST_NAME))
            })
            .map(|m| m.name.clone())
            .ok_or_else(|| ArchiveError::integrity_archive(path, "manifest not found"))?;
        let basedir = manifest_member
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let data = reader.read_member(&manifest_member)?;
        let manifest = Manifest::read(&data[..])?;
        tracing::debug!(
            path = %path.display(),
            basedir = %basedir.display(),
            entries = manifest.len(),
            "opened archive"
        );

        Ok(Self {
            path: path.to_path_buf(),
            metadata: Vec::new(),
            manifest: Some(manifest),
            basedir: Some(basedir),
            reader: Some(reader),
        })
    }

    /// Checks every member against the manifest, stopping at the first
    /// mismatch.
    ///
    /// # Errors
    ///
    /// Returns `Usage` if the archive is not open for reading and
    /// `Integrity` naming the first entry that does not match.
    pub fn verify(&self) -> Result<VerificationReport> {
        let (reader, manifest, basedir) = self.open_parts()?;
        let report = verify_members(reader, manifest, basedir)?;
        tracing::info!(
            path = %self.path.display(),
            members = report.members_checked,
            bytes = report.bytes_hashed,
            "verified archive"
        );
        Ok(report)
    }

    /// Reads a metadata member stored with [`Archive::add_metadata`].
    ///
    /// # Errors
    ///
    /// Returns `Usage` if the archive is not open for reading, and `Read` if
    /// the manifest lists no metadata member named `name`.
    pub fn read_metadata(&self, name: &str) -> Result<Vec<u8>> {
        let (reader, manifest, basedir) = self.open_parts()?;
        if !manifest.head().metadata.iter().any(|n| n == name) {
            return Err(ArchiveError::Read {
                path: self.path.clone(),
                reason: format!("no metadata member named {name}"),
            });
        }
        reader.read_member(&basedir.join(name))
    }

    fn open_parts(&self) -> Result<(&ContainerReader, &Manifest, &Path)> {
        match (&self.reader, &self.manifest, &self.basedir) {
            (Some(reader), Some(manifest), Some(basedir)) if reader.is_open() => {
                Ok((reader, manifest, basedir.as_path()))
            }
            _ => Err(ArchiveError::Usage("archive is closed".into())),
        }
    }

    /// Releases the underlying file. The manifest stays available. Closing
    /// twice is a no-op.
    pub fn close(&mut self) {
        if let Some(reader) = &mut self.reader {
            reader.close();
        }
    }

    /// Returns `true` while the archive is open for reading.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.reader.as_ref().is_some_and(ContainerReader::is_open)
    }

    /// Path of the archive file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The manifest, once the archive was created or opened.
    #[must_use]
    pub const fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// The base directory, once the archive was created or opened.
    #[must_use]
    pub fn basedir(&self) -> Option<&Path> {
        self.basedir.as_deref()
    }

    /// Names of the metadata members.
    #[must_use]
    pub fn metadata_names(&self) -> Vec<&str> {
        match &self.manifest {
            Some(manifest) => manifest.head().metadata.iter().map(String::as_str).collect(),
            None => self.metadata.iter().map(|(name, _)| name.as_str()).collect(),
        }
    }
}

fn check_metadata_name(name: &str) -> Result<()> {
    if name == MANIFEST_NAME {
        return Err(ArchiveError::ReservedName {
            path: PathBuf::from(name),
        });
    }
    let mut components = Path::new(name).components();
    let plain = matches!(components.next(), Some(Component::Normal(c)) if c == OsStr::new(name))
        && components.next().is_none();
    if !plain {
        return Err(ArchiveError::InvalidPath {
            path: PathBuf::from(name),
            reason: "metadata name must be a plain file name".into(),
        });
    }
    Ok(())
}
