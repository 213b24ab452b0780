//! Input path classification and validation.
//!
//! Every check in this module runs before the archive file is created, so a
//! rejected input never leaves anything behind on disk.

use crate::ArchiveError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Whether the inputs of one archive are absolute or relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// All inputs are absolute.
    Absolute,
    /// All inputs are relative to the working directory.
    Relative,
}

/// Inputs that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInputs {
    /// Absolute or relative.
    pub kind: PathKind,
    /// Relative directory under which members are stored.
    pub basedir: PathBuf,
    /// Input paths in the order given, in normalized form.
    pub paths: Vec<PathBuf>,
    /// Exclude paths, expressed in the same form as `paths`.
    pub excludes: Vec<PathBuf>,
    /// Canonical working directory.
    pub workdir: PathBuf,
}

impl ValidatedInputs {
    /// Where the object recorded as `path` lives on the filesystem.
    #[must_use]
    pub fn fs_path(&self, path: &Path) -> PathBuf {
        self.workdir.join(path)
    }
}

/// Validates creation inputs.
///
/// `archive` is only used to infer the base directory for absolute inputs.
///
/// # Errors
///
/// Returns the first validation error found: `EmptyArchive`,
/// `InvalidPath`, `MixedPaths`, `InvalidBasedir`, `PathNotInBasedir` or
/// `SourceNotFound`.
pub fn validate_inputs(
    archive: &Path,
    paths: &[PathBuf],
    basedir: Option<&Path>,
    excludes: &[PathBuf],
    workdir: &Path,
) -> Result<ValidatedInputs> {
    let first = paths.first().ok_or(ArchiveError::EmptyArchive)?;
    let kind = classify(paths)?;

    let paths = paths
        .iter()
        .map(|p| lexical_normalize(p))
        .collect::<Result<Vec<_>>>()?;

    let basedir = match basedir {
        Some(dir) => dir.to_path_buf(),
        None => infer_basedir(archive, first)?,
    };
    check_basedir(&basedir)?;

    if kind == PathKind::Relative {
        for path in &paths {
            if !path.starts_with(&basedir) {
                return Err(ArchiveError::PathNotInBasedir {
                    path: path.clone(),
                    basedir: basedir.clone(),
                });
            }
        }
    }

    for path in &paths {
        check_resolves_to_itself(path, &workdir.join(path))?;
    }

    if kind == PathKind::Relative {
        let dir = workdir.join(&basedir);
        let is_dir = std::fs::symlink_metadata(&dir).is_ok_and(|m| m.is_dir());
        if !is_dir {
            return Err(ArchiveError::InvalidBasedir {
                basedir,
                reason: "not a directory".into(),
            });
        }
    }

    let excludes = excludes
        .iter()
        .map(|e| normalize_exclude(e, kind, workdir))
        .collect::<Result<Vec<_>>>()?;

    Ok(ValidatedInputs {
        kind,
        basedir,
        paths,
        excludes,
        workdir: workdir.to_path_buf(),
    })
}

/// Checks that all paths are absolute or all are relative.
///
/// # Errors
///
/// Returns `EmptyArchive` for an empty list and `MixedPaths` for a mix.
pub fn classify(paths: &[PathBuf]) -> Result<PathKind> {
    let first = paths.first().ok_or(ArchiveError::EmptyArchive)?;
    let absolute = first.is_absolute();
    if paths.iter().any(|p| p.is_absolute() != absolute) {
        return Err(ArchiveError::MixedPaths);
    }
    Ok(if absolute {
        PathKind::Absolute
    } else {
        PathKind::Relative
    })
}

/// Infers the base directory from the archive name and the first input.
///
/// Absolute inputs use the archive file name up to its first `.`; relative
/// inputs use the first segment of the first input path.
///
/// # Errors
///
/// Returns `InvalidBasedir` if nothing usable can be derived.
///
/// # Examples
///
/// ```
/// use archive_tools_core::creation::validate::infer_basedir;
/// use std::path::Path;
///
/// let dir = infer_basedir(Path::new("/backup/home-2024.tar.gz"), Path::new("/home/jdoe"))?;
/// assert_eq!(dir, Path::new("home-2024"));
///
/// let dir = infer_basedir(Path::new("out.tar"), Path::new("base/data/rnd.dat"))?;
/// assert_eq!(dir, Path::new("base"));
/// # Ok::<(), archive_tools_core::ArchiveError>(())
/// ```
pub fn infer_basedir(archive: &Path, first: &Path) -> Result<PathBuf> {
    let inferred = if first.is_absolute() {
        archive
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.split('.').next())
            .filter(|stem| !stem.is_empty())
            .map(PathBuf::from)
    } else {
        match first.components().next() {
            Some(Component::Normal(segment)) => Some(PathBuf::from(segment)),
            _ => None,
        }
    };
    inferred.ok_or_else(|| ArchiveError::InvalidBasedir {
        basedir: PathBuf::new(),
        reason: format!(
            "cannot infer a base directory from {} and {}",
            archive.display(),
            first.display()
        ),
    })
}

/// Returns the normalized form of `path` if it has no `.` or `..`
/// segments.
///
/// Repeated and trailing separators are dropped.
///
/// # Errors
///
/// Returns `InvalidPath` for empty paths and paths with `.` or `..`
/// segments.
pub fn lexical_normalize(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ArchiveError::InvalidPath {
            path: path.to_path_buf(),
            reason: "empty path".into(),
        });
    }
    let dotted = path
        .to_str()
        .is_some_and(|s| s.split('/').any(|segment| segment == "."));
    if dotted
        || path
            .components()
            .any(|c| matches!(c, Component::CurDir | Component::ParentDir))
    {
        return Err(ArchiveError::InvalidPath {
            path: path.to_path_buf(),
            reason: "must be normalized".into(),
        });
    }
    Ok(path.components().collect())
}

fn check_basedir(basedir: &Path) -> Result<()> {
    let reason = if basedir.as_os_str().is_empty() {
        Some("must not be empty")
    } else if basedir.is_absolute() || basedir.has_root() {
        Some("must be relative")
    } else if lexical_normalize(basedir).is_err() {
        Some("must be normalized")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ArchiveError::InvalidBasedir {
            basedir: basedir.to_path_buf(),
            reason: reason.into(),
        }),
        None => Ok(()),
    }
}

/// Checks that resolving `fs_path` yields the path itself.
///
/// A symbolic link is accepted when its parent resolves to itself; where the
/// link points is irrelevant.
fn check_resolves_to_itself(path: &Path, fs_path: &Path) -> Result<()> {
    let metadata = std::fs::symlink_metadata(fs_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArchiveError::SourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ArchiveError::Io(e)
        }
    })?;

    let (literal, resolved) = if metadata.file_type().is_symlink() {
        let parent = fs_path.parent().unwrap_or(fs_path);
        (parent, parent.canonicalize()?)
    } else {
        (fs_path, fs_path.canonicalize()?)
    };
    if resolved != literal {
        return Err(ArchiveError::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("must be normalized (resolves to {})", resolved.display()),
        });
    }
    Ok(())
}

/// Brings an exclude path into the same form as the inputs.
fn normalize_exclude(exclude: &Path, kind: PathKind, workdir: &Path) -> Result<PathBuf> {
    let exclude = lexical_normalize(exclude)?;
    Ok(match (kind, exclude.is_absolute()) {
        (PathKind::Absolute, false) => workdir.join(exclude),
        (PathKind::Relative, true) => match exclude.strip_prefix(workdir) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => exclude,
        },
        _ => exclude,
    })
}

/// Computes the name under which `path` is stored in the archive.
///
/// Relative paths already start with the base directory and are used as
/// they are; absolute paths are placed below `basedir` without their root.
///
/// # Examples
///
/// ```
/// use archive_tools_core::creation::validate::member_name;
/// use std::path::Path;
///
/// assert_eq!(
///     member_name(Path::new("bak"), Path::new("/srv/data/a.txt")),
///     Path::new("bak/srv/data/a.txt")
/// );
/// assert_eq!(
///     member_name(Path::new("base"), Path::new("base/msg.txt")),
///     Path::new("base/msg.txt")
/// );
/// ```
#[must_use]
pub fn member_name(basedir: &Path, path: &Path) -> PathBuf {
    if path.has_root() {
        let relative: PathBuf = path
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        basedir.join(relative)
    } else {
        path.to_path_buf()
    }
}
