//! Expansion of validated inputs into an ordered list of filesystem objects.
//!
//! Each input is walked depth-first in the order given, children in file
//! name order. Symbolic links are recorded but never followed, including
//! when an input itself is a link to a directory.

use crate::Result;
use crate::creation::filters::SelectionRules;
use crate::creation::validate::ValidatedInputs;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// One filesystem object selected for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedEntry {
    /// Path as recorded in the manifest.
    pub path: PathBuf,
    /// Where the object lives.
    pub fs_path: PathBuf,
}

/// Result of walking the inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Walk {
    /// Selected objects in discovery order.
    pub entries: Vec<WalkedEntry>,
    /// Excludes that matched nothing.
    pub unused_excludes: Vec<PathBuf>,
}

/// Walks validated inputs and applies include/exclude rules.
///
/// # Examples
///
/// ```no_run
/// use archive_tools_core::creation::validate::validate_inputs;
/// use archive_tools_core::creation::walker::InputWalker;
/// use std::path::{Path, PathBuf};
///
/// let workdir = std::env::current_dir()?;
/// let inputs = validate_inputs(
///     Path::new("out.tar"),
///     &[PathBuf::from("base")],
///     None,
///     &[PathBuf::from("base/tmp")],
///     &workdir,
/// )?;
/// for entry in InputWalker::new(&inputs).walk()?.entries {
///     println!("{}", entry.path.display());
/// }
/// # Ok::<(), archive_tools_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct InputWalker<'a> {
    inputs: &'a ValidatedInputs,
    rules: SelectionRules,
}

impl<'a> InputWalker<'a> {
    /// Creates a walker over `inputs`.
    #[must_use]
    pub fn new(inputs: &'a ValidatedInputs) -> Self {
        let rules = SelectionRules::new(inputs.paths.clone(), inputs.excludes.clone());
        Self { inputs, rules }
    }

    /// Returns the selected objects in discovery order, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a directory cannot be read.
    pub fn walk(&self) -> Result<Walk> {
        let mut selected = Vec::new();
        let mut seen = HashSet::new();
        let mut visited = Vec::new();

        for input in &self.inputs.paths {
            let root = self.inputs.fs_path(input);
            let walker = WalkDir::new(&root)
                .follow_links(false)
                .follow_root_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    let path = logical_path(input, &root, entry.path());
                    let keep = self.rules.is_selected(&path);
                    if !keep {
                        tracing::debug!(path = %path.display(), "excluded");
                    }
                    visited.push(path);
                    keep
                });

            for entry in walker {
                let entry = entry.map_err(std::io::Error::from)?;
                let path = logical_path(input, &root, entry.path());
                if seen.insert(path.clone()) {
                    selected.push(WalkedEntry {
                        path,
                        fs_path: entry.into_path(),
                    });
                }
            }
        }

        let unused_excludes: Vec<PathBuf> = self
            .rules
            .unused_excludes(&visited)
            .map(Path::to_path_buf)
            .collect();
        for exclude in &unused_excludes {
            tracing::warn!(path = %exclude.display(), "exclude path matches nothing");
        }
        Ok(Walk {
            entries: selected,
            unused_excludes,
        })
    }
}

fn logical_path(input: &Path, root: &Path, fs_path: &Path) -> PathBuf {
    match fs_path.strip_prefix(root) {
        Ok(rest) if !rest.as_os_str().is_empty() => input.join(rest),
        _ => input.to_path_buf(),
    }
}
