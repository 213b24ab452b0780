//! Include/exclude resolution.
//!
//! Every walked path is decided by the deepest include or exclude rule that
//! is equal to it or one of its ancestors. When an include and an exclude
//! name the same path, the exclude wins. As a result an explicit include
//! below an excluded directory survives, and an exclude below an explicit
//! include prunes only its own subtree.

use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Include,
    Exclude,
}

/// The include and exclude rules of one creation call.
///
/// # Examples
///
/// ```
/// use archive_tools_core::creation::filters::SelectionRules;
/// use std::path::Path;
/// use std::path::PathBuf;
///
/// let rules = SelectionRules::new(
///     vec![PathBuf::from("base"), PathBuf::from("base/data/rnd1.dat")],
///     vec![PathBuf::from("base/data")],
/// );
/// assert!(rules.is_selected(Path::new("base/msg.txt")));
/// assert!(!rules.is_selected(Path::new("base/data/rnd2.dat")));
/// assert!(rules.is_selected(Path::new("base/data/rnd1.dat")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRules {
    includes: Vec<PathBuf>,
    excludes: Vec<PathBuf>,
}

impl SelectionRules {
    /// Creates rules from normalized includes and excludes.
    #[must_use]
    pub const fn new(includes: Vec<PathBuf>, excludes: Vec<PathBuf>) -> Self {
        Self { includes, excludes }
    }

    /// Returns `true` if `path` belongs in the archive.
    #[must_use]
    pub fn is_selected(&self, path: &Path) -> bool {
        self.decide(path) == Some(Decision::Include)
    }

    fn decide(&self, path: &Path) -> Option<Decision> {
        let mut best: Option<(usize, Decision)> = None;
        let rules = self
            .includes
            .iter()
            .map(|p| (p, Decision::Include))
            .chain(self.excludes.iter().map(|p| (p, Decision::Exclude)));

        for (rule, decision) in rules {
            if !path.starts_with(rule) {
                continue;
            }
            let depth = rule.components().count();
            let wins = match best {
                None => true,
                Some((best_depth, _)) => {
                    depth > best_depth
                        || (depth == best_depth && decision == Decision::Exclude)
                }
            };
            if wins {
                best = Some((depth, decision));
            }
        }
        best.map(|(_, decision)| decision)
    }

    /// Excludes that do not cover any of `walked`.
    pub fn unused_excludes<'a>(
        &'a self,
        walked: &'a [PathBuf],
    ) -> impl Iterator<Item = &'a Path> + 'a {
        self.excludes
            .iter()
            .filter(move |e| !walked.iter().any(|w| w.starts_with(e.as_path())))
            .map(PathBuf::as_path)
    }
}
