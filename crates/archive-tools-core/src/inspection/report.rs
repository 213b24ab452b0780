//! Verification reporting.

use std::time::Duration;

/// Report of a successful verification.
///
/// Verification stops at the first mismatch and returns it as an error, so a
/// report always describes an archive that matched its manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Number of manifest entries checked.
    pub members_checked: usize,

    /// Number of regular file members among them.
    pub files_checked: usize,

    /// Bytes of member data hashed.
    pub bytes_hashed: u64,

    /// Duration of the verification.
    pub duration: Duration,
}

impl VerificationReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
