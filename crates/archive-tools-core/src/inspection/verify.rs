//! Checking container members against the manifest.
//!
//! Entries are checked in manifest order and the first mismatch is returned
//! as an [`ArchiveError::Integrity`]. File contents are hashed in a single
//! pass over the container before the per-entry checks run.

use crate::ArchiveError;
use crate::Result;
use crate::container::ContainerReader;
use crate::container::MemberInfo;
use crate::container::MemberKind;
use crate::container::reader::MemberDigest;
use crate::creation::validate::member_name;
use crate::inspection::report::VerificationReport;
use crate::manifest::Manifest;
use crate::manifest::checksum::ChecksumAlgorithm;
use crate::manifest::checksum::known_algorithms;
use crate::manifest::entry::EntryKind;
use crate::manifest::entry::ManifestEntry;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

/// Verifies every entry of `manifest` against the members of `reader`.
///
/// `basedir` is the directory holding the manifest member; absolute entry
/// paths are looked up below it.
///
/// # Errors
///
/// Returns `Integrity` naming the first entry that is missing or differs in
/// mode, modification time, type, size, checksum or link target. A checksum
/// with an unknown algorithm fails the entry that records it. I/O errors are
/// propagated.
pub fn verify_members(
    reader: &ContainerReader,
    manifest: &Manifest,
    basedir: &Path,
) -> Result<VerificationReport> {
    let start = Instant::now();

    let mut selection: HashMap<PathBuf, Vec<ChecksumAlgorithm>> = HashMap::new();
    for entry in manifest {
        if let EntryKind::File { checksum, .. } = &entry.kind {
            selection.insert(member_name(basedir, &entry.path), known_algorithms(checksum));
        }
    }
    let (digests, bytes_hashed) = reader.digest_members(&selection)?;

    let mut report = VerificationReport::new();
    for entry in manifest {
        let name = member_name(basedir, &entry.path);
        let member = reader
            .member(&name)
            .ok_or_else(|| ArchiveError::integrity(reader.path(), &entry.path, "missing"))?;
        check_entry(reader.path(), entry, member, digests.get(&name))?;
        tracing::debug!(path = %entry.path.display(), "verified");

        report.members_checked += 1;
        if entry.is_file() {
            report.files_checked += 1;
        }
    }
    report.bytes_hashed = bytes_hashed;
    report.duration = start.elapsed();
    Ok(report)
}

fn check_entry(
    archive: &Path,
    entry: &ManifestEntry,
    member: &MemberInfo,
    digest: Option<&MemberDigest>,
) -> Result<()> {
    let fail = |reason: String| ArchiveError::integrity(archive, &entry.path, reason);

    if member.mode != entry.mode {
        return Err(fail("wrong mode".into()));
    }
    if member.mtime != entry.mtime {
        return Err(fail("wrong modification time".into()));
    }

    match &entry.kind {
        EntryKind::Directory => {
            if member.kind != MemberKind::Directory {
                return Err(fail("wrong type, expected directory".into()));
            }
        }
        EntryKind::File { size, checksum } => {
            if member.kind != MemberKind::File {
                return Err(fail("wrong type, expected regular file".into()));
            }
            if member.size != *size {
                return Err(fail("wrong size".into()));
            }
            let digest = digest.ok_or_else(|| fail("member data not hashed".into()))?;
            if digest.size != *size {
                return Err(fail("wrong size".into()));
            }
            for (algorithm, expected) in checksum {
                if algorithm.parse::<ChecksumAlgorithm>().is_err() {
                    return Err(fail(format!("unsupported checksum algorithm {algorithm}")));
                }
                if digest.checksums.get(algorithm) != Some(expected) {
                    return Err(fail(format!("checksum {algorithm} differs")));
                }
            }
        }
        EntryKind::Symlink { target } => {
            if member.kind != MemberKind::Symlink {
                return Err(fail("wrong type, expected symbolic link".into()));
            }
            if member.link_target.as_deref() != Some(target.as_path()) {
                return Err(fail("wrong symlink target".into()));
            }
        }
    }
    Ok(())
}
