//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use archive_tools_core::CreationReport;
use archive_tools_core::EntryKind;
use archive_tools_core::Manifest;
use archive_tools_core::ManifestEntry;
use archive_tools_core::VerificationReport;
use console::Term;
use console::style;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn headline(&self, text: &str) {
        if self.use_colors {
            self.line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            self.line(text);
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn format_mtime(mtime: i64) -> String {
        chrono::DateTime::from_timestamp(mtime, 0).map_or_else(
            || mtime.to_string(),
            |t| t.format("%Y-%m-%d %H:%M").to_string(),
        )
    }

    const fn type_char(entry: &ManifestEntry) -> char {
        match entry.kind {
            EntryKind::Directory => 'd',
            EntryKind::File { .. } => '-',
            EntryKind::Symlink { .. } => 'l',
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_creation_result(&self, archive: &Path, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Archive created: {}", archive.display()));
        self.line("");
        self.line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        self.line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        self.line(&format!(
            "  Symlinks:         {}",
            Self::format_number(report.symlinks_added)
        ));
        self.line(&format!(
            "  Content size:     {}",
            Self::format_size(report.bytes_read)
        ));
        self.line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_size)
        ));

        let saved = report.compression_percentage();
        if saved > 0.0 {
            self.line(&format!("  Compression:      {saved:.1}%"));
        }

        if self.verbose {
            if report.metadata_added > 0 {
                self.line(&format!("  Metadata members: {}", report.metadata_added));
            }
            self.line(&format!("  Duration:         {:?}", report.duration));
        }

        if report.has_warnings() {
            self.line("");
            if self.use_colors {
                self.line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                self.line("Warnings:");
            }
            for warning in &report.warnings {
                self.line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_verification_result(
        &self,
        archive: &Path,
        report: &VerificationReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Archive verified: {}", archive.display()));
        self.line(&format!(
            "  Entries checked:  {}",
            Self::format_number(report.members_checked)
        ));
        self.line(&format!(
            "  Files hashed:     {}",
            Self::format_number(report.files_checked)
        ));
        self.line(&format!(
            "  Bytes hashed:     {}",
            Self::format_size(report.bytes_hashed)
        ));
        if self.verbose {
            self.line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_manifest_short(&self, manifest: &Manifest) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in manifest.iter() {
            self.line(&entry.path.display().to_string());
        }

        Ok(())
    }

    fn format_manifest_long(&self, manifest: &Manifest) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut total_size = 0;
        for entry in manifest.iter() {
            let size = entry.size().unwrap_or(0);
            total_size += size;

            let mut line = format!(
                "{}{:04o} {:>10}  {}  {}",
                Self::type_char(entry),
                entry.mode,
                size,
                Self::format_mtime(entry.mtime),
                entry.path.display()
            );
            if let Some(target) = entry.target() {
                line.push_str(&format!(" -> {}", target.display()));
            }
            self.line(&line);
        }

        self.line("");
        self.line(&format!(
            "Total: {} entries, {}",
            Self::format_number(manifest.len()),
            Self::format_size(total_size)
        ));

        Ok(())
    }

    fn format_entry_info(&self, entry: &ManifestEntry) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&format!("Path:   {}", entry.path.display()));
        self.line(&format!("Type:   {}", entry.type_name()));
        self.line(&format!("Mode:   {:04o}", entry.mode));
        self.line(&format!(
            "Mtime:  {} ({})",
            Self::format_mtime(entry.mtime),
            entry.mtime
        ));
        match &entry.kind {
            EntryKind::Directory => {}
            EntryKind::File { size, checksum } => {
                self.line(&format!("Size:   {size}"));
                for (algorithm, digest) in checksum {
                    self.line(&format!("{:<7} {digest}", format!("{algorithm}:")));
                }
            }
            EntryKind::Symlink { target } => {
                self.line(&format!("Target: {}", target.display()));
            }
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_mtime() {
        assert_eq!(HumanFormatter::format_mtime(0), "1970-01-01 00:00");
        assert_eq!(
            HumanFormatter::format_mtime(1_700_000_000),
            "2023-11-14 22:13"
        );
        assert_eq!(HumanFormatter::format_mtime(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_type_char() {
        let entry = ManifestEntry {
            path: "base/s.dat".into(),
            mode: 0o777,
            mtime: 0,
            kind: EntryKind::Symlink {
                target: "data/rnd.dat".into(),
            },
        };
        assert_eq!(HumanFormatter::type_char(&entry), 'l');
    }
}
