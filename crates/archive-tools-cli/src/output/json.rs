//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use archive_tools_core::CreationReport;
use archive_tools_core::Manifest;
use archive_tools_core::ManifestEntry;
use archive_tools_core::VerificationReport;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

/// One manifest entry as emitted by `list` and `info`.
#[derive(Serialize)]
struct EntryOutput<'a> {
    path: String,
    #[serde(rename = "type")]
    kind: &'static str,
    mode: u32,
    mtime: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<&'a BTreeMap<String, String>>,
}

impl<'a> From<&'a ManifestEntry> for EntryOutput<'a> {
    fn from(entry: &'a ManifestEntry) -> Self {
        Self {
            path: entry.path.display().to_string(),
            kind: entry.type_name(),
            mode: entry.mode,
            mtime: entry.mtime,
            size: entry.size(),
            target: entry.target().map(|t| t.display().to_string()),
            checksum: entry.checksum(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, archive: &Path, report: &CreationReport) -> Result<()> {
        #[derive(Serialize)]
        struct CreationOutput {
            archive: String,
            files_added: usize,
            directories_added: usize,
            symlinks_added: usize,
            metadata_added: usize,
            bytes_read: u64,
            archive_size: u64,
            compression_ratio: f64,
            compression_percentage: f64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = CreationOutput {
            archive: archive.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            symlinks_added: report.symlinks_added,
            metadata_added: report.metadata_added,
            bytes_read: report.bytes_read,
            archive_size: report.archive_size,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("create", data))
    }

    fn format_verification_result(
        &self,
        archive: &Path,
        report: &VerificationReport,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct VerificationOutput {
            archive: String,
            members_checked: usize,
            files_checked: usize,
            bytes_hashed: u64,
            duration_ms: u128,
        }

        let data = VerificationOutput {
            archive: archive.display().to_string(),
            members_checked: report.members_checked,
            files_checked: report.files_checked,
            bytes_hashed: report.bytes_hashed,
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("verify", data))
    }

    fn format_manifest_short(&self, manifest: &Manifest) -> Result<()> {
        let paths: Vec<String> = manifest
            .iter()
            .map(|entry| entry.path.display().to_string())
            .collect();
        Self::output(&JsonOutput::success("list", paths))
    }

    fn format_manifest_long(&self, manifest: &Manifest) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput<'a> {
            version: &'a str,
            generator: &'a str,
            date: &'a str,
            checksums: &'a [String],
            metadata: &'a [String],
            entries: Vec<EntryOutput<'a>>,
        }

        let head = manifest.head();
        let data = ListOutput {
            version: &head.version,
            generator: &head.generator,
            date: &head.date,
            checksums: &head.checksums,
            metadata: &head.metadata,
            entries: manifest.iter().map(EntryOutput::from).collect(),
        };
        Self::output(&JsonOutput::success("list", data))
    }

    fn format_entry_info(&self, entry: &ManifestEntry) -> Result<()> {
        Self::output(&JsonOutput::success("info", EntryOutput::from(entry)))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("error", format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
