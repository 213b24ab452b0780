//! Output formatter trait for CLI results.

use anyhow::Result;
use archive_tools_core::CreationReport;
use archive_tools_core::Manifest;
use archive_tools_core::ManifestEntry;
use archive_tools_core::VerificationReport;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format creation result
    fn format_creation_result(&self, archive: &Path, report: &CreationReport) -> Result<()>;

    /// Format verification result
    fn format_verification_result(&self, archive: &Path, report: &VerificationReport)
    -> Result<()>;

    /// Format manifest listing, paths only
    fn format_manifest_short(&self, manifest: &Manifest) -> Result<()>;

    /// Format manifest listing with type, mode, size and mtime
    fn format_manifest_long(&self, manifest: &Manifest) -> Result<()>;

    /// Format every field of one manifest entry
    fn format_entry_info(&self, entry: &ManifestEntry) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
