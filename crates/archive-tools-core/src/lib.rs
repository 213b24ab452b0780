//! Self-describing tar archives.
//!
//! `archive-tools-core` packs a set of files, directories and symbolic links
//! into a tar container, optionally compressed, whose first member is a
//! manifest listing every other member with its type, permissions,
//! modification time and checksums. An archive can later be opened and
//! verified against that manifest without extracting it.
//!
//! # Examples
//!
//! ```no_run
//! use archive_tools_core::Archive;
//! use archive_tools_core::CompressionCodec;
//! use archive_tools_core::CreationConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CreationConfig::default()
//!     .with_exclude("base/tmp")
//!     .with_compression(Some(CompressionCodec::Gzip));
//! let report = Archive::new("base.tar.gz").create(&[PathBuf::from("base")], &config)?;
//! println!("archived {} files", report.files_added);
//!
//! let archive = Archive::open("base.tar.gz")?;
//! archive.verify()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod config;
pub mod container;
pub mod creation;
pub mod error;
pub mod inspection;
pub mod io;
pub mod manifest;

#[doc(hidden)]
pub mod test_utils;

pub use api::create_archive;
pub use api::verify_archive;
pub use archive::Archive;
pub use config::CreationConfig;
pub use container::CompressionCodec;
pub use creation::ArchiveCreator;
pub use creation::CreationReport;
pub use creation::NoopProgress;
pub use creation::ProgressCallback;
pub use error::ArchiveError;
pub use error::Result;
pub use inspection::VerificationReport;
pub use manifest::Manifest;
pub use manifest::checksum::ChecksumAlgorithm;
pub use manifest::entry::EntryKind;
pub use manifest::entry::ManifestEntry;
