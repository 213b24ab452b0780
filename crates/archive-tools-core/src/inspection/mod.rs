//! Archive verification against the manifest.
//!
//! # Examples
//!
//! ```no_run
//! use archive_tools_core::verify_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! match verify_archive("base.tar.gz") {
//!     Ok(report) => println!("{} members ok", report.members_checked),
//!     Err(e) if e.is_integrity_error() => eprintln!("corrupt: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod report;
pub mod verify;

pub use report::VerificationReport;
pub use verify::verify_members;
