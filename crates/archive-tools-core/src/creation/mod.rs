//! Archive creation.
//!
//! Inputs are validated first ([`validate`]), then expanded into an ordered
//! list of filesystem objects ([`walker`], [`filters`]). [`creator`] offers a
//! fluent builder over [`crate::Archive::create`].

pub mod compression;
pub mod creator;
pub mod filters;
pub mod progress;
pub mod report;
pub mod validate;
pub mod walker;

pub use creator::ArchiveCreator;
pub use progress::NoopProgress;
pub use progress::ProgressCallback;
pub use report::CreationReport;
pub use validate::PathKind;
pub use validate::ValidatedInputs;
pub use walker::InputWalker;
pub use walker::WalkedEntry;
