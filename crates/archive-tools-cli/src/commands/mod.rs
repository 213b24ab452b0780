//! Subcommand implementations.

pub mod completion;
pub mod create;
pub mod info;
pub mod list;
pub mod verify;
