//! Tar container, optionally compressed.
//!
//! The writer appends named members with their header metadata; the reader
//! iterates members in write order, looks them up by name and streams their
//! data.

pub mod codec;
pub mod reader;
pub mod writer;

pub use codec::CompressionCodec;
pub use reader::ContainerReader;
pub use reader::MemberInfo;
pub use reader::MemberKind;
pub use writer::ContainerWriter;
pub use writer::MemberMeta;
