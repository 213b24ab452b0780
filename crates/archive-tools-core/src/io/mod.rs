//! I/O adapters shared by the container writer and reader.

pub mod counting;

pub use counting::CountingReader;
pub use counting::CountingWriter;
