//! Multipart encoding.
//!
//! - [`header_encoder`]: builds and serializes the header block of one part,
//!   including `Content-Disposition` escaping
//! - [`PartWriter`]: writes delimiters, headers and content of parts into any
//!   [`std::io::Write`] sink, then the closing delimiter

pub mod header_encoder;
mod part_writer;

pub use header_encoder::PartHeaders;
pub use part_writer::PartWriter;
