//! A multipart/form-data request body encoder
//!
//! This crate builds the body of an HTTP `multipart/form-data` request from a
//! list of named parts, whatever their origin: in-memory text or bytes, files
//! on disk, or arbitrary readers. The resulting body plugs into any HTTP
//! client that accepts an [`http_body::Body`] or plain bytes, and into
//! [`http::request::Builder`] through [`RequestBuilderExt`].
//!
//! # Features
//!
//! - RFC 7578 wire format with CRLF line endings
//! - Escaped field names and filenames in `Content-Disposition`
//! - Per-part content type and extra headers
//! - Files opened lazily and released on every exit path
//! - Fixed, caller chosen or random boundaries
//!
//! # Example
//!
//! ```no_run
//! use http::Request;
//! use micro_multipart::{Multipart, Part, RequestBuilderExt};
//! use std::io::Cursor;
//!
//! let multipart = Multipart::new()
//!     .part(Part::text("param", "value"))
//!     .part(Part::reader("reader", "reader.txt", Cursor::new("readervalue")))
//!     .part(Part::file("file", "fixtures/file.txt"));
//!
//! let request = Request::post("http://localhost:8080/upload")
//!     .provide_body(&multipart)
//!     .expect("failed to build the upload request");
//!
//! assert_eq!(
//!     request.headers()[http::header::CONTENT_TYPE],
//!     "multipart/form-data; boundary=SlingFormBoundary0amF3aGVy"
//! );
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the data model, [`Part`], [`ContentSource`], [`Boundary`]
//!   and [`MultipartError`]
//! - [`codec`]: header construction and the [`codec::PartWriter`] that writes
//!   parts into any [`std::io::Write`]
//! - [`Multipart`]: the ordered list of parts and the entry point to build a
//!   [`MultipartBody`]
//! - [`BodyProvider`]: the seam consumed by HTTP clients
//!
//! # Error Handling
//!
//! Every failure aborts the whole body and is reported as a
//! [`MultipartError`] naming the part being written. Nothing is retried.
//!
//! # Limitations
//!
//! - [`Multipart::body`] buffers the whole body in memory, stream large
//!   uploads with [`Multipart::write_to`]
//! - The boundary is not checked against part contents
//! - A part built from a reader is consumed by the first body built

mod body;
mod multipart;
mod provider;

pub mod codec;
pub mod protocol;

pub use body::MultipartBody;
pub use multipart::Multipart;
pub use protocol::{Boundary, ContentSource, MultipartError, Part};
pub use provider::BodyProvider;
pub use provider::RequestBuilderExt;
