//! Multipart data model.
//!
//! - [`Part`]: one named entry of the body, with its filename, content type
//!   and extra headers
//! - [`ContentSource`]: where the bytes of a part come from (text, bytes, a
//!   file on disk, or a single-use reader)
//! - [`Boundary`]: the validated delimiter separating the parts
//! - [`MultipartError`]: everything that can go wrong while building a body

mod boundary;
pub use boundary::Boundary;
pub use boundary::DEFAULT_BOUNDARY;

mod content;
pub use content::ContentSource;
pub use content::ReaderSource;
pub use content::ResolvedContent;

mod part;
pub use part::Part;

mod error;
pub use error::MultipartError;
