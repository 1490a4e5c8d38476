//! Multipart boundary handling.
//!
//! A boundary separates the parts of a multipart body. It appears verbatim in
//! the `Content-Type` header value and as the `--boundary` delimiter lines.
//! The encoder never checks whether the boundary occurs inside part content,
//! callers uploading arbitrary binary data should prefer [`Boundary::random`].

use crate::protocol::MultipartError;
use rand::RngCore;
use std::fmt;

/// The boundary used when none is configured.
pub const DEFAULT_BOUNDARY: &str = "SlingFormBoundary0amF3aGVy";

/// Maximum boundary length allowed by RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

/// Number of random bytes drawn for a generated boundary.
const RANDOM_BOUNDARY_BYTES: usize = 30;

/// A validated multipart boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary {
    value: String,
}

impl Boundary {
    /// Creates a boundary from a caller chosen value.
    ///
    /// The value must be 1 to 70 characters long, contain only the characters
    /// RFC 2046 allows (`A-Z a-z 0-9 ' ( ) + _ , - . / : = ?` and space), and
    /// must not end with a space.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, MultipartError> {
        let value = value.into();

        if value.is_empty() || value.len() > MAX_BOUNDARY_LEN {
            return Err(MultipartError::invalid_boundary(&value, format!("length must be 1..={MAX_BOUNDARY_LEN}")));
        }

        if let Some(c) = value.chars().find(|c| !is_boundary_char(*c)) {
            return Err(MultipartError::invalid_boundary(&value, format!("invalid character {c:?}")));
        }

        if value.ends_with(' ') {
            return Err(MultipartError::invalid_boundary(&value, "must not end with a space"));
        }

        Ok(Self { value })
    }

    /// Generates a random 60 character hex boundary.
    pub fn random() -> Self {
        let mut bytes = [0u8; RANDOM_BOUNDARY_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { value: hex::encode(bytes) }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the boundary has to be quoted inside a `Content-Type` parameter.
    pub(crate) fn needs_quoting(&self) -> bool {
        self.value.chars().any(|c| matches!(c, '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '=' | ' '))
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self { value: DEFAULT_BOUNDARY.to_owned() }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for Boundary {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl TryFrom<&str> for Boundary {
    type Error = MultipartError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Boundary {
    type Error = MultipartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[inline]
fn is_boundary_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' ')
}
