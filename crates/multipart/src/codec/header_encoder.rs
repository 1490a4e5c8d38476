//! Part header construction and serialization.
//!
//! Every part starts with a `Content-Disposition` header carrying the escaped
//! field name and optional filename, followed by an optional `Content-Type`
//! and the caller supplied extra headers:
//!
//! ```text
//! Content-Disposition: form-data; name="file"; filename="file.txt"
//! Content-Type: application/octet-stream
//! X-Extra: value
//! ```
//!
//! Extra headers named `Content-Disposition` or `Content-Type` replace the
//! derived value in place, the last one wins.

use crate::protocol::{MultipartError, Part};
use bytes::{BufMut, BytesMut};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{HeaderName, HeaderValue};
use std::borrow::Cow;

/// Escapes `\` and `"` for use inside a quoted header parameter.
///
/// Both characters are replaced in a single pass over the input, so a
/// backslash produced by escaping a quote is never escaped again.
pub fn escape_quoted(s: &str) -> Cow<'_, str> {
    if !s.contains(['\\', '"']) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Builds the `Content-Disposition` value of a form-data part.
pub fn content_disposition(name: &str, filename: Option<&str>) -> String {
    let mut value = format!("form-data; name=\"{}\"", escape_quoted(name));
    if let Some(filename) = filename {
        value.push_str("; filename=\"");
        value.push_str(&escape_quoted(filename));
        value.push('"');
    }
    value
}

/// The ordered header lines of one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartHeaders {
    lines: Vec<HeaderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderLine {
    key: HeaderName,
    // spelling written on the wire, `HeaderName` is always lowercase
    name: Cow<'static, str>,
    value: HeaderValue,
}

impl PartHeaders {
    /// Builds the headers of `part`.
    ///
    /// `default_filename` is used when the part has no explicit filename,
    /// file sources provide the base name of their path here. A part with a
    /// filename but no content type is sent as `application/octet-stream`.
    pub fn build(part: &Part, default_filename: Option<&str>) -> Result<Self, MultipartError> {
        let filename = part.filename().or(default_filename);
        let mut lines = Vec::with_capacity(2 + part.headers().len());

        let disposition = content_disposition(part.name(), filename);
        lines.push(HeaderLine {
            key: CONTENT_DISPOSITION,
            name: Cow::Borrowed("Content-Disposition"),
            value: header_value(part, &disposition)?,
        });

        let content_type = part.content_type().cloned().or_else(|| filename.map(|_| mime::APPLICATION_OCTET_STREAM));
        if let Some(content_type) = content_type {
            lines.push(HeaderLine {
                key: CONTENT_TYPE,
                name: Cow::Borrowed("Content-Type"),
                value: header_value(part, content_type.as_ref())?,
            });
        }

        for (name, value) in part.headers() {
            let key = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| MultipartError::invalid_header(part.name(), format!("{name:?}: {e}")))?;
            let line = HeaderLine { key, name: Cow::Owned(name.clone()), value: header_value(part, value)? };

            let single_valued = line.key == CONTENT_DISPOSITION || line.key == CONTENT_TYPE;
            match lines.iter().position(|existing| single_valued && existing.key == line.key) {
                Some(index) => lines[index] = line,
                None => lines.push(line),
            }
        }

        Ok(Self { lines })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the first value of the header `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let key = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.lines.iter().find(|line| line.key == key).map(|line| &line.value)
    }

    /// Iterates the header lines as they are written on the wire.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.lines.iter().map(|line| (line.name.as_ref(), &line.value))
    }

    /// Writes every header line followed by the blank line ending the header block.
    pub fn encode(&self, dst: &mut BytesMut) {
        for line in &self.lines {
            dst.put_slice(line.name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(line.value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
    }
}

// `from_bytes` rather than `from_str`, filenames may carry UTF-8
fn header_value(part: &Part, value: &str) -> Result<HeaderValue, MultipartError> {
    HeaderValue::from_bytes(value.as_bytes())
        .map_err(|e| MultipartError::invalid_header(part.name(), format!("{value:?}: {e}")))
}
