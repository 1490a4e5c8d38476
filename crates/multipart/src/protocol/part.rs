use crate::protocol::ContentSource;
use bytes::Bytes;
use mime::Mime;
use std::io::Read;
use std::path::PathBuf;

/// One named field or file entry of a multipart body.
///
/// A part is built with one of the constructors and then refined with the
/// `with_*` methods:
///
/// ```
/// use micro_multipart::Part;
///
/// let part = Part::text("param", "value");
/// let upload = Part::bytes("avatar", vec![0x89, 0x50, 0x4e, 0x47])
///     .with_filename("avatar.png")
///     .with_content_type(mime::IMAGE_PNG);
///
/// assert_eq!(part.name(), "param");
/// assert_eq!(upload.filename(), Some("avatar.png"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<Mime>,
    content: ContentSource,
    headers: Vec<(String, String)>,
}

impl Part {
    pub fn new<S: Into<String>, C: Into<ContentSource>>(name: S, content: C) -> Self {
        Self { name: name.into(), filename: None, content_type: None, content: content.into(), headers: Vec::new() }
    }

    /// A regular key-value field.
    pub fn text<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self::new(name, ContentSource::Text(value.into()))
    }

    /// A field holding raw bytes.
    pub fn bytes<S: Into<String>, B: Into<Bytes>>(name: S, bytes: B) -> Self {
        Self::new(name, ContentSource::Bytes(bytes.into()))
    }

    /// A file on disk; the filename defaults to the last component of `path`.
    ///
    /// The file is opened when the body is built, not here.
    pub fn file<S: Into<String>, P: Into<PathBuf>>(name: S, path: P) -> Self {
        Self::new(name, ContentSource::File(path.into()))
    }

    /// Content taken from a reader, uploaded as `filename`.
    ///
    /// The reader is consumed by the first body built from this part.
    pub fn reader<S, F, R>(name: S, filename: F, reader: R) -> Self
    where
        S: Into<String>,
        F: Into<String>,
        R: Read + Send + 'static,
    {
        Self::new(name, ContentSource::reader(reader)).with_filename(filename)
    }

    #[must_use]
    pub fn with_filename<F: Into<String>>(mut self, filename: F) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Adds an extra header line to this part.
    ///
    /// Headers keep their insertion order and the same name may be added
    /// more than once. A `Content-Disposition` or `Content-Type` header added
    /// here replaces the one derived from the part, the last one added wins.
    /// Names and values are validated when the body is built.
    #[must_use]
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    pub fn content(&self) -> &ContentSource {
        &self.content
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
