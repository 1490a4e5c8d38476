use crate::body::MultipartBody;
use crate::codec::PartWriter;
use crate::protocol::{Boundary, ContentSource, MultipartError, Part};
use bytes::{BufMut, BytesMut};
use std::io::Write;
use tracing::{debug, error};

/// Rough per-part allowance for the delimiter and header lines
const PART_OVERHEAD: usize = 128;

/// A multipart/form-data body made of ordered [`Part`]s.
///
/// Parts are encoded in the order they were added. The boundary defaults to
/// [`DEFAULT_BOUNDARY`](crate::protocol::DEFAULT_BOUNDARY).
///
/// ```
/// use micro_multipart::{Multipart, Part};
///
/// let multipart = Multipart::new().part(Part::text("param", "value"));
/// let body = multipart.body().unwrap();
///
/// assert_eq!(multipart.content_type(), "multipart/form-data; boundary=SlingFormBoundary0amF3aGVy");
/// assert_eq!(&body.as_bytes()[..], b"--SlingFormBoundary0amF3aGVy\r\n\
///     Content-Disposition: form-data; name=\"param\"\r\n\
///     \r\n\
///     value\r\n\
///     --SlingFormBoundary0amF3aGVy--\r\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multipart {
    boundary: Boundary,
    parts: Vec<Part>,
}

impl Multipart {
    /// Creates an empty body using the default boundary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a body from `parts`, kept in iteration order.
    pub fn with_parts<I: IntoIterator<Item = Part>>(parts: I) -> Self {
        Self { boundary: Boundary::default(), parts: parts.into_iter().collect() }
    }

    /// Replaces the boundary, see [`Boundary::random`] for binary content.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Appends a part.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// The boundary delimiting the parts.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// The parts in the order they are encoded.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The `Content-Type` header value for this body.
    ///
    /// Only depends on the boundary. The boundary is quoted when it contains
    /// characters that are not allowed in a bare parameter value.
    pub fn content_type(&self) -> String {
        if self.boundary.needs_quoting() {
            format!("{}; boundary=\"{}\"", mime::MULTIPART_FORM_DATA, self.boundary)
        } else {
            format!("{}; boundary={}", mime::MULTIPART_FORM_DATA, self.boundary)
        }
    }

    /// Builds the whole body in memory.
    ///
    /// Files are opened and readers consumed here, in part order. Any failure
    /// aborts the build and no partial body is returned. A part built from a
    /// reader is empty in every body after the first one.
    ///
    /// The body is buffered entirely, use [`Multipart::write_to`] to stream
    /// large uploads into a sink instead.
    pub fn body(&self) -> Result<MultipartBody, MultipartError> {
        let buf = BytesMut::with_capacity(self.size_estimate());
        let data = self.encode(buf.writer())?.into_inner().freeze();

        debug!(parts = self.parts.len(), bytes = data.len(), "multipart body built");
        Ok(MultipartBody::new(self.content_type(), data))
    }

    /// Streams the body into `sink` and returns it.
    ///
    /// Unlike [`Multipart::body`], the sink keeps whatever was written
    /// before a failure.
    pub fn write_to<W: Write>(&self, sink: W) -> Result<W, MultipartError> {
        self.encode(sink)
    }

    /// Builds the body on tokio's blocking pool.
    ///
    /// Building reads files synchronously, so async callers should use this
    /// rather than calling [`Multipart::body`] on a runtime worker.
    pub async fn spawn_body(&self) -> Result<MultipartBody, MultipartError> {
        let multipart = self.clone();
        tokio::task::spawn_blocking(move || multipart.body()).await?
    }

    fn encode<W: Write>(&self, sink: W) -> Result<W, MultipartError> {
        let mut writer = PartWriter::new(sink, self.boundary.clone());

        for part in &self.parts {
            if let Err(e) = writer.write_part(part) {
                error!(part = part.name(), cause = %e, "failed to encode multipart body");
                return Err(e);
            }
        }

        writer.close()
    }

    fn size_estimate(&self) -> usize {
        let content: usize = self
            .parts
            .iter()
            .map(|part| match part.content() {
                ContentSource::Text(text) => text.len(),
                ContentSource::Bytes(bytes) => bytes.len(),
                ContentSource::File(_) | ContentSource::Reader(_) => 0,
            })
            .sum();
        content + (self.parts.len() + 1) * PART_OVERHEAD
    }
}

impl FromIterator<Part> for Multipart {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        Self::with_parts(iter)
    }
}

impl Extend<Part> for Multipart {
    fn extend<I: IntoIterator<Item = Part>>(&mut self, iter: I) {
        self.parts.extend(iter);
    }
}
