use crate::codec::PartHeaders;
use crate::protocol::{Boundary, ContentSource, MultipartError, Part};
use bytes::{BufMut, BytesMut};
use std::io;
use std::io::{Read, Write};
use tracing::{debug, error};

/// Buffer size used to copy part content into the sink
const COPY_BUF_SIZE: usize = 8 * 1024;

/// Initial size of the buffer holding the delimiter and headers of one part
const INIT_HEADER_SIZE: usize = 512;

/// Writes multipart parts into an [`io::Write`] sink.
///
/// Parts are written in the order [`PartWriter::write_part`] is called. The
/// body is only complete after [`PartWriter::close`] wrote the closing
/// delimiter.
///
/// A failed [`PartWriter::write_part`] may leave a truncated part in the
/// sink, so the writer refuses every later part and the closing delimiter.
///
/// ```text
/// --boundary\r\n
/// Content-Disposition: form-data; name="param"\r\n
/// \r\n
/// value\r\n
/// --boundary--\r\n
/// ```
#[derive(Debug)]
pub struct PartWriter<W> {
    sink: W,
    boundary: Boundary,
    parts_written: usize,
    failed: bool,
    scratch: BytesMut,
}

impl<W: Write> PartWriter<W> {
    /// Creates a writer that delimits parts in `sink` with `boundary`.
    pub fn new(sink: W, boundary: Boundary) -> Self {
        Self { sink, boundary, parts_written: 0, failed: false, scratch: BytesMut::with_capacity(INIT_HEADER_SIZE) }
    }

    /// The boundary delimiting the parts.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Number of parts completely written so far.
    pub fn parts_written(&self) -> usize {
        self.parts_written
    }

    /// Resolves the content of `part` and writes it as the next part.
    ///
    /// Returns the number of content bytes copied. The resolved content is
    /// released before this returns, whether writing succeeded or not.
    ///
    /// Once a call failed, every later call fails without touching the sink.
    pub fn write_part(&mut self, part: &Part) -> Result<u64, MultipartError> {
        if self.failed {
            return Err(Self::aborted());
        }

        let result = self.encode_part(part);
        self.failed = result.is_err();
        result
    }

    fn encode_part(&mut self, part: &Part) -> Result<u64, MultipartError> {
        let mut content = part.content().resolve().map_err(|e| match part.content() {
            ContentSource::File(path) => MultipartError::open(part.name(), path, e),
            _ => MultipartError::read(part.name(), e),
        })?;

        let headers = PartHeaders::build(part, content.default_filename())?;

        self.scratch.clear();
        if self.parts_written > 0 {
            self.scratch.put_slice(b"\r\n");
        }
        self.scratch.put_slice(b"--");
        self.scratch.put_slice(self.boundary.as_str().as_bytes());
        self.scratch.put_slice(b"\r\n");
        headers.encode(&mut self.scratch);

        self.sink.write_all(&self.scratch).map_err(MultipartError::write)?;
        let copied = copy(part.name(), &mut content, &mut self.sink)?;
        self.parts_written += 1;

        debug!(
            name = part.name(),
            filename = ?part.filename().or(content.default_filename()),
            bytes = copied,
            "part written"
        );
        Ok(copied)
    }

    /// Writes the closing delimiter and returns the sink.
    ///
    /// Fails without writing anything if an earlier part failed.
    pub fn close(mut self) -> Result<W, MultipartError> {
        if self.failed {
            return Err(Self::aborted());
        }

        self.scratch.clear();
        if self.parts_written > 0 {
            self.scratch.put_slice(b"\r\n");
        }
        self.scratch.put_slice(b"--");
        self.scratch.put_slice(self.boundary.as_str().as_bytes());
        self.scratch.put_slice(b"--\r\n");

        self.sink.write_all(&self.scratch).map_err(MultipartError::write)?;
        self.sink.flush().map_err(MultipartError::write)?;
        Ok(self.sink)
    }

    fn aborted() -> MultipartError {
        MultipartError::write(io::Error::other("an earlier part failed, the body is incomplete"))
    }
}

fn copy<R, W>(part: &str, reader: &mut R, writer: &mut W) -> Result<u64, MultipartError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; COPY_BUF_SIZE];
    let mut copied = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(copied),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(part, cause = %e, "failed to read part content");
                return Err(MultipartError::read(part, e));
            }
        };

        writer.write_all(&buf[..n]).map_err(MultipartError::write)?;
        copied += n as u64;
    }
}
