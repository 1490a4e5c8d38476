//! Content sources for multipart parts.
//!
//! A [`ContentSource`] describes where the bytes of one part come from. The
//! set of sources is closed: in-memory text, in-memory bytes, a file on disk,
//! or an arbitrary reader. Each source is turned into a [`ResolvedContent`]
//! right before the part is written; dropping the resolved content releases
//! whatever it holds (file handle, reader), on the success path as well as
//! when copying fails halfway.

use bytes::Bytes;
use std::fmt;
use std::fs::File;
use std::io;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

type BoxReader = Box<dyn Read + Send>;

/// Where the bytes of a part come from.
#[derive(Clone)]
pub enum ContentSource {
    /// In-memory text, can be resolved any number of times.
    Text(String),
    /// In-memory bytes, can be resolved any number of times.
    Bytes(Bytes),
    /// A file that is opened each time the source is resolved.
    File(PathBuf),
    /// A single-use reader.
    Reader(ReaderSource),
}

impl ContentSource {
    pub fn reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::Reader(ReaderSource::new(reader))
    }

    /// Resolves the source into a readable stream.
    ///
    /// A file source is opened here, and a missing or unreadable file is
    /// reported as an [`io::Error`]. A reader source that has already been
    /// consumed resolves to empty content.
    pub fn resolve(&self) -> io::Result<ResolvedContent> {
        match self {
            Self::Text(text) => Ok(ResolvedContent::new(Cursor::new(Bytes::from(text.clone())), None, "text")),
            Self::Bytes(bytes) => Ok(ResolvedContent::new(Cursor::new(bytes.clone()), None, "bytes")),
            Self::File(path) => {
                let file = File::open(path)?;
                Ok(ResolvedContent::new(file, file_name(path), "file"))
            }
            Self::Reader(source) => match source.take() {
                Some(reader) => Ok(ResolvedContent::boxed(reader, None, "reader")),
                None => {
                    trace!("reader already consumed, resolving to empty content");
                    Ok(ResolvedContent::new(io::empty(), None, "reader"))
                }
            },
        }
    }

    /// Returns true if resolving the source again yields the same bytes.
    pub fn is_repeatable(&self) -> bool {
        !matches!(self, Self::Reader(_))
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Reader(source) => f.debug_tuple("Reader").field(source).finish(),
        }
    }
}

impl PartialEq for ContentSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::File(a), Self::File(b)) => a == b,
            (Self::Reader(a), Self::Reader(b)) => a == b,
            _ => false,
        }
    }
}

impl From<String> for ContentSource {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ContentSource {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Bytes> for ContentSource {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

/// Shared slot holding a single-use reader.
///
/// Clones share the slot, so whichever clone resolves first consumes the
/// reader. Two sources compare equal only when they share the same slot.
#[derive(Clone)]
pub struct ReaderSource {
    slot: Arc<Mutex<Option<BoxReader>>>,
}

impl ReaderSource {
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(Box::new(reader)))) }
    }

    fn take(&self) -> Option<BoxReader> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Returns true once the reader has been handed out.
    pub fn is_consumed(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl fmt::Debug for ReaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSource").field("consumed", &self.is_consumed()).finish()
    }
}

impl PartialEq for ReaderSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

/// A resolved content source, ready to be copied into a part body.
///
/// The underlying resource is released when this value is dropped.
pub struct ResolvedContent {
    reader: BoxReader,
    default_filename: Option<String>,
    kind: &'static str,
}

impl ResolvedContent {
    fn new<R: Read + Send + 'static>(reader: R, default_filename: Option<String>, kind: &'static str) -> Self {
        Self::boxed(Box::new(reader), default_filename, kind)
    }

    fn boxed(reader: BoxReader, default_filename: Option<String>, kind: &'static str) -> Self {
        Self { reader, default_filename, kind }
    }

    /// The filename derived from the source, set for file sources only.
    pub fn default_filename(&self) -> Option<&str> {
        self.default_filename.as_deref()
    }
}

impl Read for ResolvedContent {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Drop for ResolvedContent {
    fn drop(&mut self) {
        trace!(kind = self.kind, "release content source");
    }
}

impl fmt::Debug for ResolvedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedContent")
            .field("kind", &self.kind)
            .field("default_filename", &self.default_filename)
            .finish_non_exhaustive()
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
