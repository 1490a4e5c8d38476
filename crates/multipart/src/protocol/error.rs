use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MultipartError {
    #[error("can't open file {path:?} for part {part:?}: {source}")]
    Open {
        part: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error in part {part:?}: {source}")]
    Read {
        part: String,
        #[source]
        source: io::Error,
    },

    #[error("write error: {source}")]
    Write {
        #[from]
        source: io::Error,
    },

    #[error("invalid header in part {part:?}: {reason}")]
    InvalidHeader { part: String, reason: String },

    #[error("invalid boundary {boundary:?}: {reason}")]
    InvalidBoundary { boundary: String, reason: String },

    #[error("request error: {source}")]
    Request {
        #[from]
        source: http::Error,
    },

    #[error("body task cancelled: {source}")]
    Cancelled {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl MultipartError {
    pub fn open<S: ToString, P: Into<PathBuf>>(part: S, path: P, source: io::Error) -> Self {
        Self::Open { part: part.to_string(), path: path.into(), source }
    }

    pub fn read<S: ToString>(part: S, source: io::Error) -> Self {
        Self::Read { part: part.to_string(), source }
    }

    pub fn write<E: Into<io::Error>>(e: E) -> Self {
        Self::Write { source: e.into() }
    }

    pub fn invalid_header<S: ToString, R: ToString>(part: S, reason: R) -> Self {
        Self::InvalidHeader { part: part.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_boundary<S: ToString, R: ToString>(boundary: S, reason: R) -> Self {
        Self::InvalidBoundary { boundary: boundary.to_string(), reason: reason.to_string() }
    }

    /// Returns true if the error was caused by a file part whose path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Open { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// The name of the part being encoded when the error happened, if any.
    pub fn part(&self) -> Option<&str> {
        match self {
            Self::Open { part, .. } | Self::Read { part, .. } | Self::InvalidHeader { part, .. } => Some(part),
            _ => None,
        }
    }
}
