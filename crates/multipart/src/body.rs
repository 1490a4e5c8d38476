use bytes::{Buf, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::convert::Infallible;
use std::io;
use std::io::Read;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A fully built multipart body.
///
/// The body is readable through [`io::Read`] starting from the first byte,
/// and can be sent directly as an [`http_body::Body`] made of one data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    content_type: String,
    data: Bytes,
}

impl MultipartBody {
    pub(crate) fn new(content_type: String, data: Bytes) -> Self {
        Self { content_type, data }
    }

    /// The `Content-Type` header value matching this body.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Number of bytes not read yet.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The unread bytes, without consuming them.
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl Read for MultipartBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.data.len());
        self.data.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }
}

impl From<MultipartBody> for Bytes {
    fn from(body: MultipartBody) -> Self {
        body.data
    }
}

impl HttpBody for MultipartBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let data = &mut self.get_mut().data;
        if data.is_empty() {
            Poll::Ready(None)
        } else {
            Poll::Ready(Some(Ok(Frame::data(std::mem::take(data)))))
        }
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn body() -> MultipartBody {
        MultipartBody::new("multipart/form-data; boundary=B".into(), Bytes::from_static(b"--B--\r\n"))
    }

    fn check_send<T: Send + Sync>() {}

    #[test]
    fn is_send() {
        check_send::<MultipartBody>();
    }

    #[test]
    fn read_from_start() {
        let mut body = body();
        assert_eq!(body.content_type(), "multipart/form-data; boundary=B");
        assert_eq!(body.len(), 7);

        let mut first = [0u8; 3];
        assert_eq!(body.read(&mut first).unwrap(), 3);
        assert_eq!(&first, b"--B");
        assert_eq!(body.len(), 4);

        let mut rest = Vec::new();
        body.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"--\r\n");
        assert!(body.is_empty());
        assert_eq!(body.read(&mut first).unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn single_frame() {
        let mut body = body();

        assert_eq!(body.size_hint().exact(), Some(7));
        assert!(!body.is_end_stream());

        let bytes = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_eq!(bytes, Bytes::from_static(b"--B--\r\n"));

        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
        assert!(body.frame().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn collect() {
        let collected = body().collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from(body()));
    }
}
