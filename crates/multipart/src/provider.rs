//! Glue between body producers and `http` request builders.

use crate::body::MultipartBody;
use crate::multipart::Multipart;
use crate::protocol::MultipartError;
use http::header::CONTENT_TYPE;
use http::request::Builder;
use http::Request;
use tracing::error;

/// Something that can produce a request body together with its content type.
///
/// This is the only surface an HTTP client needs: the `Content-Type` value
/// to send, and the body itself. `body` may be called once per request.
pub trait BodyProvider {
    type Body;

    /// The `Content-Type` header value. Has no side effects.
    fn content_type(&self) -> String;

    /// Produces the body, or fails without producing anything.
    fn body(&self) -> Result<Self::Body, MultipartError>;
}

impl BodyProvider for Multipart {
    type Body = MultipartBody;

    fn content_type(&self) -> String {
        Multipart::content_type(self)
    }

    fn body(&self) -> Result<Self::Body, MultipartError> {
        Multipart::body(self)
    }
}

/// Attaches a [`BodyProvider`] to an [`http::request::Builder`].
///
/// ```
/// use http::Request;
/// use micro_multipart::{Multipart, Part, RequestBuilderExt};
///
/// let multipart = Multipart::new().part(Part::text("param", "value"));
/// let request = Request::post("http://localhost/upload").provide_body(&multipart).unwrap();
///
/// assert_eq!(request.headers()["content-type"], multipart.content_type());
/// ```
pub trait RequestBuilderExt {
    /// Sets the `Content-Type` header and builds the request with the body.
    ///
    /// Fails if the provider fails to produce a body or if the builder holds
    /// an invalid request.
    fn provide_body<P: BodyProvider + ?Sized>(self, provider: &P) -> Result<Request<P::Body>, MultipartError>;
}

impl RequestBuilderExt for Builder {
    fn provide_body<P: BodyProvider + ?Sized>(self, provider: &P) -> Result<Request<P::Body>, MultipartError> {
        let body = provider.body().inspect_err(|e| error!(cause = %e, "failed to provide request body"))?;
        Ok(self.header(CONTENT_TYPE, provider.content_type()).body(body)?)
    }
}
