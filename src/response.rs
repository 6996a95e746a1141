//! Responses produced by controllers, middleware and the error dictionary.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::error_response;
use crate::status::Status;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use docket::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(Status::NoContent);
///
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` with an already-encoded JSON body.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    /// Overrides the status code with a raw value.
    pub fn with_status_code(mut self, code: u16) -> Self {
        self.status = code;
        self
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper-facing response. Invalid header names or values
    /// are dropped rather than failing the whole response.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = http::StatusCode::from_u16(self.status)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        let headers = res.headers_mut();
        for (name, value) in self.headers {
            let (Ok(name), Ok(value)) = (
                http::header::HeaderName::try_from(name.as_str()),
                http::header::HeaderValue::try_from(value.as_str()),
            ) else {
                continue;
            };
            headers.append(name, value);
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Builder for responses with a non-200 status or extra headers.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn json(self, body: Vec<u8>) -> Response {
        self.with_body(JSON, body)
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.with_body(TEXT, body.into().into_bytes())
    }

    fn with_body(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = Vec::with_capacity(self.headers.len() + 1);
        headers.push(("content-type".to_owned(), content_type.to_owned()));
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Anything a controller method may return on success.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

/// A serializable value sent as `application/json` with `200 OK`.
///
/// A value that fails to serialize becomes the system error.
#[derive(Clone, Debug)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Response::json(bytes),
            Err(e) => {
                error!("response serialization failed: {e}");
                error_response::system_error().to_response(&[])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sets_content_type_and_ok() {
        let res = Json(serde_json::json!({"id": 1})).into_response();
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        assert_eq!(res.body(), br#"{"id":1}"#);
    }

    #[test]
    fn unserializable_json_becomes_system_error() {
        let mut bad = std::collections::BTreeMap::new();
        bad.insert(vec![1u8], "non-string map key");

        let res = Json(bad).into_response();

        assert_eq!(res.status_code(), 500);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body(), br#"{"error":{"code":1020,"message":"A system error occurred"}}"#);
    }

    #[test]
    fn into_inner_keeps_status_and_headers() {
        let res = Response::builder()
            .status(Status::Created)
            .header("location", "/users/9")
            .text("made");
        let inner = res.into_inner();
        assert_eq!(inner.status(), http::StatusCode::CREATED);
        assert_eq!(inner.headers()["location"], "/users/9");
    }
}
