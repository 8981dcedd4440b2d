//! Buffered response sink handed to handlers through the context.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Response, StatusCode};
use tracing::warn;

/// Response under construction for one request
///
/// The status line can be written once; later attempts are ignored so that
/// several writers (a handler, then error handlers) can cooperate without
/// clobbering each other. Body writes always append.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the status if none has been written yet
    ///
    /// Returns `true` when this call set the status.
    pub fn write_status(&mut self, status: StatusCode) -> bool {
        if self.status.is_some() {
            return false;
        }
        self.status = Some(status);
        true
    }

    /// `true` once a status has been written explicitly
    #[inline]
    #[must_use]
    pub fn is_status_written(&self) -> bool {
        self.status.is_some()
    }

    /// Status that will be sent; `200 OK` when nothing was written
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Insert or replace a header; invalid names or values are dropped
    pub fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append raw bytes to the body
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Move the buffered response out, leaving this writer empty
    pub fn take(&mut self) -> Response<Vec<u8>> {
        let mut response = Response::new(std::mem::take(&mut self.body));
        *response.status_mut() = self.status();
        *response.headers_mut() = std::mem::take(&mut self.headers);
        self.status = None;
        response
    }

    pub(crate) fn reset(&mut self) {
        self.status = None;
        self.headers.clear();
        self.body.clear();
    }
}
