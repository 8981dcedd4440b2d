//! Request context and the dispatch chain it drives.

use http::{Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::response::ResponseWriter;
use crate::error::ChainError;
use crate::handler::HandlerFn;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::Params;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// State for one in-flight request
///
/// A context is owned by the thread handling its request and is only ever
/// lent to handlers as `&mut Context`, so nothing can hold on to it after
/// the request completes.
///
/// ## Chain execution
///
/// `index` is a single cursor shared by every [`Context::next`] call on the
/// stack. A handler that calls `next()` runs the rest of the chain from
/// inside that call; when it returns, the cursor is already past the end and
/// each enclosing `next()` loop exits, so code after `next()` runs in
/// reverse registration order.
pub struct Context {
    request: Request<Vec<u8>>,
    response: ResponseWriter,
    params: Params,
    handlers: Vec<HandlerFn>,
    index: isize,
    aborted: bool,
    err: Option<ChainError>,
    store: HashMap<String, Box<dyn Any + Send + Sync>>,
    request_id: RequestId,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            request: Request::default(),
            response: ResponseWriter::new(),
            params: Params::new(),
            handlers: Vec::new(),
            index: -1,
            aborted: false,
            err: None,
            store: HashMap::new(),
            request_id: RequestId::new(),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("path", &self.request.uri().path())
            .field("params", &self.params)
            .field("handlers", &self.handlers.len())
            .field("index", &self.index)
            .field("aborted", &self.aborted)
            .field("err", &self.err)
            .field("store_keys", &self.store.keys().collect::<Vec<_>>())
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl Context {
    /// Create a context for `request` with an empty chain
    #[must_use]
    pub fn new(request: Request<Vec<u8>>) -> Self {
        let mut ctx = Self::default();
        ctx.begin(request);
        ctx
    }

    pub(crate) fn begin(&mut self, request: Request<Vec<u8>>) {
        let header = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        self.request_id = RequestId::from_header_or_new(header);
        self.request = request;
        self.index = -1;
    }

    /// Clear every per-request field so the context can be reused
    pub(crate) fn reset(&mut self) {
        self.request = Request::default();
        self.response.reset();
        self.params.clear();
        self.handlers.clear();
        self.index = -1;
        self.aborted = false;
        self.err = None;
        self.store.clear();
    }

    /// Install the resolved chain and parameters for this request
    pub fn set_chain(&mut self, handlers: Vec<HandlerFn>, params: Params) {
        self.handlers = handlers;
        self.params = params;
        self.index = -1;
    }

    /// Run the remainder of the chain
    ///
    /// A handler that returns without calling `next()` hands control back to
    /// the innermost active loop, which moves on to the following handler.
    /// Use [`Context::abort`] to stop the chain.
    pub fn next(&mut self) {
        self.index += 1;
        while let Some(handler) = self.current() {
            if self.aborted {
                return;
            }
            handler.call(self);
            self.index += 1;
        }
    }

    /// Record `err` (replacing any earlier error) and continue the chain
    ///
    /// Recording an error does not stop the chain; call [`Context::abort`]
    /// as well for that.
    pub fn next_with_error(&mut self, err: impl Into<ChainError>) {
        self.err = Some(err.into());
        self.next();
    }

    fn current(&self) -> Option<HandlerFn> {
        usize::try_from(self.index)
            .ok()
            .and_then(|i| self.handlers.get(i))
            .map(Arc::clone)
    }

    /// Stop any further handler from being invoked
    ///
    /// The calling handler keeps running and anything it already wrote stays.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Last error recorded through [`Context::next_with_error`]
    #[must_use]
    pub fn error(&self) -> Option<&ChainError> {
        self.err.as_ref()
    }

    // ---- request ----

    #[must_use]
    pub fn request(&self) -> &Request<Vec<u8>> {
        &self.request
    }

    #[must_use]
    pub fn method(&self) -> &str {
        self.request.method().as_str()
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Path parameter bound by the route pattern
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First value of a query-string parameter, percent-decoded
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        let query = self.request.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Request header as a string, if present and valid UTF-8
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name)?.to_str().ok()
    }

    /// Deserialize the request body as JSON
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.request.body())
    }

    // ---- store ----

    /// Store a request-scoped value under `key`
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.store.insert(key.into(), Box::new(value));
    }

    /// Value under `key` if present and of type `T`
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.store.get(key)?.downcast_ref::<T>()
    }

    /// String value under `key`, accepting `String` or `&'static str`
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        let value = self.store.get(key)?;
        value
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| value.downcast_ref::<&'static str>().copied())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    // ---- response ----

    /// Write the status line; ignored if a status was already written
    pub fn status(&mut self, code: u16) {
        let status = to_status(code);
        self.response.write_status(status);
    }

    #[must_use]
    pub fn is_status_written(&self) -> bool {
        self.response.is_status_written()
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    /// Write a plain-text body
    ///
    /// Content type and status are only applied when no status has been
    /// written; the body is appended either way.
    pub fn string(&mut self, code: u16, body: impl AsRef<str>) {
        if !self.response.is_status_written() {
            self.response.set_header("content-type", TEXT_PLAIN);
            self.response.write_status(to_status(code));
        }
        self.response.write(body.as_ref().as_bytes());
    }

    /// Serialize `value` as a JSON body, same status rules as [`Context::string`]
    pub fn json<T: Serialize + ?Sized>(&mut self, code: u16, value: &T) -> Result<(), serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        if !self.response.is_status_written() {
            self.response.set_header("content-type", APPLICATION_JSON);
            self.response.write_status(to_status(code));
        }
        self.response.write(&bytes);
        Ok(())
    }

    /// Raw response sink
    #[must_use]
    pub fn response(&self) -> &ResponseWriter {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseWriter {
        &mut self.response
    }

    pub(crate) fn take_error(&self) -> Option<ChainError> {
        self.err.clone()
    }
}

fn to_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or_else(|_| {
        warn!(code, "Invalid status code, sending 500");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
