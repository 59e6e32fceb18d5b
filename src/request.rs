//! Incoming HTTP request type.

use bytes::Bytes;
use http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::context::RouteContext;
use crate::method::Method;
use crate::models::UserId;

/// An incoming request together with its routing facts.
///
/// `current_user` is filled in by the dispatcher when the session cache
/// knows the request's session; handlers must not assume it is present.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    context: RouteContext,
    current_user: Option<UserId>,
}

impl Request {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        body: Bytes,
        context: RouteContext,
    ) -> Self {
        Self { method, path: path.into(), headers, body, context, current_user: None }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn context(&self) -> &RouteContext { &self.context }
    pub fn current_user(&self) -> Option<UserId> { self.current_user }

    /// Header lookup; names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The bearer token the extractor saw, if any. Needed by token refresh.
    pub fn access_token(&self) -> Option<&str> {
        self.context.access_token()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub(crate) fn set_current_user(&mut self, user: UserId) {
        self.current_user = Some(user);
    }
}
