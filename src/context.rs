//! Typed per-request routing facts.
//!
//! A [`RouteContext`] is built once by a
//! [`ContextExtractor`](crate::extract::ContextExtractor) before dispatch and
//! is read-only afterwards. Required and optional facts are explicit in the
//! types: the segment list is always there (possibly empty), the auth facts
//! are present together or not at all.

/// Auth facts resolved from the request's credentials.
///
/// The three fields travel as one unit: a request either carries all of
/// them or none.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthContext {
    pub is_authorized: bool,
    pub session_id: String,
    pub access_token: String,
}

/// Routing facts for one request.
///
/// `RouteContext::default()` is what a request without extracted context
/// looks like: zero segments, unauthenticated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RouteContext {
    segments: Vec<String>,
    auth: Option<AuthContext>,
}

impl RouteContext {
    pub fn new(segments: Vec<String>, auth: Option<AuthContext>) -> Self {
        Self { segments, auth }
    }

    /// Splits a URI path into its non-empty segments.
    ///
    /// `/api/v1/login` → `["api", "v1", "login"]`.
    pub fn from_path(path: &str, auth: Option<AuthContext>) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Self { segments, auth }
    }

    pub fn segments(&self) -> &[String] { &self.segments }
    pub fn segment_count(&self) -> usize { self.segments.len() }
    pub fn auth(&self) -> Option<&AuthContext> { self.auth.as_ref() }

    /// Absent auth facts count as unauthorized.
    pub fn is_authorized(&self) -> bool {
        self.auth.as_ref().is_some_and(|a| a.is_authorized)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.session_id.as_str())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.access_token.as_str())
    }
}
