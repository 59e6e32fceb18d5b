//! Typed route table.
//!
//! A route is keyed by `(method, segment count, action)` where the action is
//! the last path segment: `/api/v1/login` has three segments and the action
//! `login`. Leading segments are free. Each key maps to one handler and one
//! [`Access`] requirement.
//!
//! One radix tree per method, as in any matchit router; every route is stored
//! under a generated pattern such as `/{s0}/{s1}/login`. Registering the same
//! key twice is rejected while the table is built, never resolved by order.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::context::RouteContext;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// Segment count of every route in the public API: `/<prefix>/<prefix>/<action>`.
pub const API_SEGMENTS: usize = 3;

/// Whether a route sits behind the authorization gate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    Public,
    Protected,
}

/// One entry of the table.
pub struct Route {
    method: Method,
    segment_count: usize,
    action: String,
    access: Access,
    pub(crate) handler: BoxedHandler,
}

impl Route {
    pub fn method(&self) -> Method { self.method }
    pub fn segment_count(&self) -> usize { self.segment_count }
    pub fn action(&self) -> &str { &self.action }
    pub fn access(&self) -> Access { self.access }

    fn same_key(&self, method: Method, segment_count: usize, action: &str) -> bool {
        self.method == method && self.segment_count == segment_count && self.action == action
    }
}

/// The application route table. Build once at startup, then share.
///
/// ```rust,no_run
/// # use carebox::{Error, Method, Request, Response, Router};
/// # async fn version(_: Request) -> Response { Response::text("") }
/// # async fn hello(_: Request) -> Response { Response::text("") }
/// # fn main() -> Result<(), Error> {
/// let router = Router::new()
///     .public(Method::Get, "version", version)?
///     .protected(Method::Get, "hello", hello)?;
/// # Ok(()) }
/// ```
#[derive(Default)]
pub struct Router {
    trees: HashMap<Method, MatchitRouter<Arc<Route>>>,
    table: Vec<Arc<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a three-segment route anyone may call.
    pub fn public(self, method: Method, action: &str, handler: impl Handler) -> Result<Self, Error> {
        self.route(method, API_SEGMENTS, action, Access::Public, handler)
    }

    /// Registers a three-segment route behind the authorization gate.
    pub fn protected(self, method: Method, action: &str, handler: impl Handler) -> Result<Self, Error> {
        self.route(method, API_SEGMENTS, action, Access::Protected, handler)
    }

    /// Registers a route with an explicit segment count.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateRoute`] if `(method, segment_count, action)` is
    /// already taken; [`Error::InvalidRoute`] for a zero segment count or an
    /// action that is not a single plain path segment.
    pub fn route(
        mut self,
        method: Method,
        segment_count: usize,
        action: &str,
        access: Access,
        handler: impl Handler,
    ) -> Result<Self, Error> {
        if self.table.iter().any(|r| r.same_key(method, segment_count, action)) {
            return Err(Error::DuplicateRoute {
                method,
                segment_count,
                action: action.to_owned(),
            });
        }

        let pattern = pattern(segment_count, action)?;
        let route = Arc::new(Route {
            method,
            segment_count,
            action: action.to_owned(),
            access,
            handler: handler.into_route_handler(),
        });

        self.trees
            .entry(method)
            .or_default()
            .insert(pattern.as_str(), Arc::clone(&route))
            .map_err(|e| Error::InvalidRoute { pattern, reason: e.to_string() })?;
        self.table.push(route);
        Ok(self)
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.table.iter().map(|r| r.as_ref())
    }

    /// Finds the route for `method` and the context's segments.
    ///
    /// Segments that could not have come out of a path split (empty, or
    /// containing `/`) never match.
    pub(crate) fn lookup(&self, method: Method, ctx: &RouteContext) -> Option<Arc<Route>> {
        let tree = self.trees.get(&method)?;
        let segments = ctx.segments();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty() || s.contains('/')) {
            return None;
        }
        let path = format!("/{}", segments.join("/"));
        let matched = tree.at(&path).ok()?;
        Some(Arc::clone(matched.value))
    }
}

fn pattern(segment_count: usize, action: &str) -> Result<String, Error> {
    let invalid = |reason: &str| Error::InvalidRoute {
        pattern: format!("{segment_count}:{action}"),
        reason: reason.to_owned(),
    };
    if segment_count == 0 {
        return Err(invalid("segment count must be at least 1"));
    }
    if action.is_empty() || action.contains(['/', '{', '}', '*']) {
        return Err(invalid("action must be a single plain path segment"));
    }

    let mut pattern = String::new();
    for i in 0..segment_count - 1 {
        pattern.push_str(&format!("/{{s{i}}}"));
    }
    pattern.push('/');
    pattern.push_str(action);
    Ok(pattern)
}
