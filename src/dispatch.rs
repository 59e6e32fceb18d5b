//! Request dispatch.
//!
//! For one request, in order:
//!
//! 1. session lookup: a cache hit sets [`Request::current_user`]
//! 2. route lookup on `(method, segment count, action)`: no match is a 404
//! 3. authorization gate for protected routes: failure is a CORS 401
//! 4. the handler
//!
//! Every outcome is terminal for the request. Nothing here holds mutable
//! state, so the same request dispatched twice takes the same path.

use std::sync::Arc;

use tracing::debug;

use crate::cache::SessionCache;
use crate::middleware::auth::authorize;
use crate::middleware::cors::Cors;
use crate::middleware::session::{LogObserver, SessionObserver, resolve_user};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Body of the 404 response.
pub const NOT_FOUND_BODY: &str = "404 page not found";

pub struct Dispatcher {
    router: Router,
    sessions: Arc<dyn SessionCache>,
    observer: Arc<dyn SessionObserver>,
    cors: Cors,
}

impl Dispatcher {
    pub fn new(router: Router, sessions: Arc<dyn SessionCache>, cors: Cors) -> Self {
        Self { router, sessions, observer: Arc::new(LogObserver), cors }
    }

    /// Replaces the default logging observer.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub async fn dispatch(&self, mut req: Request) -> Response {
        if let Some(session_id) = req.context().session_id() {
            let user = resolve_user(self.sessions.as_ref(), self.observer.as_ref(), session_id).await;
            if let Some(user) = user {
                req.set_current_user(user);
            }
        }

        let Some(route) = self.router.lookup(req.method(), req.context()) else {
            debug!(segments = req.context().segment_count(), "no route");
            return not_found();
        };

        if let Err(rejected) = authorize(route.access(), req.context(), &self.cors) {
            debug!(action = route.action(), "rejected by authorization gate");
            return rejected;
        }

        (route.handler)(req).await
    }
}

pub(crate) fn not_found() -> Response {
    Response::builder().status(Status::NotFound).text(NOT_FOUND_BODY)
}
