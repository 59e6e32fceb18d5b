//! Wiring: shared services, the route table, and the assembled application.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::SessionCache;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::extract::{BearerExtractor, ContextExtractor};
use crate::handlers;
use crate::method::Method;
use crate::middleware::cors::Cors;
use crate::router::Router;
use crate::store::{HealthRecordStore, UserStore};
use crate::token::TokenService;

/// Everything the handlers need, shared across requests.
pub struct Services {
    pub users: Arc<dyn UserStore>,
    pub records: Arc<dyn HealthRecordStore>,
    pub sessions: Arc<dyn SessionCache>,
    pub tokens: TokenService,
    pub cors: Cors,
    pub session_ttl: Duration,
    pub bcrypt_cost: u32,
}

/// A dispatcher plus the extractor that feeds it. Handed to
/// [`Server::serve`](crate::Server::serve).
pub struct App {
    pub(crate) extractor: Box<dyn ContextExtractor>,
    pub(crate) dispatcher: Dispatcher,
}

impl App {
    pub fn new(extractor: impl ContextExtractor, dispatcher: Dispatcher) -> Self {
        Self { extractor: Box::new(extractor), dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// The service's route table.
///
/// | Action | Method | Access |
/// |---|---|---|
/// | `version` | GET | public |
/// | `refresh-token` | GET | public |
/// | `login` | POST | public |
/// | `register` | POST | public |
/// | `hello` | GET | protected |
/// | `dashboard` | GET | protected |
/// | `user` | GET | protected |
pub fn routes(svc: &Arc<Services>) -> Result<Router, Error> {
    Router::new()
        .public(Method::Get, "version", svc.bind(handlers::version::version))?
        .public(Method::Get, "refresh-token", svc.bind(handlers::auth::refresh_token))?
        .public(Method::Post, "login", svc.bind(handlers::auth::login))?
        .public(Method::Post, "register", svc.bind(handlers::auth::register))?
        .protected(Method::Get, "hello", svc.bind(handlers::account::hello))?
        .protected(Method::Get, "dashboard", svc.bind(handlers::account::dashboard))?
        .protected(Method::Get, "user", svc.bind(handlers::account::user_profile))
}

/// Builds the full application around `svc`.
pub fn build(svc: Arc<Services>) -> Result<App, Error> {
    let router = routes(&svc)?;
    let dispatcher = Dispatcher::new(router, Arc::clone(&svc.sessions), svc.cors.clone());
    Ok(App::new(BearerExtractor::new(svc.tokens.clone()), dispatcher))
}
