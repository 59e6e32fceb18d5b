//! # carebox
//!
//! Backend for personal health records: accounts, sessions, vitals and
//! medication records, served over HTTP.
//!
//! ## Request path
//!
//! ```text
//! hyper request
//!   → ContextExtractor      path segments + bearer-token auth facts (RouteContext)
//!   → session lookup        cache hit sets the current user id
//!   → route table           (method, segment count, action) or 404
//!   → authorization gate    protected routes need is_authorized, else CORS 401
//!   → handler
//! ```
//!
//! The routing facts travel in a typed [`RouteContext`] inside the
//! [`Request`]; nothing is looked up by string key at runtime.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use carebox::cache::MemorySessionCache;
//! use carebox::middleware::cors::Cors;
//! use carebox::store::{MemoryHealthRecords, MemoryUserStore};
//! use carebox::{Config, Server, Services, TokenService, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), carebox::Error> {
//!     let config = Config::from_env()?;
//!     let services = Arc::new(Services {
//!         users: Arc::new(MemoryUserStore::new()),
//!         records: Arc::new(MemoryHealthRecords::new()),
//!         sessions: Arc::new(MemorySessionCache::new()),
//!         tokens: TokenService::new(config.token_secret.clone(), config.access_token_ttl)?,
//!         cors: Cors::new(config.cors_allow_origin.clone()),
//!         session_ttl: config.session_ttl,
//!         bcrypt_cost: config.bcrypt_cost,
//!     });
//!
//!     Server::bind(config.addr).serve(app::build(services)?).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod app;
pub mod cache;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod store;
pub mod token;

pub use app::{App, Services};
pub use config::Config;
pub use context::{AuthContext, RouteContext};
pub use dispatch::Dispatcher;
pub use error::Error;
pub use handler::{Handler, ServiceHandler};
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::{API_SEGMENTS, Access, Route, Router};
pub use server::Server;
pub use status::Status;
pub use token::TokenService;
