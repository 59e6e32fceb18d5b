//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use carebox::cache::{MemorySessionCache, SessionCache};
use carebox::extract::{BearerExtractor, ContextExtractor};
use carebox::middleware::cors::Cors;
use carebox::middleware::session::{LookupOutcome, SessionObserver};
use carebox::models::{CachedUser, UserId};
use carebox::store::{MemoryHealthRecords, MemoryUserStore};
use carebox::{Error, Method, Request, Services, TokenService};
use http::header::AUTHORIZATION;

pub const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

pub fn tokens() -> TokenService {
    TokenService::new(SECRET, Duration::from_secs(900)).unwrap()
}

/// Memory-backed services with the cheapest bcrypt cost.
pub fn services_with(sessions: Arc<dyn SessionCache>) -> Arc<Services> {
    Arc::new(Services {
        users: Arc::new(MemoryUserStore::new()),
        records: Arc::new(MemoryHealthRecords::new()),
        sessions,
        tokens: tokens(),
        cors: Cors::default(),
        session_ttl: Duration::from_secs(600),
        bcrypt_cost: 4,
    })
}

pub fn services() -> Arc<Services> {
    services_with(Arc::new(MemorySessionCache::new()))
}

/// Builds a request the way the server does: through the bearer extractor.
pub fn request(method: Method, path: &str, bearer: Option<&str>, body: &str) -> Request {
    let mut builder = http::Request::builder().method(method.as_str()).uri(path);
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    let context = BearerExtractor::new(tokens()).extract(&parts);
    Request::new(method, path, parts.headers, Bytes::from(body.to_owned()), context)
}

pub fn body_text(res: &carebox::Response) -> String {
    String::from_utf8(res.body().to_vec()).unwrap()
}

pub fn body_json(res: &carebox::Response) -> serde_json::Value {
    serde_json::from_slice(res.body()).unwrap()
}

pub fn cached_user() -> CachedUser {
    CachedUser {
        user_id: UserId::new(),
        email: "ada@example.com".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
    }
}

/// Records every session lookup outcome.
#[derive(Default)]
pub struct RecordingObserver {
    pub outcomes: Mutex<Vec<LookupOutcome>>,
}

impl SessionObserver for RecordingObserver {
    fn on_lookup(&self, _session_id: &str, outcome: &LookupOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}

/// A cache that is always down.
pub struct BrokenCache;

#[async_trait]
impl SessionCache for BrokenCache {
    async fn get(&self, _session_id: &str) -> Result<Option<CachedUser>, Error> {
        Err(Error::Config("cache unreachable".into()))
    }

    async fn set(&self, _: &str, _: &CachedUser, _: Duration) -> Result<(), Error> {
        Err(Error::Config("cache unreachable".into()))
    }

    async fn delete(&self, _session_id: &str) -> Result<(), Error> {
        Err(Error::Config("cache unreachable".into()))
    }
}

/// Counts calls and remembers the last `current_user` it saw.
#[derive(Default)]
pub struct Spy {
    pub calls: AtomicUsize,
    pub last_user: Mutex<Option<Option<UserId>>>,
}

impl Spy {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn record(&self, req: &Request) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user.lock().unwrap() = Some(req.current_user());
    }
}
