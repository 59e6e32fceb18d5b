//! Session cache.
//!
//! Maps a session id to the [`CachedUser`] written at login.
//!
//! | Key | Value | TTL |
//! |-----|-------|-----|
//! | `session:{session_id}` | `CachedUser` (JSON) | `SESSION_TTL_SECS` |
//!
//! Two backends: [`RedisSessionCache`] for deployments and
//! [`MemorySessionCache`] for local runs and tests.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::error::Error;
use crate::models::CachedUser;

#[async_trait]
pub trait SessionCache: Send + Sync {
    /// `Ok(None)` when the session is unknown or expired.
    async fn get(&self, session_id: &str) -> Result<Option<CachedUser>, Error>;

    /// Stores (or replaces) the user for `session_id`, expiring after `ttl`.
    async fn set(&self, session_id: &str, user: &CachedUser, ttl: Duration) -> Result<(), Error>;

    /// Deleting an unknown session succeeds.
    async fn delete(&self, session_id: &str) -> Result<(), Error>;
}

fn session_key(session_id: &str) -> String {
    format!("session:{session_id}")
}

// ── Redis ─────────────────────────────────────────────────────────────────────

pub struct RedisSessionCache {
    conn: ConnectionManager,
}

impl RedisSessionCache {
    /// `redis_url` e.g. `redis://localhost:6379`.
    pub async fn connect(redis_url: &str) -> Result<Self, Error> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, session_id: &str) -> Result<Option<CachedUser>, Error> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(session_key(session_id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, session_id: &str, user: &CachedUser, ttl: Duration) -> Result<(), Error> {
        let json = serde_json::to_string(user)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(session_key(session_id), json, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(session_key(session_id)).await?;
        Ok(())
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

/// Process-local cache.
///
/// Expired entries are dropped when read and swept on every write, so
/// sessions that are never read again do not accumulate.
#[derive(Default)]
pub struct MemorySessionCache {
    entries: DashMap<String, (CachedUser, Instant)>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn get(&self, session_id: &str) -> Result<Option<CachedUser>, Error> {
        let key = session_key(session_id);
        let now = Instant::now();
        if let Some(entry) = self.entries.get(&key) {
            let (user, expires_at) = entry.value();
            if now < *expires_at {
                return Ok(Some(user.clone()));
            }
        }
        self.entries.remove_if(&key, |_, (_, expires_at)| now >= *expires_at);
        Ok(None)
    }

    async fn set(&self, session_id: &str, user: &CachedUser, ttl: Duration) -> Result<(), Error> {
        let now = Instant::now();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
        self.entries.insert(session_key(session_id), (user.clone(), now + ttl));
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), Error> {
        self.entries.remove(&session_key(session_id));
        Ok(())
    }
}
