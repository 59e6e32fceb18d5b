//! Current-user lookup through the session cache.
//!
//! A hit gives handlers a "current user id" shortcut. A miss or a cache
//! failure only removes the shortcut: authorization never depends on it and
//! the client never sees it. Operators see every outcome through a
//! [`SessionObserver`].

use tracing::{debug, warn};

use crate::cache::SessionCache;
use crate::models::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
    /// The cache errored or returned an unreadable value.
    Failed(String),
}

/// Observability hook for session lookups.
pub trait SessionObserver: Send + Sync {
    fn on_lookup(&self, session_id: &str, outcome: &LookupOutcome);
}

/// Default observer: logs through `tracing`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_lookup(&self, session_id: &str, outcome: &LookupOutcome) {
        match outcome {
            LookupOutcome::Hit => debug!(session_id, "session cache hit"),
            LookupOutcome::Miss => debug!(session_id, "session cache miss"),
            LookupOutcome::Failed(reason) => {
                warn!(session_id, reason = %reason, "session cache lookup failed")
            }
        }
    }
}

/// Returns the cached user id for `session_id`, or `None` on any miss.
pub async fn resolve_user(
    cache: &dyn SessionCache,
    observer: &dyn SessionObserver,
    session_id: &str,
) -> Option<UserId> {
    let (user, outcome) = match cache.get(session_id).await {
        Ok(Some(user)) => (Some(user.user_id), LookupOutcome::Hit),
        Ok(None) => (None, LookupOutcome::Miss),
        Err(e) => (None, LookupOutcome::Failed(e.to_string())),
    };
    observer.on_lookup(session_id, &outcome);
    user
}
