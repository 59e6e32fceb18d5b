//! Building a [`RouteContext`] from the request head.

use http::header::AUTHORIZATION;
use http::request::Parts;
use tracing::debug;

use crate::context::{AuthContext, RouteContext};
use crate::token::{TokenError, TokenService, now_ms};

/// Produces the routing facts the dispatcher consumes.
pub trait ContextExtractor: Send + Sync + 'static {
    fn extract(&self, parts: &Parts) -> RouteContext;
}

/// Splits the path and resolves `Authorization: Bearer <token>`.
///
/// | Token | `is_authorized` | session / token |
/// |---|---|---|
/// | valid, not expired | `true` | from claims |
/// | valid signature, expired | `false` | from claims |
/// | missing, malformed, forged | no auth facts | none |
pub struct BearerExtractor {
    tokens: TokenService,
}

impl BearerExtractor {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    fn auth(&self, parts: &Parts) -> Option<AuthContext> {
        let token = parts
            .headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .trim();

        let (claims, is_authorized) = match self.tokens.verify(token, now_ms()) {
            Ok(claims) => (claims, true),
            Err(TokenError::Expired) => (self.tokens.decode(token).ok()?, false),
            Err(e) => {
                debug!("ignoring bearer token: {e}");
                return None;
            }
        };

        Some(AuthContext {
            is_authorized,
            session_id: claims.session_id,
            access_token: token.to_owned(),
        })
    }
}

impl ContextExtractor for BearerExtractor {
    fn extract(&self, parts: &Parts) -> RouteContext {
        RouteContext::from_path(parts.uri.path(), self.auth(parts))
    }
}
