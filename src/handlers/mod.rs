//! Endpoint handlers.
//!
//! Handlers are thin: parse, call a store or the session cache, shape the
//! JSON. Every response they produce carries CORS headers.

pub mod account;
pub mod auth;
pub mod version;

use tracing::error;

use crate::app::Services;
use crate::error::Error;
use crate::middleware::auth::message_response;
use crate::models::User;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::token::now_ms;

/// Logs `e` and answers with a generic 500.
pub(crate) fn internal_error(svc: &Services, e: Error) -> Response {
    error!("request failed: {e}");
    message_response(&svc.cors, Status::InternalServerError, "Internal Server Error")
}

/// `200 OK` JSON with CORS headers.
pub(crate) fn json_ok<T: serde::Serialize>(svc: &Services, value: T) -> Response {
    svc.cors.apply(Json(value).into_response())
}

/// The user behind a request that already passed the authorization gate.
///
/// Uses the session-cache shortcut when the dispatcher set it, otherwise the
/// user id in the (already verified) access token.
pub(crate) async fn requesting_user(svc: &Services, req: &Request) -> Result<Option<User>, Error> {
    let user_id = match req.current_user() {
        Some(id) => id,
        None => match req.access_token().map(|t| svc.tokens.verify(t, now_ms())) {
            Some(Ok(claims)) => claims.user_id,
            _ => return Ok(None),
        },
    };
    svc.users.find_by_id(user_id).await
}
