//! Authorization gate for protected routes.
//!
//! The gate trusts the `is_authorized` fact the extractor produced; it does
//! not look at the token itself. It runs once, before the handler, so a
//! rejected request never reaches any handler side effect.

use serde::Serialize;

use crate::context::RouteContext;
use crate::middleware::cors::Cors;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Access;
use crate::status::Status;

/// Body text of every 401 produced by the gate.
pub const NOT_AUTHORIZED: &str = "You are not Authorized!";

/// JSON message body shared by the gate and the handlers.
#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
    pub status: u16,
    pub message: &'a str,
}

/// A JSON `{status, message}` response with CORS headers.
pub fn message_response(cors: &Cors, status: Status, message: &str) -> Response {
    let body = MessageBody { status: status.into(), message };
    cors.apply((status, Json(body)).into_response())
}

/// `Ok(())` lets the request through; `Err` carries the 401 to send instead.
pub fn authorize(access: Access, ctx: &RouteContext, cors: &Cors) -> Result<(), Response> {
    match access {
        Access::Public => Ok(()),
        Access::Protected if ctx.is_authorized() => Ok(()),
        Access::Protected => Err(message_response(cors, Status::Unauthorized, NOT_AUTHORIZED)),
    }
}
