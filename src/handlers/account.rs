//! Handlers behind the authorization gate.

use std::sync::Arc;

use crate::app::Services;
use crate::middleware::auth::message_response;
use crate::models::{Dashboard, Profile, User};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

use super::{internal_error, json_ok, requesting_user};

/// Resolves the user or produces the response to send instead.
async fn user_or_response(svc: &Services, req: &Request) -> Result<User, Response> {
    match requesting_user(svc, req).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(message_response(&svc.cors, Status::NotFound, "User not found")),
        Err(e) => Err(internal_error(svc, e)),
    }
}

/// `GET /<prefix>/<prefix>/hello`
pub async fn hello(svc: Arc<Services>, req: Request) -> Response {
    match user_or_response(&svc, &req).await {
        Ok(user) => svc.cors.apply(Response::text(format!("Hello {}!", user.first_name))),
        Err(res) => res,
    }
}

/// `GET /<prefix>/<prefix>/user`
pub async fn user_profile(svc: Arc<Services>, req: Request) -> Response {
    match user_or_response(&svc, &req).await {
        Ok(user) => json_ok(&svc, Profile::from(&user)),
        Err(res) => res,
    }
}

/// `GET /<prefix>/<prefix>/dashboard`
pub async fn dashboard(svc: Arc<Services>, req: Request) -> Response {
    let user = match user_or_response(&svc, &req).await {
        Ok(user) => user,
        Err(res) => return res,
    };

    let readings = match svc.records.readings(user.id).await {
        Ok(readings) => readings,
        Err(e) => return internal_error(&svc, e),
    };
    let records = match svc.records.medical_records(user.id).await {
        Ok(records) => records,
        Err(e) => return internal_error(&svc, e),
    };
    json_ok(&svc, Dashboard::summarize(&readings, records))
}
