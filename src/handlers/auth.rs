//! Registration, login and token refresh.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::Services;
use crate::error::Error;
use crate::middleware::auth::{NOT_AUTHORIZED, message_response};
use crate::models::{CachedUser, NewUser};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::token::now_ms;

use super::{internal_error, json_ok};

const BAD_CREDENTIALS: &str = "Incorrect email or password";

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    session_uuid: String,
    expires_at_ms: u64,
}

/// `POST /<prefix>/<prefix>/register`
pub async fn register(svc: Arc<Services>, req: Request) -> Response {
    let Ok(input) = req.json::<RegisterRequest>() else {
        return message_response(&svc.cors, Status::BadRequest, "Invalid request body");
    };
    let fields = [&input.first_name, &input.last_name, &input.email, &input.password];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return message_response(&svc.cors, Status::BadRequest, "All fields are required");
    }

    let cost = svc.bcrypt_cost;
    let password = input.password;
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await;
    let password_hash = match hashed {
        Ok(Ok(hash)) => hash,
        Ok(Err(e)) => return internal_error(&svc, e.into()),
        Err(e) => return internal_error(&svc, e.into()),
    };

    let new = NewUser {
        first_name: input.first_name.trim().to_owned(),
        last_name: input.last_name.trim().to_owned(),
        email: input.email.trim().to_owned(),
        password_hash,
    };
    match svc.users.insert(new).await {
        Ok(user) => {
            info!(user_id = %user.id, "user registered");
            svc.cors.apply(
                (Status::Created, Json(serde_json::json!({ "user_id": user.id }))).into_response(),
            )
        }
        Err(Error::Conflict(_)) => {
            message_response(&svc.cors, Status::BadRequest, "Email is not unique")
        }
        Err(e) => internal_error(&svc, e),
    }
}

/// `POST /<prefix>/<prefix>/login`
///
/// Opens a session: the user is cached under a fresh session id and an
/// access token naming that session is returned.
pub async fn login(svc: Arc<Services>, req: Request) -> Response {
    let Ok(input) = req.json::<LoginRequest>() else {
        return message_response(&svc.cors, Status::BadRequest, "Invalid request body");
    };

    let user = match svc.users.find_by_email(&input.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return message_response(&svc.cors, Status::Unauthorized, BAD_CREDENTIALS),
        Err(e) => return internal_error(&svc, e),
    };

    let hash = user.password_hash.clone();
    let password = input.password;
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await;
    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            return message_response(&svc.cors, Status::Unauthorized, BAD_CREDENTIALS);
        }
        Ok(Err(e)) => return internal_error(&svc, e.into()),
        Err(e) => return internal_error(&svc, e.into()),
    }

    let session_id = Uuid::new_v4().to_string();
    if let Err(e) = svc.sessions.set(&session_id, &CachedUser::from(&user), svc.session_ttl).await {
        return internal_error(&svc, e);
    }

    match svc.tokens.issue(user.id, &session_id, now_ms()) {
        Ok((access_token, claims)) => {
            info!(user_id = %user.id, "session opened");
            json_ok(&svc, TokenResponse {
                access_token,
                session_uuid: session_id,
                expires_at_ms: claims.expires_at_ms,
            })
        }
        Err(e) => internal_error(&svc, e.into()),
    }
}

/// `GET /<prefix>/<prefix>/refresh-token`
///
/// Accepts an expired token as long as its signature holds and its session
/// is still cached. The session's TTL is re-armed.
pub async fn refresh_token(svc: Arc<Services>, req: Request) -> Response {
    let unauthorized = || message_response(&svc.cors, Status::Unauthorized, NOT_AUTHORIZED);

    let Some(token) = req.access_token() else {
        return unauthorized();
    };
    let Ok(claims) = svc.tokens.decode(token) else {
        return unauthorized();
    };

    let cached = match svc.sessions.get(&claims.session_id).await {
        Ok(Some(cached)) => cached,
        Ok(None) => return unauthorized(),
        Err(e) => return internal_error(&svc, e),
    };
    if cached.user_id != claims.user_id {
        warn!(session_id = %claims.session_id, "token user does not own session, closing it");
        if let Err(e) = svc.sessions.delete(&claims.session_id).await {
            return internal_error(&svc, e);
        }
        return unauthorized();
    }

    if let Err(e) = svc.sessions.set(&claims.session_id, &cached, svc.session_ttl).await {
        return internal_error(&svc, e);
    }
    match svc.tokens.issue(claims.user_id, &claims.session_id, now_ms()) {
        Ok((access_token, fresh)) => json_ok(&svc, TokenResponse {
            access_token,
            session_uuid: claims.session_id,
            expires_at_ms: fresh.expires_at_ms,
        }),
        Err(e) => internal_error(&svc, e.into()),
    }
}
