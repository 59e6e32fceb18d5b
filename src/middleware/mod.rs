//! Cross-cutting request concerns that run around the handlers.
//!
//! - [`auth`]: the authorization gate in front of protected routes
//! - [`cors`]: CORS headers on handler and error responses
//! - [`session`]: resolving the current user from the session cache

pub mod auth;
pub mod cors;
pub mod session;
