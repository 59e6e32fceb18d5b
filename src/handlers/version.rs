use std::sync::Arc;

use serde::Serialize;

use crate::app::Services;
use crate::request::Request;
use crate::response::Response;

#[derive(Serialize)]
struct Version {
    version: &'static str,
}

/// `GET /<prefix>/<prefix>/version`
pub async fn version(svc: Arc<Services>, _req: Request) -> Response {
    super::json_ok(&svc, Version { version: env!("CARGO_PKG_VERSION") })
}
