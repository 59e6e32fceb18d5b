//! CORS response headers.
//!
//! Browser clients on another origin can only read a response, including an
//! error, if it carries these headers.

use crate::response::Response;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cors {
    allow_origin: String,
}

impl Cors {
    pub fn new(allow_origin: impl Into<String>) -> Self {
        Self { allow_origin: allow_origin.into() }
    }

    pub fn apply(&self, res: Response) -> Response {
        res.with_header("access-control-allow-origin", &self.allow_origin)
            .with_header("access-control-allow-methods", ALLOW_METHODS)
            .with_header("access-control-allow-headers", ALLOW_HEADERS)
    }
}

impl Default for Cors {
    fn default() -> Self {
        Self::new("*")
    }
}
