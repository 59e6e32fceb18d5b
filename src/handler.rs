//! Route handlers and how the table stores them.
//!
//! Two shapes are accepted:
//!
//! ```text
//! async fn hello(svc: Arc<Services>, req: Request) -> Response   ← via Services::bind
//! |req: Request| async { Response::text("ok") }                  ← plain closure
//! ```
//!
//! Both end up as one `Arc<dyn Fn(Request) -> BoxFuture>` in the [`Route`]
//! entry, so dispatch is a single indirect call whatever the handler type.
//!
//! [`Route`]: crate::Route

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::app::Services;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// `Send + 'static` so tokio can move it between worker threads.
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync + 'static>;

/// Anything the router can register.
pub trait Handler: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_route_handler(self) -> BoxedHandler;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_route_handler(self) -> BoxedHandler {
        let f = self;
        Arc::new(move |req: Request| -> BoxFuture {
            let fut = f(req);
            Box::pin(async move { fut.await.into_response() })
        })
    }
}

/// A handler that needs the shared [`Services`]. Built by
/// [`Services::bind`].
pub struct ServiceHandler<F> {
    svc: Arc<Services>,
    f: F,
}

impl<F, Fut> Handler for ServiceHandler<F>
where
    F: Fn(Arc<Services>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn into_route_handler(self) -> BoxedHandler {
        let Self { svc, f } = self;
        Arc::new(move |req: Request| -> BoxFuture { Box::pin(f(Arc::clone(&svc), req)) })
    }
}

impl Services {
    /// Pairs an `async fn(Arc<Services>, Request)` with these services.
    pub fn bind<F, Fut>(self: &Arc<Self>, f: F) -> ServiceHandler<F>
    where
        F: Fn(Arc<Services>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        ServiceHandler { svc: Arc::clone(self), f }
    }
}
