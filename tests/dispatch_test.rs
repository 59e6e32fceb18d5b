//! Dispatcher behaviour against a table of spy handlers.

mod common;

use std::collections::{HashMap, HashSet};
use std::future::{Ready, ready};
use std::sync::Arc;

use carebox::cache::{MemorySessionCache, SessionCache};
use carebox::dispatch::NOT_FOUND_BODY;
use carebox::middleware::auth::NOT_AUTHORIZED;
use carebox::middleware::cors::Cors;
use carebox::middleware::session::LookupOutcome;
use carebox::models::UserId;
use carebox::token::now_ms;
use carebox::{Access, Dispatcher, Error, Method, Request, Response, Router};
use common::{BrokenCache, RecordingObserver, Spy, body_text, cached_user, request, tokens};
use pretty_assertions::assert_eq;
use rstest::rstest;

const TABLE: &[(Method, &str, Access)] = &[
    (Method::Get, "version", Access::Public),
    (Method::Get, "refresh-token", Access::Public),
    (Method::Post, "login", Access::Public),
    (Method::Post, "register", Access::Public),
    (Method::Get, "hello", Access::Protected),
    (Method::Get, "dashboard", Access::Protected),
    (Method::Get, "user", Access::Protected),
];

fn spy_handler(spy: &Arc<Spy>) -> impl Fn(Request) -> Ready<Response> + Send + Sync + 'static + use<> {
    let spy = Arc::clone(spy);
    move |req: Request| {
        spy.record(&req);
        ready(Response::text("handled"))
    }
}

struct Harness {
    dispatcher: Dispatcher,
    spies: HashMap<&'static str, Arc<Spy>>,
    observer: Arc<RecordingObserver>,
}

impl Harness {
    fn new(cache: Arc<dyn SessionCache>) -> Self {
        let mut router = Router::new();
        let mut spies = HashMap::new();
        for &(method, action, access) in TABLE {
            let spy = Arc::new(Spy::default());
            router = router
                .route(method, carebox::API_SEGMENTS, action, access, spy_handler(&spy))
                .unwrap();
            spies.insert(action, spy);
        }
        let observer = Arc::new(RecordingObserver::default());
        let dispatcher = Dispatcher::new(router, cache, Cors::default())
            .with_observer(observer.clone());
        Self { dispatcher, spies, observer }
    }

    fn spy(&self, action: &str) -> &Spy {
        &self.spies[action]
    }

    fn total_calls(&self) -> usize {
        self.spies.values().map(|s| s.calls()).sum()
    }

    fn outcomes(&self) -> Vec<LookupOutcome> {
        self.observer.outcomes.lock().unwrap().clone()
    }
}

fn harness() -> Harness {
    Harness::new(Arc::new(MemorySessionCache::new()))
}

fn valid_token(session_id: &str) -> String {
    tokens().issue(UserId::new(), session_id, now_ms()).unwrap().0
}

fn expired_token(session_id: &str) -> String {
    tokens().issue(UserId::new(), session_id, 1_000).unwrap().0
}

#[rstest]
#[case(Method::Get, "/")]
#[case(Method::Get, "/version")]
#[case(Method::Get, "/api/hello")]
#[case(Method::Get, "/api/v1/hello/extra")]
#[case(Method::Post, "/login")]
#[case(Method::Post, "/a/b/c/login")]
#[tokio::test]
async fn wrong_segment_count_is_not_found(
    #[case] method: Method,
    #[case] path: &str,
    #[values(false, true)] authorized: bool,
) {
    let h = harness();
    let token = authorized.then(|| valid_token("sess-1"));

    let res = h.dispatcher.dispatch(request(method, path, token.as_deref(), "")).await;

    assert_eq!(res.status_code(), 404);
    assert_eq!(body_text(&res), NOT_FOUND_BODY);
    assert_eq!(h.total_calls(), 0);
}

#[tokio::test]
async fn request_without_context_is_not_found() {
    let h = harness();
    let req = Request::new(
        Method::Get,
        "/api/v1/version",
        http::HeaderMap::new(),
        bytes::Bytes::new(),
        carebox::RouteContext::default(),
    );

    let res = h.dispatcher.dispatch(req).await;

    assert_eq!(res.status_code(), 404);
    assert_eq!(h.spy("version").calls(), 0);
}

#[rstest]
#[case(Method::Put, "/api/v1/login")]
#[case(Method::Get, "/api/v1/login")]
#[case(Method::Post, "/api/v1/hello")]
#[case(Method::Get, "/api/v1/unknown")]
#[tokio::test]
async fn unmatched_method_or_action_is_not_found(#[case] method: Method, #[case] path: &str) {
    let h = harness();

    let res = h.dispatcher.dispatch(request(method, path, None, "")).await;

    assert_eq!(res.status_code(), 404);
    assert_eq!(h.total_calls(), 0);
}

#[rstest]
#[case("hello")]
#[case("dashboard")]
#[case("user")]
#[tokio::test]
async fn protected_route_without_auth_is_401_and_skips_handler(
    #[case] action: &str,
    #[values(None, Some("expired"), Some("forged"))] credential: Option<&str>,
) {
    let h = harness();
    let token = match credential {
        Some("expired") => Some(expired_token("sess-1")),
        Some(_) => Some("abc.def".to_owned()),
        None => None,
    };

    let path = format!("/api/v1/{action}");
    let res = h.dispatcher.dispatch(request(Method::Get, &path, token.as_deref(), "")).await;

    assert_eq!(res.status_code(), 401);
    assert!(body_text(&res).contains(NOT_AUTHORIZED));
    assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    assert_eq!(h.spy(action).calls(), 0);
}

#[tokio::test]
async fn protected_route_with_auth_calls_handler_once() {
    let h = harness();
    let token = valid_token("sess-1");

    let res = h.dispatcher.dispatch(request(Method::Get, "/api/v1/hello", Some(&token), "")).await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(h.spy("hello").calls(), 1);
    assert_eq!(h.total_calls(), 1);
}

#[rstest]
#[tokio::test]
async fn version_is_public(#[values(None, Some(false), Some(true))] auth: Option<bool>) {
    let h = harness();
    let token = match auth {
        Some(true) => Some(valid_token("s")),
        Some(false) => Some(expired_token("s")),
        None => None,
    };

    let res = h.dispatcher.dispatch(request(Method::Get, "/api/v1/version", token.as_deref(), "")).await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(h.spy("version").calls(), 1);
}

#[rstest]
#[tokio::test]
async fn login_post_always_reaches_handler(#[values(None, Some(false), Some(true))] auth: Option<bool>) {
    let h = harness();
    let token = match auth {
        Some(true) => Some(valid_token("s")),
        Some(false) => Some(expired_token("s")),
        None => None,
    };

    let res = h.dispatcher
        .dispatch(request(Method::Post, "/api/v1/login", token.as_deref(), "{}"))
        .await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(h.spy("login").calls(), 1);
}

#[tokio::test]
async fn refresh_route_sees_the_access_token() {
    let token = expired_token("sess-7");
    let seen = Arc::new(std::sync::Mutex::new(None));

    let router = Router::new()
        .public(Method::Get, "refresh-token", {
            let seen = Arc::clone(&seen);
            move |req: Request| {
                *seen.lock().unwrap() = req.access_token().map(str::to_owned);
                ready(Response::text("ok"))
            }
        })
        .unwrap();
    let dispatcher = Dispatcher::new(router, Arc::new(MemorySessionCache::new()), Cors::default());

    let res = dispatcher.dispatch(request(Method::Get, "/api/v1/refresh-token", Some(&token), "")).await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(seen.lock().unwrap().as_deref(), Some(token.as_str()));
}

#[tokio::test]
async fn cache_hit_sets_current_user() {
    let cache = Arc::new(MemorySessionCache::new());
    let user = cached_user();
    cache.set("sess-1", &user, std::time::Duration::from_secs(60)).await.unwrap();
    let h = Harness::new(cache);

    let token = valid_token("sess-1");
    let res = h.dispatcher.dispatch(request(Method::Get, "/api/v1/hello", Some(&token), "")).await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(*h.spy("hello").last_user.lock().unwrap(), Some(Some(user.user_id)));
    assert_eq!(h.outcomes(), vec![LookupOutcome::Hit]);
}

#[tokio::test]
async fn cache_miss_leaves_current_user_absent() {
    let h = harness();
    let token = valid_token("sess-unknown");

    let res = h.dispatcher.dispatch(request(Method::Get, "/api/v1/hello", Some(&token), "")).await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(*h.spy("hello").last_user.lock().unwrap(), Some(None));
    assert_eq!(h.outcomes(), vec![LookupOutcome::Miss]);
}

#[tokio::test]
async fn cache_failure_is_observed_but_not_surfaced() {
    let h = Harness::new(Arc::new(BrokenCache));
    let token = valid_token("sess-1");

    let res = h.dispatcher.dispatch(request(Method::Get, "/api/v1/hello", Some(&token), "")).await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(h.spy("hello").calls(), 1);
    assert!(matches!(h.outcomes().as_slice(), [LookupOutcome::Failed(_)]));
}

#[tokio::test]
async fn requests_without_session_skip_the_cache() {
    let h = Harness::new(Arc::new(BrokenCache));

    let res = h.dispatcher.dispatch(request(Method::Get, "/api/v1/version", None, "")).await;

    assert_eq!(res.status_code(), 200);
    assert!(h.outcomes().is_empty());
}

#[tokio::test]
async fn cache_hit_does_not_authorize() {
    let cache = Arc::new(MemorySessionCache::new());
    cache.set("sess-1", &cached_user(), std::time::Duration::from_secs(60)).await.unwrap();
    let h = Harness::new(cache);

    let token = expired_token("sess-1");
    let res = h.dispatcher.dispatch(request(Method::Get, "/api/v1/user", Some(&token), "")).await;

    assert_eq!(res.status_code(), 401);
    assert_eq!(h.outcomes(), vec![LookupOutcome::Hit]);
    assert_eq!(h.spy("user").calls(), 0);
}

#[rstest]
#[case(Method::Get, "/api/v1/hello", true)]
#[case(Method::Get, "/api/v1/hello", false)]
#[case(Method::Get, "/api/v1/nothing", true)]
#[case(Method::Post, "/api/v1/register", false)]
#[tokio::test]
async fn dispatching_twice_gives_the_same_decision(
    #[case] method: Method,
    #[case] path: &str,
    #[case] authorized: bool,
) {
    let h = harness();
    let token = authorized.then(|| valid_token("sess-1"));
    let req = request(method, path, token.as_deref(), "");

    let first = h.dispatcher.dispatch(req.clone()).await;
    let calls_after_first = h.total_calls();
    let second = h.dispatcher.dispatch(req).await;

    assert_eq!(first.status_code(), second.status_code());
    assert_eq!(first.body(), second.body());
    assert_eq!(h.total_calls(), calls_after_first * 2);
}

#[test]
fn service_route_table_has_unique_keys() {
    let router = carebox::app::routes(&common::services()).unwrap();

    let keys: Vec<_> = router
        .routes()
        .map(|r| (r.method(), r.segment_count(), r.action().to_owned()))
        .collect();
    let unique: HashSet<_> = keys.iter().cloned().collect();

    assert_eq!(keys.len(), 7);
    assert_eq!(unique.len(), keys.len());

    let protected: HashSet<_> = router
        .routes()
        .filter(|r| r.access() == Access::Protected)
        .map(|r| r.action().to_owned())
        .collect();
    assert_eq!(protected, HashSet::from(["hello".into(), "dashboard".into(), "user".into()]));
}

#[test]
fn registering_hello_twice_fails_at_construction() {
    let hello = Arc::new(Spy::default());
    let result = Router::new()
        .protected(Method::Get, "hello", spy_handler(&hello))
        .and_then(|r| r.protected(Method::Get, "dashboard", spy_handler(&hello)))
        .and_then(|r| r.protected(Method::Get, "hello", spy_handler(&hello)));

    assert!(matches!(
        result,
        Err(Error::DuplicateRoute { method: Method::Get, segment_count: 3, ref action }) if action == "hello"
    ));
}
