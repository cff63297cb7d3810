//! First-match request router with middleware and sub-router mounting.
//!
//! The route table is an ordered sequence of (pattern, method → handler)
//! slots plus an ordered sequence of (pattern, middleware) entries. Lookup is
//! a linear scan in registration order: candidates are filtered by segment
//! count, then per segment (literals byte-equal, `:name` wildcards always
//! pass), and the **first** survivor wins — never the most specific one. That
//! is O(registered patterns × path segments) per request, which is the right
//! trade at the table sizes this crate serves; an index by segment count and
//! first literal would speed it up without changing the order semantics.
//!
//! Registration is build-time only. A router is assembled once at startup,
//! then shared read-only behind an `Arc` for the life of the process, so
//! lookup takes no locks.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::matcher::{self, Pattern};
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Middleware};

struct RouteEntry {
    pattern: Pattern,
    methods: HashMap<Method, BoxedHandler>,
}

struct MiddlewareEntry {
    pattern: Pattern,
    middleware: BoxedMiddleware,
}

/// The outcome of resolving a path + method against the table.
pub enum Resolved {
    /// A structural match whose slot carries the requested method.
    Found {
        handler: BoxedHandler,
        params: HashMap<String, String>,
    },
    /// A structural match exists, but not for this method. The first matching
    /// slot decides — a later slot never rescues the verb.
    MethodNotAllowed,
    /// No pattern matches the path structurally.
    NotFound,
}

/// The application router.
///
/// Build it once at startup; every `Router` method consumes and returns
/// `self` so registrations chain naturally:
///
/// ```rust,no_run
/// # use wyrm::{Request, Response, Router};
/// # async fn home(_: Request) -> Response { Response::text("") }
/// # async fn echo(_: Request) -> Response { Response::text("") }
/// let api = Router::new().get("/", home);
///
/// let app = Router::new()
///     .get("/", home)
///     .get("/mimic/:as/:quote", echo)
///     .mount("/api", api);
/// ```
pub struct Router {
    routes: Vec<RouteEntry>,
    middlewares: Vec<MiddlewareEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new(), middlewares: Vec::new() }
    }

    /// Registers a handler for a method + pattern pair.
    ///
    /// Patterns sharing the same trimmed text share one slot, so `get` then
    /// `post` on the same pattern answers both verbs. Two structurally
    /// identical but differently spelt patterns (`a/:x` and `a/:y`) occupy
    /// independent slots and resolve first-registered-wins.
    pub fn on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        let pattern = Pattern::parse(pattern);
        let handler = handler.into_boxed_handler();
        match self.routes.iter_mut().find(|e| e.pattern.raw() == pattern.raw()) {
            Some(entry) => {
                entry.methods.insert(method, handler);
            }
            None => {
                self.routes.push(RouteEntry {
                    pattern,
                    methods: HashMap::from([(method, handler)]),
                });
            }
        }
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, pattern, handler)
    }

    /// Registers a middleware at `pattern`.
    ///
    /// Middleware matching uses the same segment-count and wildcard rules as
    /// routes but ignores the method. Only the first structurally matching
    /// middleware fires per request.
    pub fn wrap(mut self, pattern: &str, middleware: impl Middleware) -> Self {
        self.middlewares.push(MiddlewareEntry {
            pattern: Pattern::parse(pattern),
            middleware: middleware.into_boxed_middleware(),
        });
        self
    }

    /// Mounts `router` under `prefix`.
    ///
    /// Every route and middleware entry of the child is copied into this
    /// router with the prefix's segments prepended, appended **after** the
    /// entries already registered here. Mounting flattens once, at this call —
    /// a previously mounted grandchild arrives already prefixed, and the child
    /// cannot be mutated afterwards to retroactively change the host.
    pub fn mount(mut self, prefix: &str, router: Router) -> Self {
        let prefix = Pattern::parse(prefix);
        for entry in router.routes {
            self.routes.push(RouteEntry {
                pattern: entry.pattern.prefixed(&prefix),
                methods: entry.methods,
            });
        }
        for entry in router.middlewares {
            self.middlewares.push(MiddlewareEntry {
                pattern: entry.pattern.prefixed(&prefix),
                middleware: entry.middleware,
            });
        }
        self
    }

    /// Resolves a path + method to a handler and its captured parameters.
    pub fn resolve(&self, path: &str, method: Method) -> Resolved {
        let segments = matcher::segments(path);
        for entry in &self.routes {
            let Some(params) = entry.pattern.matches(&segments) else {
                continue;
            };
            return match entry.methods.get(&method) {
                Some(handler) => Resolved::Found { handler: Arc::clone(handler), params },
                None => Resolved::MethodNotAllowed,
            };
        }
        Resolved::NotFound
    }

    /// Returns the first structurally matching middleware for `path`, if any.
    pub(crate) fn middleware_for(&self, path: &str) -> Option<BoxedMiddleware> {
        let segments = matcher::segments(path);
        self.middlewares
            .iter()
            .find(|entry| entry.pattern.matches(&segments).is_some())
            .map(|entry| Arc::clone(&entry.middleware))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::handler::ErasedHandler;
    use crate::middleware::ErasedMiddleware;
    use crate::request::Request;
    use crate::response::Response;
    use crate::session::{Session, SessionStore};

    fn request() -> Request {
        let store = Arc::new(SessionStore::new());
        let token = store.resolve(None);
        Request::new(
            Method::Get,
            "/".to_owned(),
            Vec::new(),
            Vec::new(),
            HashMap::new(),
            HashMap::new(),
            Session::new(token, store),
        )
    }

    async fn body_of(resolved: Resolved) -> String {
        match resolved {
            Resolved::Found { handler, .. } => {
                let res = handler.call(request()).await;
                String::from_utf8(res.body().to_vec()).unwrap()
            }
            Resolved::MethodNotAllowed => "405".to_owned(),
            Resolved::NotFound => "404".to_owned(),
        }
    }

    async fn first(_req: Request) -> Response {
        Response::text("first")
    }

    async fn second(_req: Request) -> Response {
        Response::text("second")
    }

    #[tokio::test]
    async fn wildcards_capture_parameters() {
        let router = Router::new().get("/mimic/:as/:quote", first);

        match router.resolve("/mimic/cat/meow", Method::Get) {
            Resolved::Found { params, .. } => {
                assert_eq!(params.get("as").map(String::as_str), Some("cat"));
                assert_eq!(params.get("quote").map(String::as_str), Some("meow"));
            }
            _ => panic!("expected a match"),
        }
    }

    #[tokio::test]
    async fn wrong_method_is_405_not_404() {
        let router = Router::new().get("/stats", first);

        assert!(matches!(router.resolve("/stats", Method::Post), Resolved::MethodNotAllowed));
        assert!(matches!(router.resolve("/nowhere", Method::Get), Resolved::NotFound));
    }

    #[tokio::test]
    async fn same_pattern_text_shares_a_slot_across_methods() {
        let router = Router::new().get("/a/:x", first).post("a/:x/", second);

        assert_eq!(body_of(router.resolve("/a/1", Method::Get)).await, "first");
        assert_eq!(body_of(router.resolve("/a/1", Method::Post)).await, "second");
    }

    #[tokio::test]
    async fn first_registered_wins_among_equally_matching_patterns() {
        // `a/:x` is registered before the more specific `a/b`; the scan picks
        // the wildcard because it came first.
        let router = Router::new().get("/a/:x", first).get("/a/b", second);
        assert_eq!(body_of(router.resolve("/a/b", Method::Get)).await, "first");

        let router = Router::new().get("/a/b", second).get("/a/:x", first);
        assert_eq!(body_of(router.resolve("/a/b", Method::Get)).await, "second");
    }

    #[tokio::test]
    async fn first_matching_slot_decides_the_verb() {
        // `a/:y` carries POST, but the earlier `a/:x` slot wins the structural
        // match and answers 405 for it.
        let router = Router::new().get("/a/:x", first).post("/a/:y", second);
        assert!(matches!(router.resolve("/a/1", Method::Post), Resolved::MethodNotAllowed));
    }

    #[tokio::test]
    async fn trailing_slash_resolves_identically() {
        let router = Router::new().get("/stats", first);
        assert_eq!(body_of(router.resolve("/stats/", Method::Get)).await, "first");
        assert_eq!(body_of(router.resolve("stats", Method::Get)).await, "first");
    }

    #[tokio::test]
    async fn mounted_root_is_reachable_only_under_the_prefix() {
        let sub = Router::new().get("/", first);
        let host = Router::new().get("/", second).mount("/router/another", sub);

        assert_eq!(body_of(host.resolve("/router/another/", Method::Get)).await, "first");
        assert_eq!(body_of(host.resolve("/router/another", Method::Get)).await, "first");
        // The host root still resolves to its own handler.
        assert_eq!(body_of(host.resolve("/", Method::Get)).await, "second");
    }

    #[tokio::test]
    async fn mounting_flattens_nested_mounts_transitively() {
        let inner = Router::new().get("/leaf", first);
        let middle = Router::new().mount("/mid", inner);
        let host = Router::new().mount("/top", middle);

        assert_eq!(body_of(host.resolve("/top/mid/leaf", Method::Get)).await, "first");
        assert!(matches!(host.resolve("/mid/leaf", Method::Get), Resolved::NotFound));
    }

    #[tokio::test]
    async fn mounted_entries_append_after_host_entries() {
        let sub = Router::new().get("/a/:x", second);
        let host = Router::new().mount("/pre", sub).get("/pre/a/b", first);

        // The mounted wildcard was appended before `get` ran, so it still
        // wins the scan for /pre/a/b.
        assert_eq!(body_of(host.resolve("/pre/a/b", Method::Get)).await, "second");
    }

    #[tokio::test]
    async fn middleware_matches_method_agnostically_and_first_only() {
        let router = Router::new()
            .wrap("/admin/:section", |req: Request, next: crate::middleware::Next| async move {
                next(req).await
            })
            .wrap("/admin/users", |_req: Request, _next: crate::middleware::Next| async move {
                Response::text("short-circuit")
            });

        // Both patterns match /admin/users structurally; the first registered
        // entry is selected.
        let mw = router.middleware_for("/admin/users").expect("middleware");
        let res = mw
            .call(request(), Box::new(|_req| Box::pin(async { Response::text("handler") })))
            .await;
        assert_eq!(res.body(), b"handler");

        assert!(router.middleware_for("/elsewhere").is_none());
    }

    #[tokio::test]
    async fn mounting_prefixes_middleware_patterns_too() {
        let sub = Router::new().wrap("/guarded", |_req: Request, _next: crate::middleware::Next| async move {
            Response::text("blocked")
        });
        let host = Router::new().mount("/api", sub);

        assert!(host.middleware_for("/api/guarded").is_some());
        assert!(host.middleware_for("/guarded").is_none());
    }
}
