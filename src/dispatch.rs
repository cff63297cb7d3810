//! Per-request orchestration.
//!
//! The [`Dispatcher`] owns everything one request touches: the router, the
//! session store, and the optional static-file root. Each request runs the
//! same lifecycle — parse query and cookies, resolve the session, resolve the
//! route, run the first matching middleware around the handler — and on a
//! routing miss a read-only request falls through to static-file lookup
//! before the final 404 or 405. A request is always answered; nothing
//! propagates past this boundary.
//!
//! [`Dispatcher::dispatch`] is directly callable, so a whole application can
//! be exercised in-process without opening a socket.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::files::{Lookup, StaticFiles};
use crate::handler::ErasedHandler;
use crate::method::Method;
use crate::middleware::{ErasedMiddleware, continuation};
use crate::request::{self, Request};
use crate::response::Response;
use crate::router::{Resolved, Router};
use crate::session::{Session, SessionStore};
use crate::status::Status;

/// Seconds of `max-age` sent with the session cookie. Advisory only: the
/// store itself never expires sessions.
const SESSION_COOKIE_MAX_AGE: u32 = 3600;

/// Routes, sessions, and fallbacks for one application.
pub struct Dispatcher {
    router: Router,
    sessions: Arc<SessionStore>,
    statics: Option<StaticFiles>,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            sessions: Arc::new(SessionStore::new()),
            statics: None,
        }
    }

    /// Serves files from `root` when no route matches a read-only request.
    pub fn static_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.statics = Some(StaticFiles::new(root));
        self
    }

    /// Runs one request through the full lifecycle.
    ///
    /// `target` is the request target as it appears on the request line: the
    /// path plus an optional `?query`. Always returns a definite response,
    /// and always appends the `session` cookie for the resolved session.
    pub async fn dispatch(
        &self,
        method: Method,
        target: &str,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Response {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_owned(), request::parse_query(query)),
            None => (target.to_owned(), Default::default()),
        };

        let cookies = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("cookie"))
            .map(|(_, v)| request::parse_cookies(v))
            .unwrap_or_default();

        let token = self
            .sessions
            .resolve(cookies.get("session").map(String::as_str));
        let session = Session::new(token.clone(), Arc::clone(&self.sessions));

        debug!(%method, path, "dispatching");

        let mut response = match self.router.resolve(&path, method) {
            Resolved::Found { handler, params } => {
                let mut req =
                    Request::new(method, path.clone(), headers, body, query, cookies, session);
                req.set_params(params);

                // At most one middleware runs, wrapping the handler. The
                // handler only executes if the middleware invokes its
                // continuation.
                match self.router.middleware_for(&path) {
                    Some(middleware) => middleware.call(req, continuation(handler)).await,
                    None => handler.call(req).await,
                }
            }
            miss => self.fall_through(method, &path, miss).await,
        };

        response.append_cookie("session", &token, SESSION_COOKIE_MAX_AGE);
        response
    }

    /// No route answered: try the static root for read-only verbs, then
    /// produce the definite error the router decided on.
    async fn fall_through(&self, method: Method, path: &str, miss: Resolved) -> Response {
        if method.is_read_only()
            && let Some(files) = &self.statics
        {
            match files.lookup(path).await {
                Lookup::Found { content_type, body } => {
                    return Response::bytes_raw(content_type, body);
                }
                Lookup::Failed => {
                    return Response::builder()
                        .status(Status::InternalServerError)
                        .text("500 something went wrong..");
                }
                Lookup::Missing => {}
            }
        }

        match miss {
            Resolved::MethodNotAllowed => Response::builder()
                .status(Status::MethodNotAllowed)
                .text("405 method not allowed"),
            _ => Response::builder()
                .status(Status::NotFound)
                .text("404 nothing here"),
        }
    }
}
