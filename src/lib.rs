//! # wyrm
//!
//! A minimal HTTP framework with mountable routers, middleware, and cookie
//! sessions. Nothing more. Nothing less.
//!
//! ## What's inside
//!
//! - **First-match routing** — `:name` path parameters, linear scan in
//!   registration order, 404 vs 405 told apart
//! - **Mountable routers** — compose a [`Router`] into another under a
//!   prefix; flattened once at mount time, not per request
//! - **Middleware** — one structurally matching middleware wraps the handler
//!   and may short-circuit it
//! - **Sessions** — an in-memory store keyed by a `session` cookie token,
//!   refreshed on every response
//! - **Fallbacks** — static files from a fixed root, then a definite
//!   404/405/500; no request goes unanswered
//! - **Templates** — `{{placeholder}}` substitution via [`Viewer`]
//! - **Graceful shutdown** — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wyrm::{Dispatcher, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .get("/", home)
//!         .get("/mimic/:as/:quote", mimic);
//!
//!     let app = Dispatcher::new(router).static_dir("static");
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn home(req: Request) -> Response {
//!     let views = req.session().increment("views");
//!     Response::text(format!("hello, visit number {views}"))
//! }
//!
//! async fn mimic(req: Request) -> Response {
//!     let speaker = req.param("as").unwrap_or("dragon");
//!     Response::text(format!("the {speaker} speaks"))
//! }
//! ```
//!
//! The bundled [`dragon`] module is a complete demo service built entirely on
//! the public API; run it with `cargo run --example basic`.

mod dispatch;
mod error;
mod files;
mod handler;
mod matcher;
mod method;
mod request;
mod response;
mod router;
mod server;
mod session;
mod status;
mod view;

pub mod dragon;
pub mod middleware;

pub use dispatch::Dispatcher;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use middleware::{Middleware, Next};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::{Resolved, Router};
pub use server::Server;
pub use session::{Session, SessionBag, SessionStore};
pub use status::Status;
pub use view::Viewer;
