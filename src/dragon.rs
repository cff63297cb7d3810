//! The bundled demo service: a small dragon-themed site that exercises every
//! framework feature — routing with `:name` captures, middleware, sessions,
//! redirects, templates, static files, and JSON/CSV output.
//!
//! Build it with [`app`] and either serve it:
//!
//! ```rust,no_run
//! use wyrm::{Server, dragon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = dragon::app("static", "views");
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```
//!
//! or drive it in-process through [`Dispatcher::dispatch`](crate::Dispatcher::dispatch),
//! which is how the integration tests use it.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::middleware::Next;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::router::Router;
use crate::status::Status;
use crate::view::Viewer;

/// Site-wide counters, shared across all in-flight requests.
///
/// Owned by the app and handed to handlers by `Arc` — not ambient globals —
/// with atomic increments so the multi-threaded runtime cannot lose updates.
#[derive(Default)]
pub struct Stats {
    cookies_given: AtomicU64,
    presents_received: AtomicU64,
    view_count: AtomicU64,
}

/// One consistent-enough reading of the counters, in wire-ready casing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsSnapshot {
    cookies_given: u64,
    presents_received: u64,
    view_count: u64,
}

impl Stats {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cookies_given: self.cookies_given.load(Ordering::Relaxed),
            presents_received: self.presents_received.load(Ordering::Relaxed),
            view_count: self.view_count.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// `stat,value` header plus one quoted row per counter. The keys match
    /// the JSON field names so both formats agree in the same state.
    fn to_csv(&self) -> String {
        format!(
            "stat,value\n\"cookiesGiven\",\"{}\"\n\"presentsReceived\",\"{}\"\n\"viewCount\",\"{}\"\n",
            self.cookies_given, self.presents_received, self.view_count
        )
    }
}

/// Builds the demo service. `static_dir` is the static-asset root,
/// `views_dir` holds the `{{placeholder}}` templates.
pub fn app(static_dir: impl Into<PathBuf>, views_dir: impl Into<PathBuf>) -> Dispatcher {
    let stats = Arc::new(Stats::default());
    let viewer = Arc::new(Viewer::new(views_dir));

    let router = Router::new()
        .get("/", {
            let stats = Arc::clone(&stats);
            move |req: Request| home(req, Arc::clone(&stats))
        })
        .post("/", {
            let stats = Arc::clone(&stats);
            move |req: Request| receive_presents(req, Arc::clone(&stats))
        })
        .get("/stats", {
            let stats = Arc::clone(&stats);
            move |req: Request| stats_page(req, Arc::clone(&stats))
        })
        .get("/mimic/:as/:quote", mimic)
        .get("/lucky", lucky)
        .get("/moved", moved)
        .get("/html", move |req: Request| html_page(req, Arc::clone(&viewer)))
        .get("/win", win)
        .get("/lose", lose)
        .wrap("/stats", |req: Request, next: Next| async move {
            debug!(path = req.path(), "stats requested");
            next(req).await
        });

    Dispatcher::new(router).static_dir(static_dir)
}

// GET /
//
// Greets, counts the visit (per session and site-wide), and hands out one
// dragonCookie per session when asked for with ?cookie.
async fn home(req: Request, stats: Arc<Stats>) -> Response {
    let views = req.session().increment("views");
    stats.view_count.fetch_add(1, Ordering::Relaxed);

    let mut greeting = format!("dragons! you have visited {views} times");
    let mut builder = Response::builder();

    if req.cookie("dragonCookie").is_some() {
        greeting.push_str(" (nom nom, that cookie was tasty)");
    } else if req.query("cookie").is_some() {
        let first_time = req.session().get("dragonCookie").is_none();
        if first_time {
            req.session().set("dragonCookie", true);
            stats.cookies_given.fetch_add(1, Ordering::Relaxed);
            builder = builder.cookie("dragonCookie", "nom", 10);
            greeting.push_str(", have a cookie!");
        }
    }

    builder.text(greeting)
}

// POST /
//
// Accepts `{"presents": n}`. Only a positive count moves the counter; a
// malformed body, a missing field, or a non-positive count is a 400 and
// leaves the counter untouched.
async fn receive_presents(req: Request, stats: Arc<Stats>) -> Response {
    let Ok(body) = req.json::<Value>() else {
        return Response::builder()
            .status(Status::BadRequest)
            .text("400 that was not json");
    };

    match body.get("presents").and_then(Value::as_i64) {
        Some(presents) if presents > 0 => {
            stats.presents_received.fetch_add(presents as u64, Ordering::Relaxed);
            Response::text(format!("thank you for the {presents} presents!"))
        }
        _ => Response::builder()
            .status(Status::BadRequest)
            .text("400 that is not how presents work"),
    }
}

// GET /stats — JSON by default, CSV attachment with ?csv.
async fn stats_page(req: Request, stats: Arc<Stats>) -> Response {
    let snapshot = stats.snapshot();

    if req.query("csv").is_some() {
        return Response::builder()
            .header("content-disposition", "attachment")
            .bytes(ContentType::Csv, snapshot.to_csv().into_bytes());
    }

    match serde_json::to_vec(&snapshot) {
        Ok(json) => Response::json(json),
        Err(_) => Response::builder()
            .status(Status::InternalServerError)
            .text("500 something went wrong.."),
    }
}

// GET /mimic/:as/:quote — anything can speak like a dragon.
async fn mimic(req: Request) -> Response {
    let speaker = req.param("as").unwrap_or("dragon");
    let quote = req.param("quote").unwrap_or("rawr");
    Response::text(format!("the {speaker} says \"{quote}\""))
}

// GET /lucky — a fair coin decides.
async fn lucky(_req: Request) -> Response {
    let target = if fastrand::bool() { "/win" } else { "/lose" };
    Response::redirect(target, false)
}

// GET /moved — the old entrance, permanently redirected home.
async fn moved(_req: Request) -> Response {
    Response::redirect("/", true)
}

async fn win(_req: Request) -> Response {
    Response::text("you win! the dragon shares the gold")
}

async fn lose(_req: Request) -> Response {
    Response::text("you lose.. the dragon keeps the gold")
}

// GET /html — the template renderer at work.
async fn html_page(_req: Request, viewer: Arc<Viewer>) -> Response {
    let data = [
        ("title", "dragon tales"),
        ("content", "once upon a time\nthere was a dragon"),
    ];
    match viewer.render("index", &data).await {
        Ok(html) => Response::html(html),
        Err(_) => Response::builder()
            .status(Status::InternalServerError)
            .text("500 something went wrong.."),
    }
}
