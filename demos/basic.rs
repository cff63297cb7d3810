//! The bundled dragon demo service.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl 'http://localhost:3000/?cookie'
//!   curl -X POST http://localhost:3000/ \
//!        -H 'content-type: application/json' \
//!        -d '{"presents":3}'
//!   curl http://localhost:3000/stats
//!   curl 'http://localhost:3000/stats?csv'
//!   curl http://localhost:3000/mimic/cat/meow
//!   curl -i http://localhost:3000/lucky
//!   curl http://localhost:3000/html
//!
//! `PORT` selects the listen port, default 3000. Sessions are per-client:
//! pass the `session` cookie back (`curl -c jar -b jar ...`) to watch the
//! visit counter climb.

use wyrm::{Server, dragon};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let app = dragon::app("static", "views");

    Server::bind(&format!("0.0.0.0:{port}"))
        .serve(app)
        .await
        .expect("server error");
}
