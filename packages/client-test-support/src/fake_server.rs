//! Real HTTP server speaking the Majority Rules API, for client tests.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::fake_game::{FakeGame, Rejection, DEFAULT_ROUNDS};

pub const TUNNEL_HEADER: &str = "ngrok-skip-browser-warning";

pub const INTERSTITIAL_HTML: &str = "<!DOCTYPE html><html><head><title>ngrok</title></head>\
<body><h1>You are about to visit this site</h1></body></html>";

#[derive(Debug, Clone, Copy)]
pub struct FakeServerOptions {
    /// Answer every request lacking the tunnel header with an HTML warning page.
    pub require_tunnel_header: bool,
    pub round_total: i64,
}

impl Default for FakeServerOptions {
    fn default() -> Self {
        Self {
            require_tunnel_header: false,
            round_total: DEFAULT_ROUNDS,
        }
    }
}

/// One request as seen by the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub tunnel_header: bool,
}

struct Shared {
    game: Mutex<FakeGame>,
    requests: Mutex<Vec<RecordedRequest>>,
    options: FakeServerOptions,
}

impl Shared {
    /// Records the request; returns the interstitial page when the tunnel
    /// header is required but missing.
    fn intercept(&self, req: &HttpRequest) -> Option<HttpResponse> {
        let tunnel_header = req.headers().contains_key(TUNNEL_HEADER);
        self.requests.lock().push(RecordedRequest {
            method: req.method().to_string(),
            path: req.path().to_string(),
            query: req.query_string().to_string(),
            tunnel_header,
        });
        debug!(
            method = %req.method(),
            path = req.path(),
            tunnel_header,
            "fake server request"
        );
        if self.options.require_tunnel_header && !tunnel_header {
            debug!(path = req.path(), "serving tunnel interstitial");
            return Some(
                HttpResponse::Ok()
                    .content_type("text/html; charset=utf-8")
                    .body(INTERSTITIAL_HTML),
            );
        }
        None
    }
}

fn reply(result: Result<Value, Rejection>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(rejection) => {
            let status =
                StatusCode::from_u16(rejection.status).unwrap_or(StatusCode::BAD_REQUEST);
            let mut body = json!({"error": rejection.error});
            if let Some(details) = rejection.details {
                body["details"] = Value::String(details);
            }
            HttpResponse::build(status).json(body)
        }
    }
}

fn parse_body(body: &web::Bytes) -> Result<Value, Rejection> {
    serde_json::from_slice::<Value>(body).map_err(|_| Rejection {
        status: 400,
        error: "Invalid JSON body".to_string(),
        details: None,
    })
}

async fn join(req: HttpRequest, shared: web::Data<Shared>, body: web::Bytes) -> HttpResponse {
    if let Some(resp) = shared.intercept(&req) {
        return resp;
    }
    reply(parse_body(&body).and_then(|v| shared.game.lock().join(&v)))
}

async fn state(req: HttpRequest, shared: web::Data<Shared>) -> HttpResponse {
    if let Some(resp) = shared.intercept(&req) {
        return resp;
    }
    reply(Ok(shared.game.lock().state()))
}

async fn answer(req: HttpRequest, shared: web::Data<Shared>, body: web::Bytes) -> HttpResponse {
    if let Some(resp) = shared.intercept(&req) {
        return resp;
    }
    reply(parse_body(&body).and_then(|v| shared.game.lock().submit("answer", &v)))
}

async fn guess(req: HttpRequest, shared: web::Data<Shared>, body: web::Bytes) -> HttpResponse {
    if let Some(resp) = shared.intercept(&req) {
        return resp;
    }
    reply(parse_body(&body).and_then(|v| shared.game.lock().submit("guess", &v)))
}

#[derive(serde::Deserialize)]
struct ResultsQuery {
    round_id: Option<i64>,
}

async fn results(
    req: HttpRequest,
    shared: web::Data<Shared>,
    query: web::Query<ResultsQuery>,
) -> HttpResponse {
    if let Some(resp) = shared.intercept(&req) {
        return resp;
    }
    reply(shared.game.lock().results(query.round_id))
}

async fn scoreboard(req: HttpRequest, shared: web::Data<Shared>) -> HttpResponse {
    if let Some(resp) = shared.intercept(&req) {
        return resp;
    }
    reply(Ok(shared.game.lock().scoreboard()))
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/join", web::post().to(join))
        .route("/api/state", web::get().to(state))
        .route("/api/answer", web::post().to(answer))
        .route("/api/guess", web::post().to(guess))
        .route("/api/results", web::get().to(results))
        .route("/api/scoreboard", web::get().to(scoreboard));
}

/// A fake game server bound to a random local port.
///
/// Start it from inside an actix/tokio test runtime; stop it with
/// [`FakeGameServer::stop`].
pub struct FakeGameServer {
    addr: SocketAddr,
    handle: ServerHandle,
    join: JoinHandle<std::io::Result<()>>,
    shared: web::Data<Shared>,
}

impl FakeGameServer {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(FakeServerOptions::default()).await
    }

    pub async fn start_with(options: FakeServerOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let shared = web::Data::from(Arc::new(Shared {
            game: Mutex::new(FakeGame::new(options.round_total)),
            requests: Mutex::new(Vec::new()),
            options,
        }));

        let app_data = shared.clone();
        let server = HttpServer::new(move || App::new().app_data(app_data.clone()).configure(configure))
            .workers(1)
            .listen(listener)?
            .run();

        let handle = server.handle();
        let join = tokio::spawn(server);
        Ok(Self {
            addr,
            handle,
            join,
            shared,
        })
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Runs `f` against the game, e.g. to advance phases.
    pub fn with_game<R>(&self, f: impl FnOnce(&mut FakeGame) -> R) -> R {
        f(&mut *self.shared.game.lock())
    }

    pub fn next_phase(&self) -> &'static str {
        self.with_game(FakeGame::next_phase)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.shared
            .requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
        let _ = self.join.await;
    }
}
