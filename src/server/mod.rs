//! REST API server
//!
//! Listens on `server.host:server.port` (default 127.0.0.1:5001) and serves:
//! - GET /api/health (no auth)
//! - /api/auth, /api/projects, /api/tasks, /api/timer, /api/reports
//!
//! Every other `/api/*` route requires `Authorization: Bearer <token>`.
//! Requests are handled one at a time on the server thread.

mod guard;
mod handlers;
mod types;

pub use guard::{check_ownership, load_owned, Owned};
pub use types::{parse_date_param, AppState, QueryParams, Reply, RequestContext};

use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::report::{system_views, ExportedFile};
use handlers::{misc, projects, reports, tasks, timer};

const AUTH_HEADER: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// Bound API server, not yet serving
pub struct ApiServer {
    server: Arc<Server>,
    state: AppState,
}

/// Stops a running [`ApiServer`] from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.server.unblock();
    }
}

impl ApiServer {
    /// Bind the listener and seed the system report views
    pub fn bind(addr: &str, state: AppState) -> Result<Self> {
        state.store.ensure_system_views(&system_views())?;
        let server = Server::http(addr)
            .map_err(|e| anyhow!("Failed to start server on {}: {}", addr, e))?;
        let server = Self {
            server: Arc::new(server),
            state,
        };
        info!(
            "[donow:http] Server listening on http://{}",
            server
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|| addr.to_string())
        );
        Ok(server)
    }

    /// Actual bound address (useful with port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
        }
    }

    /// Serve until shut down
    pub fn run(self) {
        for mut request in self.server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();
            let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));

            if method == Method::Options {
                respond_preflight(request);
                continue;
            }

            match self.handle(&mut request, &method, path, query) {
                Ok(Reply::Json(status, value)) => respond_json(request, status, value),
                Ok(Reply::File(file)) => respond_file(request, file),
                Err(e) => {
                    match &e {
                        ApiError::Internal(cause) => {
                            error!("[donow:http] {} {} failed: {:#}", method, path, cause)
                        }
                        other => debug!("[donow:http] {} {} -> {}", method, path, other),
                    }
                    let production = self.state.config.server.production;
                    respond_json(
                        request,
                        e.status_code(),
                        serde_json::json!({
                            "success": false,
                            "message": e.public_message(production),
                        }),
                    );
                }
            }
        }
        info!("[donow:http] Server stopped");
    }

    /// Run on a background thread
    pub fn spawn(self) -> (ShutdownHandle, JoinHandle<()>) {
        let handle = self.shutdown_handle();
        let join = thread::spawn(move || self.run());
        (handle, join)
    }

    fn handle(
        &self,
        request: &mut Request,
        method: &Method,
        path: &str,
        query: &str,
    ) -> ApiResult<Reply> {
        if *method == Method::Get && path == "/api/health" {
            return Ok(misc::health());
        }
        let Some(route) = path.strip_prefix("/api/") else {
            return Err(ApiError::not_found("Route not found"));
        };

        let user = self.authenticate(request)?;
        let body = match method {
            Method::Post | Method::Put => {
                read_request_body(request, self.state.config.server.max_body_bytes)?
            }
            _ => String::new(),
        };
        let ctx = RequestContext {
            user,
            query: QueryParams::parse(query),
            body,
        };

        let segments: Vec<&str> = route.trim_end_matches('/').split('/').collect();
        route_request(&self.state, &ctx, method, &segments)
    }

    fn authenticate(&self, request: &Request) -> ApiResult<crate::domain::User> {
        let token = request
            .headers()
            .iter()
            .find(|h| h.field.equiv(AUTH_HEADER))
            .and_then(|h| h.value.as_str().strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?;
        self.state
            .store
            .user_for_token(token)?
            .ok_or(ApiError::Unauthorized)
    }
}

fn route_request(
    state: &AppState,
    ctx: &RequestContext,
    method: &Method,
    segments: &[&str],
) -> ApiResult<Reply> {
    use Method::{Delete, Get, Post, Put};

    match (method, segments) {
        (Get, ["auth", "me"]) => misc::me(ctx),

        (Get, ["projects"]) => projects::list(state, ctx),
        (Post, ["projects"]) => projects::create(state, ctx),
        (Get, ["projects", "stats"]) => projects::stats(state, ctx),
        (Put, ["projects", id]) => projects::update(state, ctx, id),
        (Delete, ["projects", id]) => projects::delete(state, ctx, id),
        (Get, ["projects", id, "actions"]) => projects::actions(state, ctx, id),

        (Get, ["tasks"]) => tasks::list(state, ctx),
        (Post, ["tasks"]) => tasks::create(state, ctx),
        (Post, ["tasks", "recalculate"]) => tasks::recalculate(state, ctx),
        (Put, ["tasks", id]) => tasks::update(state, ctx, id),
        (Delete, ["tasks", id]) => tasks::delete(state, ctx, id),

        (Get, ["timer", "actions"]) => timer::list(state, ctx),
        (Post, ["timer", "start"]) => timer::start(state, ctx),
        (Put, ["timer", "end", id]) => timer::end(state, ctx, id),
        (Put, ["timer", "note", id]) => timer::note(state, ctx, id),
        (Put, ["timer", "actions", id]) => timer::edit(state, ctx, id),
        (Put, ["timer", "actions", id, "task"]) => timer::move_to_task(state, ctx, id),
        (Post, ["timer", "habit"]) => timer::habit(state, ctx),
        (Post, ["timer", "cleanup"]) => timer::cleanup(state, ctx),
        (Delete, ["timer", "delete", id]) => timer::delete(state, ctx, id),

        (Get, ["reports", "export"]) => reports::export(state, ctx),
        (Get, ["reports", "views"]) => reports::list_views(state, ctx),
        (Post, ["reports", "views"]) => reports::create_view(state, ctx),
        (Post, ["reports", "views", "reset"]) => reports::reset_views(state, ctx),
        (Get, ["reports", "views", id]) => reports::get_view(state, ctx, id),
        (Delete, ["reports", "views", id]) => reports::delete_view(state, ctx, id),

        // Id-taking routes called without an id
        (Put | Delete, ["projects"] | ["tasks"] | ["reports", "views"])
        | (Put, ["timer", "end" | "note" | "actions"])
        | (Delete, ["timer", "delete"]) => Err(ApiError::validation("Resource id is required")),

        _ => Err(ApiError::not_found("Route not found")),
    }
}

fn json_content_type() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("static header is valid")
}

fn cors_headers() -> Vec<Header> {
    [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
        ("Access-Control-Allow-Headers", "Authorization, Content-Type"),
    ]
    .into_iter()
    .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
    .collect()
}

fn read_request_body(request: &mut Request, max_bytes: usize) -> ApiResult<String> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((max_bytes + 1) as u64);
    if let Err(e) = reader.read_to_string(&mut body) {
        error!("[donow:http] Failed to read body: {}", e);
        return Err(ApiError::validation("Request body could not be read"));
    }

    if body.len() > max_bytes {
        return Err(ApiError::PayloadTooLarge);
    }

    Ok(body)
}

fn respond_json(request: Request, status_code: u16, value: serde_json::Value) {
    let body = serde_json::to_string(&value)
        .unwrap_or_else(|_| "{\"success\":false,\"message\":\"serialize\"}".to_string());
    let mut response = Response::from_string(body)
        .with_status_code(status_code)
        .with_header(json_content_type());
    for header in cors_headers() {
        response.add_header(header);
    }
    let _ = request.respond(response);
}

fn respond_preflight(request: Request) {
    let mut response = Response::empty(204);
    for header in cors_headers() {
        response.add_header(header);
    }
    let _ = request.respond(response);
}

/// Stream an export as an attachment, then remove the temp file
fn respond_file(request: Request, file: ExportedFile) {
    let handle = match File::open(&file.path) {
        Ok(handle) => handle,
        Err(e) => {
            error!("[donow:export] Failed to open {}: {}", file.path.display(), e);
            respond_json(
                request,
                500,
                serde_json::json!({ "success": false, "message": "Export file missing" }),
            );
            return;
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    let mut response = Response::from_file(handle);
    let headers = [
        ("Content-Type", file.format.content_type().to_string()),
        ("Content-Disposition", disposition),
    ];
    for (name, value) in headers {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            response.add_header(header);
        }
    }
    for header in cors_headers() {
        response.add_header(header);
    }

    if let Err(e) = request.respond(response) {
        warn!("[donow:export] Failed to send {}: {}", file.file_name, e);
    }
    if let Err(e) = std::fs::remove_file(&file.path) {
        warn!("[donow:export] Failed to remove {}: {}", file.path.display(), e);
    } else {
        debug!("[donow:export] Removed {}", file.path.display());
    }
}
