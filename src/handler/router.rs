//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, dispatching and access logging.

use crate::config::{AppState, HealthConfig};
use crate::handler::api;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const CHAPTERS_PATH: &str = "/api/chapters";
const MATRIX_PATH: &str = "/api/matrix";

/// Routes served by the content API
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Status,
    Health,
    Chapters,
    /// Raw (still percent-encoded) filename segment
    Chapter(&'a str),
    Matrix,
    NotFound,
}

/// Resolve a request path to a route
pub fn match_route<'a>(path: &'a str, health: &HealthConfig) -> Route<'a> {
    if health.enabled && path == health.path {
        return Route::Health;
    }

    match path {
        "/" => Route::Status,
        CHAPTERS_PATH => Route::Chapters,
        MATRIX_PATH => Route::Matrix,
        _ => match path.strip_prefix(CHAPTERS_PATH).and_then(|p| p.strip_prefix('/')) {
            Some(name) if !name.is_empty() => Route::Chapter(name),
            _ => Route::NotFound,
        },
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read; only the head is kept past this point.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let is_head = parts.method == Method::HEAD;
    let http_config = &state.config.http;

    let response = match check_http_method(&parts.method, http_config.enable_cors) {
        Some(resp) => resp,
        None => match check_body_size(&parts, http_config.max_body_size) {
            Some(resp) => resp,
            None => route_request(&parts, &state).await,
        },
    };
    let response = http::finalize(response, http_config, is_head);

    if state.config.logging.access_log {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(req: &Parts, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers.get("content-length")?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

async fn route_request(req: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    let uri = &req.uri;
    match match_route(uri.path(), &state.config.routes.health) {
        Route::Status => api::status(),
        Route::Health => api::health(),
        Route::Chapters => api::list_chapters(state, wants_names_only(uri.query())).await,
        Route::Chapter(name) => api::get_chapter(state, name).await,
        Route::Matrix => api::get_matrix(state).await,
        Route::NotFound => http::build_404_response(),
    }
}

/// `?view=names` selects the bare filename listing
fn wants_names_only(query: Option<&str>) -> bool {
    query.is_some_and(|q| q.split('&').any(|pair| pair == "view=names"))
}

fn log_access(
    req: &Parts,
    resp: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: HeaderName| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = resp.status().as_u16();
    entry.body_bytes = resp
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
