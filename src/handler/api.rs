//! Content API handlers
//!
//! Each handler maps one route onto a [`ContentStore`](crate::content::ContentStore)
//! operation and converts the outcome into a JSON response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::config::AppState;
use crate::error::ContentError;
use crate::http;
use crate::logger;

pub const STATUS_MESSAGE: &str = "Matrix Dashboard Backend Running";

#[derive(Serialize)]
struct ChapterNames {
    chapters: Vec<String>,
}

/// `GET /`
pub fn status() -> Response<Full<Bytes>> {
    http::json_response(StatusCode::OK, &json!({ "status": STATUS_MESSAGE }))
}

/// Liveness probe
pub fn health() -> Response<Full<Bytes>> {
    http::json_response(StatusCode::OK, &json!({ "status": "ok" }))
}

/// `GET /api/chapters`, or the bare filename listing with `?view=names`
pub async fn list_chapters(state: &AppState, names_only: bool) -> Response<Full<Bytes>> {
    if names_only {
        return match state.store.list_chapter_names().await {
            Ok(chapters) => http::json_response(StatusCode::OK, &ChapterNames { chapters }),
            Err(e) => failure(&e),
        };
    }

    let result = state
        .store
        .list_chapters(|filename, err| {
            logger::log_warning(&format!("Skipping chapter '{filename}': {err}"));
        })
        .await;

    match result {
        Ok(chapters) => http::json_response(StatusCode::OK, &chapters),
        Err(e) => failure(&e),
    }
}

/// `GET /api/chapters/{filename}`; `raw_name` is the undecoded path segment
pub async fn get_chapter(state: &AppState, raw_name: &str) -> Response<Full<Bytes>> {
    let filename = match urlencoding::decode(raw_name) {
        Ok(name) => name,
        Err(_) => {
            return failure(&ContentError::BadRequest(
                "Filename is not valid UTF-8".to_string(),
            ))
        }
    };

    match state.store.read_chapter(&filename).await {
        Ok(chapter) => http::json_response(StatusCode::OK, &chapter),
        Err(e) => failure(&e),
    }
}

/// `GET /api/matrix`
pub async fn get_matrix(state: &AppState) -> Response<Full<Bytes>> {
    match state.store.read_matrix().await {
        Ok(matrix) => http::json_response(StatusCode::OK, &matrix),
        Err(e) => failure(&e),
    }
}

fn failure(err: &ContentError) -> Response<Full<Bytes>> {
    match err {
        ContentError::Server(_) => logger::log_error(&err.to_string()),
        ContentError::BadRequest(_) => logger::log_warning(&format!("Rejected request: {err}")),
        ContentError::NotFound(_) => logger::log_debug(&err.to_string()),
    }
    http::content_error_response(err)
}
