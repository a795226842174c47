//! HTTP response building module
//!
//! JSON response builders shared by all routes. Every response goes through
//! [`finalize`], which stamps the `Server` and CORS headers.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::config::HttpConfig;
use crate::error::ContentError;
use crate::logger;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialize `body` into a JSON response
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(data) => build_json(status, Bytes::from(data)),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            build_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"error":"Internal server error"}"#),
            )
        }
    }
}

/// `{"error": message}` with the given status
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &json!({ "error": message }))
}

/// Convert a content error into its JSON error response
pub fn content_error_response(err: &ContentError) -> Response<Full<Bytes>> {
    error_response(err.status(), &err.to_string())
}

pub fn build_404_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    resp.headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

pub fn build_413_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Add server and CORS headers, and drop the body for HEAD requests
pub fn finalize(
    mut resp: Response<Full<Bytes>>,
    http: &HttpConfig,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let headers = resp.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&http.server_name) {
        headers.insert(SERVER, value);
    }
    if http.enable_cors {
        match HeaderValue::from_str(&http.cors_allow_origin) {
            Ok(value) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
            Err(e) => logger::log_warning(&format!(
                "Invalid CORS origin '{}': {e}",
                http.cors_allow_origin
            )),
        }
    }

    if is_head {
        let (parts, _) = resp.into_parts();
        return Response::from_parts(parts, Full::new(Bytes::new()));
    }
    resp
}

fn build_json(status: StatusCode, data: Bytes) -> Response<Full<Bytes>> {
    let len = data.len();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header("Content-Length", len)
        .body(Full::new(data))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn http_config(enable_cors: bool) -> HttpConfig {
        HttpConfig {
            server_name: "test/1.0".to_string(),
            enable_cors,
            cors_allow_origin: "*".to_string(),
            max_body_size: 1024,
        }
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let resp = json_response(StatusCode::OK, &json!({"a": 1}));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(body_string(resp).await, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_content_error_response() {
        let resp = content_error_response(&ContentError::NotFound("Matrix file not found".into()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, r#"{"error":"Matrix file not found"}"#);
    }

    #[test]
    fn test_405_has_allow() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], ALLOWED_METHODS);
    }

    #[test]
    fn test_options_response() {
        let resp = build_options_response(true);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Methods"], ALLOWED_METHODS);

        let resp = build_options_response(false);
        assert!(resp.headers().get("Access-Control-Allow-Methods").is_none());
    }

    #[tokio::test]
    async fn test_finalize_adds_headers() {
        let resp = finalize(json_response(StatusCode::OK, &json!([])), &http_config(true), false);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(resp.headers()[SERVER], "test/1.0");
        assert_eq!(body_string(resp).await, "[]");
    }

    #[tokio::test]
    async fn test_finalize_head_and_no_cors() {
        let resp = finalize(json_response(StatusCode::OK, &json!({"a": 1})), &http_config(false), true);
        assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(resp.headers()["Content-Length"], "7");
        assert_eq!(body_string(resp).await, "");
    }
}
