//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: maps `(method, path)` pairs to
//! store operations or static serving, then finishes every response with
//! CORS headers and an access-log line.

use crate::config::AppState;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::{Body as _, Bytes, Incoming};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

use super::{api, static_files};

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();
    let is_head = method == Method::HEAD;

    let mut response = match (&method, uri.path()) {
        // Preflight gets a bare 204; the CORS headers land below
        (&Method::OPTIONS, _) => http::build_options_response(),

        (&Method::GET | &Method::HEAD, "/" | "/index.html") => {
            static_files::serve_index(&state, is_head).await
        }

        (&Method::GET, "/api/data") => api::read_records(uri.query(), &state).await,

        (&Method::POST, "/api/save") => {
            match check_body_size(&req, state.config.http.max_body_size) {
                Some(resp) => resp,
                None => api::save_record(req, &state).await,
            }
        }

        _ => http::build_404_response(),
    };

    if state.config.http.enable_cors {
        http::apply_cors(&mut response);
    }

    if state.config.logging.access_log {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        logger::log_access(
            &method,
            &uri,
            version,
            response.status().as_u16(),
            body_bytes,
        );
    }

    Ok(response)
}

/// Validate the Content-Length header and return 413 if it exceeds the cap
fn check_body_size(req: &Request<Incoming>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
