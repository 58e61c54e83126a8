//! Static front-end serving
//!
//! Only the index page is served from disk; everything else goes through
//! the record API.

use crate::config::AppState;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::sync::Arc;
use tokio::fs;

/// Serve the configured index file for `/` and `/index.html`.
pub async fn serve_index(state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    let index_file = &state.config.http.index_file;
    match fs::read(index_file).await {
        Ok(content) => {
            http::build_html_response(content, &state.config.http.server_name, is_head)
        }
        Err(e) => {
            logger::log_error(&format!("Failed to load {index_file}: {e}"));
            http::build_500_response("failed to load index page")
        }
    }
}
