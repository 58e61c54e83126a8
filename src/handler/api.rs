//! JSON record API handlers
//!
//! Translates the wire format of the two API routes (query strings, JSON
//! bodies, response envelopes) into store operations.

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::store::{self, Store, StoreError};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Body of a `POST /api/save` request
#[derive(Debug, Deserialize)]
struct SavePayload {
    date: String,
    #[serde(rename = "type")]
    kind: String,
    data: Value,
}

/// Envelope returned by the save route
#[derive(Debug, Serialize)]
struct SaveReply {
    success: bool,
    message: String,
}

impl SaveReply {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

/// Handle `GET /api/data?date=D&type=T`.
pub async fn read_records(query: Option<&str>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let params = parse_query(query.unwrap_or(""));
    // Absent parameters become empty strings; the composed key then simply
    // misses and the caller gets an empty array.
    let date = params.get("date").map_or("", String::as_str);
    let kind = params.get("type").map_or("", String::as_str);
    fetch_records(&store::compose_key(date, kind), &state.store).await
}

async fn fetch_records(key: &str, store: &Store) -> Response<Full<Bytes>> {
    match store.read(key).await {
        Ok(records) => http::build_json_response(StatusCode::OK, &records),
        Err(err @ StoreError::Corrupt(_)) => {
            logger::log_error(&format!("Read of key '{key}' failed: {err}"));
            http::build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &serde_json::json!({"error": "data store is corrupted"}),
            )
        }
        Err(err) => {
            logger::log_error(&format!("Read of key '{key}' failed: {err}"));
            http::build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &serde_json::json!({"error": "failed to read data store"}),
            )
        }
    }
}

/// Handle `POST /api/save`.
///
/// The body streams in as chunks; it is accumulated in full before any
/// parse is attempted.
pub async fn save_record(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return http::build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &SaveReply::failure("failed to read request body"),
            );
        }
    };
    save_from_bytes(&body, &state.store).await
}

async fn save_from_bytes(body: &[u8], store: &Store) -> Response<Full<Bytes>> {
    let payload: SavePayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!("Rejecting save request: {e}"));
            return http::build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &SaveReply::failure("invalid save payload"),
            );
        }
    };

    let key = store::compose_key(&payload.date, &payload.kind);
    match store.write(&key, payload.data).await {
        Ok(()) => http::build_json_response(StatusCode::OK, &SaveReply::ok("record saved")),
        Err(err) => {
            logger::log_error(&format!("Write of key '{key}' failed: {err}"));
            http::build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &SaveReply::failure("failed to persist record"),
            )
        }
    }
}

/// Parse a query string into key-value pairs.
fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((
                urlencoding::decode(key).unwrap_or_default().to_string(),
                urlencoding::decode(value).unwrap_or_default().to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> Store {
        let store = Store::new(dir.path().join("database.json"));
        store.initialize().unwrap();
        store
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_parse_query_splits_pairs() {
        let params = parse_query("date=2025-06-01&type=orders");
        assert_eq!(params.get("date").unwrap(), "2025-06-01");
        assert_eq!(params.get("type").unwrap(), "orders");
    }

    #[test]
    fn test_parse_query_decodes_percent_escapes() {
        let params = parse_query("type=daily%20sales");
        assert_eq!(params.get("type").unwrap(), "daily sales");
    }

    #[test]
    fn test_parse_query_handles_empty_and_valueless_pairs() {
        let params = parse_query("");
        assert!(params.is_empty());

        let params = parse_query("date&type=x");
        assert_eq!(params.get("date").unwrap(), "");
        assert_eq!(params.get("type").unwrap(), "x");
    }

    #[test]
    fn test_save_payload_requires_all_fields() {
        assert!(serde_json::from_str::<SavePayload>(r#"{"date":"d"}"#).is_err());
        assert!(serde_json::from_str::<SavePayload>(r#"{"date":"d","type":"t"}"#).is_err());
    }

    #[test]
    fn test_save_payload_maps_type_field() {
        let payload: SavePayload =
            serde_json::from_str(r#"{"date":"d","type":"t","data":[1]}"#).unwrap();
        assert_eq!(payload.kind, "t");
        assert_eq!(payload.data, json!([1]));
    }

    #[tokio::test]
    async fn test_save_then_fetch_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let body = br#"{"date":"2025-06-01","type":"orders","data":[{"id":1}]}"#;
        let resp = save_from_bytes(body, &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains(r#""success":true"#));

        let resp = fetch_records("2025-06-01_orders", &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let records: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(records, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_fresh_store_fetch_returns_empty_array() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let resp = fetch_records("x_y", &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "[]");
    }

    #[tokio::test]
    async fn test_second_save_replaces_first() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        save_from_bytes(br#"{"date":"d","type":"t","data":[1,2]}"#, &store).await;
        save_from_bytes(br#"{"date":"d","type":"t","data":[3]}"#, &store).await;

        let resp = fetch_records("d_t", &store).await;
        let records: Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(records, json!([3]));
    }

    #[tokio::test]
    async fn test_malformed_body_rejected_and_document_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let before = std::fs::read_to_string(store.path()).unwrap();

        let resp = save_from_bytes(b"this is not json", &store).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(resp).await.contains(r#""success":false"#));

        let after = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_with_failure_envelope() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let resp = save_from_bytes(br#"{"date":"d","data":[1]}"#, &store).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(resp).await.contains(r#""success":false"#));
    }

    #[tokio::test]
    async fn test_corrupt_store_fetch_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("database.json"));
        std::fs::write(store.path(), "{broken").unwrap();

        let resp = fetch_records("d_t", &store).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(resp).await.contains("corrupted"));
    }
}
