// Logging helpers
// Plain stdout/stderr logging with timestamped access-log lines

use crate::config::Config;
use chrono::Local;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;
use std::path::Path;

pub fn log_server_start(addr: &SocketAddr, config: &Config, store_path: &Path) {
    println!("======================================");
    println!("Flat-file record server started");
    println!("Listening on: http://{addr}");
    println!("Log level: {}", config.logging.level);
    println!("Store file: {}", store_path.display());
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

/// Log one request/response pair in Common Log Format.
pub fn log_access(method: &Method, uri: &Uri, version: Version, status: u16, body_bytes: u64) {
    println!("{}", access_line(method, uri, version, status, body_bytes));
}

fn access_line(
    method: &Method,
    uri: &Uri,
    version: Version,
    status: u16,
    body_bytes: u64,
) -> String {
    let http_version = if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    };
    format!(
        "- - - [{}] \"{} {} HTTP/{}\" {} {}",
        Local::now().format("%d/%b/%Y:%H:%M:%S %z"),
        method,
        uri,
        http_version,
        status,
        body_bytes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_line_contains_request_and_status() {
        let uri: Uri = "/api/data?date=2025-06-01&type=orders".parse().unwrap();
        let line = access_line(&Method::GET, &uri, Version::HTTP_11, 200, 42);
        assert!(line.contains("\"GET /api/data?date=2025-06-01&type=orders HTTP/1.1\""));
        assert!(line.ends_with("200 42"));
    }
}
