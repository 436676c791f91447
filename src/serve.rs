//! Static file server for the output directory.
//!
//! A thin `tiny_http` loop: exact file hits are served with a guessed
//! content type, directories fall back to their `index.html`, everything
//! else is a 404. The server owns no build state and only reads whatever
//! the pipeline last wrote, so a request racing a rebuild may observe a
//! half-written file; that is accepted for a development server.
//!
//! The loop blocks on `incoming_requests` until `Server::unblock` is
//! called from a signal handler or the process exits.

use crate::log;
use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Bind the server on all interfaces at `port`.
pub fn bind(port: u16) -> Result<Server> {
    Server::http(("0.0.0.0", port))
        .map_err(|err| anyhow!("Failed to bind port {port}: {err}"))
}

/// Handle requests until the server is unblocked.
pub fn serve(server: &Server, root: &Path) -> Result<()> {
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, root) {
            log!("serve"; "request error: {err:#}");
        }
    }
    Ok(())
}

// ============================================================================
// Request Handling
// ============================================================================

/// Resolution order: exact file → directory `index.html` → 404.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string before resolving the path
    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/');
    let local_path = root.join(request_path);

    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }
    }

    serve_not_found(request)
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        std::io::Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// `.wasm` is pinned explicitly so embedded interactive content loads;
/// other unknown extensions fall back to `application/octet-stream`.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        Some("wasm") => "application/wasm",

        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        _ => "application/octet-stream",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_guess_content_type() {
        let guess = |name: &str| guess_content_type(&PathBuf::from(name));
        assert_eq!(guess("index.html"), "text/html; charset=utf-8");
        assert_eq!(guess("a.css"), "text/css; charset=utf-8");
        assert_eq!(guess("presentation.js"), "application/javascript; charset=utf-8");
        assert_eq!(guess("cover.jpg"), "image/jpeg");
        assert_eq!(guess("blob.bin"), "application/octet-stream");
        assert_eq!(guess("noext"), "application/octet-stream");
    }

    #[test]
    fn test_wasm_content_type_override() {
        assert_eq!(
            guess_content_type(&PathBuf::from("demo.wasm")),
            "application/wasm"
        );
    }

    #[test]
    fn test_bind_rejects_busy_port() {
        let first = bind(0);
        assert!(first.is_ok());
        // Port 0 picks a free port; binding it again must fail
        if let Ok(server) = &first {
            let port = server.server_addr().to_ip().unwrap().port();
            assert!(bind(port).is_err());
        }
    }
}
