//! Preview server for a generated site.
//!
//! Every request is answered from the site directory:
//!
//! | Request | File |
//! |---------|------|
//! | `/` | `index.html` |
//! | `/ai-tech` | `ai-tech.html` |
//! | `/news/latest_1.html` | `news/latest_1.html` |
//! | `/assets/style.css` | `assets/style.css` |
//!
//! Files are served by [`ServeDir`], which percent-decodes paths and refuses
//! anything that would leave the directory. Missing files get a 404 page,
//! unreadable ones a 500 page.

use axum::Router;
use axum::extract::Request;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::middleware::{map_request, map_response};
use axum::response::{IntoResponse, Response};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_PORT: u16 = 8080;

const HTML: &str = "text/html; charset=utf-8";
const NOT_FOUND_PAGE: &str = "<h1>404 - 页面未找到</h1>";
const SERVER_ERROR_PAGE: &str = "<h1>500 - 服务器错误</h1>";

/// `/ai-tech` becomes `/ai-tech.html`; paths that end in `/` or already have
/// an extension are left alone (`None`).
pub fn html_uri_for(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.is_empty() || Path::new(last).extension().is_some() {
        return None;
    }
    let rewritten = match uri.query() {
        Some(query) => format!("{path}.html?{query}"),
        None => format!("{path}.html"),
    };
    rewritten.parse().ok()
}

fn html_page(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, HTML)], body).into_response()
}

async fn with_html_extension(mut request: Request) -> Request {
    if let Some(uri) = html_uri_for(request.uri()) {
        debug!(from = %request.uri(), to = %uri, "Added .html extension");
        *request.uri_mut() = uri;
    }
    request
}

async fn finish_response(mut response: Response) -> Response {
    if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
        return html_page(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_PAGE);
    }
    let bare_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes() == b"text/html");
    if bare_html {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML));
    }
    response
}

async fn not_found(uri: Uri) -> Response {
    warn!(path = %uri.path(), "No such file");
    html_page(StatusCode::NOT_FOUND, NOT_FOUND_PAGE)
}

pub fn router(root: impl Into<PathBuf>) -> Router {
    let site = ServeDir::new(root.into()).not_found_service(not_found.into_service());
    Router::new()
        .fallback_service(site)
        .layer(map_response(finish_response))
        .layer(map_request(with_html_extension))
        .layer(TraceLayer::new_for_http())
}

/// Serve `root` on `host:port` until Ctrl+C.
#[instrument(level = "info", skip_all, fields(root = %root.display(), %host, port))]
pub async fn serve(root: &Path, host: &str, port: u16) -> Result<(), Box<dyn Error>> {
    if !tokio::fs::try_exists(root.join("index.html")).await? {
        warn!("No index.html found; run `generate` first");
    }

    let bind_addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Preview server running on http://{}", bind_addr);
    info!("   Home:     http://{}/", bind_addr);
    info!("   AI tech:  http://{}/ai-tech.html", bind_addr);
    info!("   Industry: http://{}/industry.html", bind_addr);

    axum::serve(listener, router(root))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Preview server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
        let response = app
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("news")).unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("ai-tech.html"), "<h1>tech</h1>").unwrap();
        std::fs::write(dir.path().join("news/latest_1.html"), "<h1>one</h1>").unwrap();
        std::fs::write(dir.path().join("assets/style.css"), "body{}").unwrap();
        std::fs::write(dir.path().join("data.xyz123"), "raw").unwrap();
        dir
    }

    #[test]
    fn test_html_uri_for() {
        let rewrite = |s: &str| html_uri_for(&s.parse().unwrap()).map(|u| u.to_string());
        assert_eq!(rewrite("/ai-tech").as_deref(), Some("/ai-tech.html"));
        assert_eq!(rewrite("/news/x?ref=home").as_deref(), Some("/news/x.html?ref=home"));
        assert_eq!(rewrite("/"), None);
        assert_eq!(rewrite("/news/"), None);
        assert_eq!(rewrite("/assets/style.css"), None);
    }

    #[tokio::test]
    async fn test_serves_index_and_extensionless_pages() {
        let dir = site();
        let (status, content_type, body) = get(router(dir.path()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, HTML);
        assert_eq!(body, b"<h1>home</h1>");

        let (status, content_type, body) = get(router(dir.path()), "/ai-tech").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, HTML);
        assert_eq!(body, b"<h1>tech</h1>");

        let (status, _, body) = get(router(dir.path()), "/news/latest%5F1.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>one</h1>");
    }

    #[tokio::test]
    async fn test_assets_get_their_content_type() {
        let dir = site();
        let (_, content_type, _) = get(router(dir.path()), "/assets/style.css").await;
        assert_eq!(content_type, "text/css");
        let (_, content_type, _) = get(router(dir.path()), "/data.xyz123").await;
        assert_eq!(content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_404_page() {
        let dir = site();
        let (status, content_type, body) = get(router(dir.path()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(content_type, HTML);
        assert_eq!(String::from_utf8(body).unwrap(), NOT_FOUND_PAGE);
    }

    #[tokio::test]
    async fn test_paths_outside_the_site_are_404() {
        let dir = site();
        for uri in ["/../etc/passwd", "/news/%2E%2E/%2E%2E/secret"] {
            let (status, _, body) = get(router(dir.path().join("news")), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(String::from_utf8(body).unwrap(), NOT_FOUND_PAGE);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_500_page() {
        let dir = site();
        // a symlink to itself fails to open with ELOOP
        let link = dir.path().join("loop.html");
        std::os::unix::fs::symlink(&link, &link).unwrap();
        let (status, content_type, body) = get(router(dir.path()), "/loop.html").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type, HTML);
        assert_eq!(String::from_utf8(body).unwrap(), SERVER_ERROR_PAGE);
    }
}
