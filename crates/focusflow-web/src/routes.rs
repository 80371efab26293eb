use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::handlers;
use crate::state::AppState;

/// CORS for the reader frontends in `origins`, with credentials allowed.
///
/// Methods and headers are mirrored from the preflight request, since a
/// credentialed response may not use `*`.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                anyhow::bail!("wildcard origin cannot be combined with credentials");
            }
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("invalid origin {origin:?}: {e}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub fn build_router(state: Arc<AppState>, cors: CorsLayer, body_limit: usize) -> Router {
    let api = Router::new().route(
        "/documents/upload",
        post(handlers::upload::upload_document),
    );

    Router::new()
        .route("/", get(handlers::health::health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use focusflow_core::mock::{MockBackend, MockResponse};
    use focusflow_core::{Chunker, ExtractOnly, PageRecord, PdfBackend, TextChunk};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const BOUNDARY: &str = "focusflow-test-boundary";
    const PDF: &[u8] = b"%PDF-1.4\n%mock\n";
    const ORIGIN: &str = "http://localhost:5173";

    /// One chunk per page; counts how often the handler asks for chunks.
    #[derive(Default)]
    struct PerPageChunker {
        calls: AtomicUsize,
    }

    impl Chunker for PerPageChunker {
        fn chunk(&self, pages: &[PageRecord]) -> Vec<TextChunk> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            pages
                .iter()
                .zip(1u32..)
                .map(|(p, id)| {
                    TextChunk::new(id, format!("Page {}", p.page), "", &p.text, p.page, p.page)
                        .unwrap()
                })
                .collect()
        }
    }

    fn router_with(backend: Arc<MockBackend>, timeout: Option<Duration>) -> Router {
        router_with_chunker(backend, timeout, Arc::new(ExtractOnly))
    }

    fn router_with_chunker(
        backend: Arc<MockBackend>,
        timeout: Option<Duration>,
        chunker: Arc<dyn Chunker>,
    ) -> Router {
        let backend: Arc<dyn PdfBackend> = backend;
        let state = Arc::new(AppState {
            backend,
            chunker,
            extraction_timeout: timeout,
        });
        let cors = cors_layer(&[ORIGIN.to_string()]).unwrap();
        build_router(state, cors, 1024 * 1024)
    }

    fn pages_backend(pages: &[&str]) -> Arc<MockBackend> {
        Arc::new(MockBackend::new(MockResponse::Pages(
            pages.iter().map(|p| p.to_string()).collect(),
        )))
    }

    fn multipart_part(
        name: &str,
        filename: Option<&str>,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Vec<u8> {
        let mut part = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"");
        if let Some(filename) = filename {
            part.push_str(&format!("; filename=\"{filename}\""));
        }
        part.push_str("\r\n");
        if let Some(ct) = content_type {
            part.push_str(&format!("Content-Type: {ct}\r\n"));
        }
        part.push_str("\r\n");
        let mut bytes = part.into_bytes();
        bytes.extend_from_slice(data);
        bytes.extend_from_slice(b"\r\n");
        bytes
    }

    fn upload_request(parts: Vec<Vec<u8>>) -> Request<Body> {
        let mut body: Vec<u8> = parts.concat();
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri("/api/documents/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn pdf_upload(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        upload_request(vec![multipart_part(
            "file",
            Some(filename),
            Some(content_type),
            data,
        )])
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_check() {
        let app = router_with(pages_backend(&[]), None);
        let req = Request::get("/").body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "running", "message": "FocusFlow Agent is active"})
        );
    }

    #[tokio::test]
    async fn upload_returns_unchunked_document() {
        let backend = pages_backend(&["Intro\ntext\n", "\n", "Closing page\n"]);
        let app = router_with(backend.clone(), None);

        let (status, body) = send(app, pdf_upload("paper.pdf", "application/pdf", PDF)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "filename": "paper.pdf",
                "total_chunks": 0,
                "chunks": [],
                "raw": [
                    {"page": 1, "text": "Intro text"},
                    {"page": 3, "text": "Closing page"}
                ]
            })
        );
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn upload_runs_configured_chunker() {
        let chunker = Arc::new(PerPageChunker::default());
        let backend = pages_backend(&["Intro\n", "", "Methods\n"]);
        let app = router_with_chunker(backend, None, chunker.clone());

        let (status, body) = send(app, pdf_upload("paper.pdf", "application/pdf", PDF)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chunker.calls.load(Ordering::SeqCst), 1);
        assert_eq!(body["total_chunks"], 2);
        assert_eq!(body["chunks"][0]["title"], "Page 1");
        assert_eq!(body["chunks"][1]["page_start"], 3);
        assert_eq!(body["chunks"][1]["content"], "Methods");
        assert_eq!(body["raw"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn rejected_upload_never_reaches_chunker() {
        let chunker = Arc::new(PerPageChunker::default());
        let app = router_with_chunker(pages_backend(&["x"]), None, chunker.clone());

        let (status, _) = send(app, pdf_upload("notes.txt", "text/plain", PDF)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(chunker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_content_type_rejected_before_extraction() {
        let backend = pages_backend(&["would be text"]);
        let app = router_with(backend.clone(), None);

        let (status, body) = send(app, pdf_upload("paper.pdf", "text/plain", PDF)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "File must be a PDF"}));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_content_type_rejected() {
        let backend = pages_backend(&["x"]);
        let app = router_with(backend.clone(), None);
        let req = upload_request(vec![multipart_part("file", Some("paper.pdf"), None, PDF)]);

        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "File must be a PDF");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_file_field_rejected() {
        let backend = pages_backend(&["x"]);
        let app = router_with(backend.clone(), None);
        let req = upload_request(vec![multipart_part("note", None, None, b"hello")]);

        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No file uploaded");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn extra_fields_are_ignored() {
        let app = router_with(pages_backend(&["only page"]), None);
        let req = upload_request(vec![
            multipart_part("note", None, None, b"hello"),
            multipart_part("file", Some("a.pdf"), Some("application/pdf"), PDF),
        ]);

        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw"], json!([{"page": 1, "text": "only page"}]));
    }

    #[tokio::test]
    async fn truncated_extra_field_is_bad_request() {
        let backend = pages_backend(&["x"]);
        let app = router_with(backend.clone(), None);
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhel"
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/documents/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_filename_uses_fallback() {
        let app = router_with(pages_backend(&["text"]), None);
        let (status, body) = send(app, pdf_upload("", "application/pdf", PDF)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filename"], "unknown_document.pdf");
    }

    #[tokio::test]
    async fn blank_document_is_empty_success() {
        let app = router_with(pages_backend(&["", " \n "]), None);
        let (status, body) = send(app, pdf_upload("blank.pdf", "application/pdf", PDF)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw"], json!([]));
        assert_eq!(body["total_chunks"], 0);
    }

    #[tokio::test]
    async fn empty_pdf_body_is_parse_error() {
        let backend = pages_backend(&["x"]);
        let app = router_with(backend.clone(), None);
        let (status, body) = send(app, pdf_upload("empty.pdf", "application/pdf", b"")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "Error processing PDF"}));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn backend_failure_does_not_leak_cause() {
        let backend = Arc::new(MockBackend::new(MockResponse::Error(
            "object 12 0 R missing at /tmp/secret".into(),
        )));
        let app = router_with(backend, None);
        let (status, body) = send(app, pdf_upload("bad.pdf", "application/pdf", PDF)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "Error processing PDF"}));
    }

    #[tokio::test]
    async fn encrypted_pdf_is_parse_error() {
        let backend = Arc::new(MockBackend::new(MockResponse::Encrypted));
        let app = router_with(backend, None);
        let (status, body) = send(app, pdf_upload("locked.pdf", "application/pdf", PDF)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Error processing PDF");
    }

    #[tokio::test]
    async fn slow_extraction_times_out() {
        let backend = Arc::new(
            MockBackend::new(MockResponse::Pages(vec!["late".into()]))
                .with_delay(Duration::from_millis(300)),
        );
        let app = router_with(backend, Some(Duration::from_millis(20)));
        let (status, body) = send(app, pdf_upload("slow.pdf", "application/pdf", PDF)).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["detail"], "PDF processing timed out");
    }

    #[tokio::test]
    async fn oversized_upload_rejected() {
        let app = router_with(pages_backend(&["x"]), None);
        let big = vec![b'a'; 2 * 1024 * 1024];
        let resp = app
            .oneshot(pdf_upload("big.pdf", "application/pdf", &big))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin() {
        let app = router_with(pages_backend(&[]), None);
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/documents/upload")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            ORIGIN
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn cors_ignores_unknown_origin() {
        let app = router_with(pages_backend(&[]), None);
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/documents/upload")
            .header(header::ORIGIN, "http://evil.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[test]
    fn wildcard_origin_rejected() {
        assert!(cors_layer(&["*".to_string()]).is_err());
        assert!(cors_layer(&["http://ok.example".to_string()]).is_ok());
    }
}
