//! HTTP access log written through `slog`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use slog::{o, Discard, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, PlainDecorator, TermDecorator};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthUser;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub async_buffer_size: usize,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = {
        let builder = TermDecorator::new();
        let builder = if config.use_color {
            builder.force_color()
        } else {
            builder
        };
        builder.build()
    };

    let drain = FullFormat::new(decorator).build().fuse();
    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION"), "component" => "access"))
}

/// Logger that drops everything; used by tests and when access logs are off.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Logger writing plain lines to an in-memory buffer.
pub fn buffer_logger<W: std::io::Write + Send + 'static>(sink: W) -> Logger {
    let decorator = PlainDecorator::new(sink);
    let drain = std::sync::Mutex::new(FullFormat::new(decorator).build()).fuse();
    Logger::root(drain, o!())
}

#[derive(Clone)]
pub struct AccessLog {
    logger: Logger,
}

impl AccessLog {
    pub fn new(logger: Logger) -> Arc<Self> {
        Arc::new(Self { logger })
    }
}

/// One line per request: method, path, status, latency, request id and,
/// for authenticated routes, the user.
pub async fn access_log_middleware(
    State(log): State<Arc<AccessLog>>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = crate::tracing::current_request_id()
        .map(|rid| rid.as_str().to_string())
        .unwrap_or_default();

    let response = next.run(request).await;
    let user = response
        .extensions()
        .get::<AuthUser>()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "-".to_string());

    slog::info!(
        &log.logger,
        "HTTP request handled";
        "method" => method,
        "path" => path,
        "status" => response.status().as_u16(),
        "duration_ms" => start_time.elapsed().as_millis() as u64,
        "request_id" => request_id,
        "user" => user,
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn access_line_has_method_path_and_status() {
        let buf = SharedBuf::default();
        let log = AccessLog::new(buffer_logger(buf.clone()));
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn_with_state(log, access_log_middleware));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let line = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(line.contains("HTTP request handled"));
        assert!(line.contains("method: GET"));
        assert!(line.contains("path: /ping"));
        assert!(line.contains("status: 200"));
        assert!(line.contains("user: -"));
    }
}
