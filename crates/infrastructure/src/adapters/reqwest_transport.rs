//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port using the reqwest library.
//! It resolves request paths against the configured API base URL and applies
//! one uniform deadline to every call, the refresh call included.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use agrisky_application::ports::{HttpTransport, TransportError, TransportResponse};
use agrisky_domain::{ApiRequest, Headers, HttpMethod};
use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::config::ClientConfig;

/// HTTP transport implementation using reqwest.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url` with the given deadline.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "AgriSky/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        Self::build(base_url, timeout, &default_user_agent())
    }

    /// Creates a transport from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// created.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let base_url = config
            .base_url()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        Self::build(base_url, config.timeout(), &config.user_agent)
    }

    fn build(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Appends `path` to the base URL, keeping any base path prefix.
    fn resolve_url(&self, path: &str) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = format!("{base}/{}", path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(format!("{e}: {joined}")))
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let host = error
                .url()
                .and_then(|u| u.host_str().map(String::from))
                .unwrap_or_else(|| "unknown".to_string());
            return TransportError::ConnectionFailed(format!("{host}: {error}"));
        }

        TransportError::Other(error.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + '_>> {
        // Clone what we need to move into the async block
        let method = request.method;
        let path = request.path.clone();
        let headers = request.headers.clone();
        let body = request.body.clone();

        Box::pin(async move {
            let url = self.resolve_url(&path)?;
            let timeout_ms = self.timeout_ms();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url)
                .timeout(self.timeout);

            for (name, value) in headers.iter() {
                builder = builder.header(name, value);
            }

            if let Some(body) = &body {
                builder = builder.json(body);
            } else if !headers.contains("content-type") {
                builder = builder.header("Content-Type", "application/json");
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: Headers = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Other(format!("Failed to read body: {e}")))?
                .to_vec();

            debug!(%method, %path, status, bytes = body.len(), "response received");

            Ok(TransportResponse {
                status,
                headers: response_headers,
                body,
            })
        })
    }
}

fn default_user_agent() -> String {
    format!("AgriSky/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use agrisky_domain::AUTHORIZATION;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    /// Serves one canned HTTP/1.1 response and returns the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0_u8; 4096];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).to_string()
        });
        (Url::parse(&format!("http://{addr}")).unwrap(), handle)
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Post), Method::POST);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Put), Method::PUT);
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_resolve_url_keeps_base_prefix() {
        let t = transport("https://api.example.com/gateway/");
        assert_eq!(
            t.resolve_url("/api/task").unwrap().as_str(),
            "https://api.example.com/gateway/api/task"
        );

        let t = transport("https://api.example.com");
        assert_eq!(
            t.resolve_url("/api/auth/refresh").unwrap().as_str(),
            "https://api.example.com/api/auth/refresh"
        );
    }

    #[tokio::test]
    async fn test_sends_headers_and_reports_status_raw() {
        let (base, server) = serve_once("401 UNAUTHORIZED", r#"{"msg":"Token has expired"}"#).await;
        let t = ReqwestTransport::new(base, Duration::from_secs(5)).unwrap();

        let request = ApiRequest::get("/api/task").with_header(AUTHORIZATION, "Bearer A1");
        let response = t.execute(&request).await.unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(response.body_json().unwrap(), json!({"msg": "Token has expired"}));
        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /api/task http/1.1"));
        assert!(raw.contains("authorization: bearer a1"));
    }

    #[tokio::test]
    async fn test_posts_json_body() {
        let (base, server) = serve_once("200 OK", r#"{"code":200,"data":null}"#).await;
        let t = ReqwestTransport::new(base, Duration::from_secs(5)).unwrap();

        let request = ApiRequest::post("/api/auth/login", json!({"username": "alice"}));
        let response = t.execute(&request).await.unwrap();

        assert!(response.is_success());
        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("post /api/auth/login"));
        assert!(raw.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let t = ReqwestTransport::new(
            Url::parse(&format!("http://{addr}")).unwrap(),
            Duration::from_millis(100),
        )
        .unwrap();
        let err = t.execute(&ApiRequest::get("/api/task")).await.unwrap_err();

        assert_eq!(err, TransportError::Timeout { timeout_ms: 100 });
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let t = ReqwestTransport::new(
            Url::parse(&format!("http://{addr}")).unwrap(),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = t.execute(&ApiRequest::get("/api/task")).await.unwrap_err();

        assert!(matches!(err, TransportError::ConnectionFailed(_)));
    }
}
