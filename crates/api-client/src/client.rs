use std::time::Duration;

use reqwest::multipart;
use tracing::debug;

use ledgerchat_api::*;

use crate::error::{error_detail, ApiError};

/// Typed HTTP client for the ledgerchat API.
///
/// One method per endpoint. The credential never travels as a header; the
/// only authenticated-ish call is `set_api_key`, which submits the key as a
/// form field the way the backend expects.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        parse_response(resp).await
    }

    // ── Suggestions ───────────────────────────────────────────────────────

    pub async fn query_suggestions(&self) -> Result<Vec<String>, ApiError> {
        let resp = self
            .client
            .get(self.url("/query-suggestions"))
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Sessions ──────────────────────────────────────────────────────────

    pub async fn list_sessions(&self) -> Result<Vec<String>, ApiError> {
        let resp = self.client.get(self.url("/sessions")).send().await?;
        parse_response(resp).await
    }

    pub async fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let resp = self
            .client
            .get(self.url(&format!("/messages/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn transactions(&self, session_id: &str) -> Result<Vec<Transaction>, ApiError> {
        let resp = self
            .client
            .get(self.url(&format!("/transactions/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<DeleteResponse, ApiError> {
        let resp = self
            .client
            .delete(self.url(&format!("/sessions/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn csv_format(&self, session_id: &str) -> Result<FormatInfo, ApiError> {
        let resp = self
            .client
            .get(self.url(&format!("/format/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Analysis ──────────────────────────────────────────────────────────

    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("/analyze"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Credential / upload ───────────────────────────────────────────────

    /// Submit the OpenAI key as the `api_key` form field. The key is not
    /// stored client-side; callers persist only a display hint.
    pub async fn set_api_key(&self, api_key: &str) -> Result<StatusResponse, ApiError> {
        let form = multipart::Form::new().text("api_key", api_key.to_string());
        let resp = self
            .client
            .post(self.url("/set-api-key"))
            .multipart(form)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// Upload a CSV as the `file` multipart field.
    pub async fn upload_csv(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        parse_response(resp).await
    }
}

/// Parse an HTTP response: deserialize the body on 2xx, otherwise surface
/// the backend's `detail` message (or a generic status string).
async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let detail = error_detail(status, &body);
        debug!(%status, %detail, "API request failed");
        return Err(ApiError::Status { status, detail });
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client_for(addr: std::net::SocketAddr) -> ApiClient {
        ApiClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap()
    }

    /// Serve exactly one canned HTTP response, then close.
    async fn serve_once(status_line: &'static str, body: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Drain the request head before answering.
            let mut buf = vec![0u8; 4096];
            let mut seen = Vec::new();
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
                if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
        addr
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client =
            ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/health"), "http://localhost:8000/health");
    }

    #[tokio::test]
    async fn health_parses_a_2xx_body() {
        let addr = serve_once(
            "200 OK",
            r#"{"status":"healthy","timestamp":"t","api_version":"1.0.0","sessions_active":2}"#,
        )
        .await;
        let health = client_for(addr).health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.sessions_active, 2);
    }

    #[tokio::test]
    async fn non_2xx_surfaces_the_detail_field() {
        let addr = serve_once("404 Not Found", r#"{"detail":"Session not found"}"#).await;
        let err = client_for(addr)
            .transactions("nope")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Session not found");
        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn csv_format_parses_the_format_info() {
        let addr = serve_once("200 OK", r#"{"format":"desjardins","transaction_count":40}"#).await;
        let info = client_for(addr).csv_format("abc").await.unwrap();
        assert_eq!(info.format, "desjardins");
        assert_eq!(info.transaction_count, 40);
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(addr).list_sessions().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.user_message().contains("Cannot connect"));
    }
}
