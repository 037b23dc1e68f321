//! Judge0 HTTP client
//!
//! Every call disables base64 encoding and is bounded by the configured
//! request timeout; timeouts and connection failures surface as
//! `RelayError::Unavailable`.

use async_trait::async_trait;
use judge_relay_common::config::Config;
use judge_relay_common::types::{RawSubmission, Submission};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::backend::{ExecutionBackend, LanguageDescriptor, StatusDescriptor};
use crate::error::{RelayError, RelayResult};

const AUTH_HEADER: &str = "x-auth-token";

#[derive(Serialize)]
struct BatchRequest<'a> {
    submissions: &'a [Submission],
}

/// Judge0 has returned both shapes depending on version.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchResponse {
    List(Vec<RawSubmission>),
    Envelope { submissions: Vec<RawSubmission> },
}

impl BatchResponse {
    fn into_submissions(self) -> Vec<RawSubmission> {
        match self {
            BatchResponse::List(items) | BatchResponse::Envelope { submissions: items } => items,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Judge0Client {
    base_url: String,
    http: reqwest::Client,
}

impl Judge0Client {
    pub fn new(config: &Config) -> RelayResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.judge0_auth_token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| RelayError::unavailable("configure HTTP client", e))?;
            headers.insert(AUTH_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("judge-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| RelayError::unavailable("configure HTTP client", e))?;

        let base_url = config.judge0_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| RelayError::unavailable("configure HTTP client", e))?;
        if parsed.cannot_be_a_base() {
            return Err(RelayError::unavailable(
                "configure HTTP client",
                format!("backend URL {base_url} cannot carry a path"),
            ));
        }

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/submissions/<token>` with the token escaped as a single path segment
    fn submission_url(&self, operation: &'static str, token: &str) -> RelayResult<Url> {
        let mut url = Url::parse(&self.url("/submissions"))
            .map_err(|e| RelayError::unavailable(operation, e))?;
        url.path_segments_mut()
            .map_err(|_| RelayError::unavailable(operation, "backend URL cannot carry a path"))?
            .push(token);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> RelayResult<T> {
        let response = request.send().await.map_err(|e| {
            error!(operation, error = %e, "Backend request failed");
            RelayError::unavailable(operation, e)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::unavailable(operation, e))?;

        debug!(operation, status = status.as_u16(), bytes = body.len(), "Backend responded");

        if !status.is_success() {
            let message = error_message(&body, status);
            error!(operation, status = status.as_u16(), message = %message, "Backend reported failure");
            return Err(RelayError::backend(operation, Some(status.as_u16()), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            RelayError::backend(
                operation,
                Some(status.as_u16()),
                format!("malformed backend response: {e}"),
            )
        })
    }
}

/// Best human-readable message from an error body
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
        if value.is_object() {
            return value.to_string();
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[async_trait]
impl ExecutionBackend for Judge0Client {
    async fn submit(&self, submission: &Submission, wait: bool) -> RelayResult<RawSubmission> {
        let request = self
            .http
            .post(self.url("/submissions"))
            .query(&[
                ("base64_encoded", "false"),
                ("wait", if wait { "true" } else { "false" }),
            ])
            .json(submission);
        self.send("create submission", request).await
    }

    async fn get_by_token(&self, token: &str) -> RelayResult<RawSubmission> {
        let operation = "get submission";
        let request = self
            .http
            .get(self.submission_url(operation, token)?)
            .query(&[("base64_encoded", "false"), ("fields", "*")]);
        self.send(operation, request).await
    }

    async fn submit_batch(&self, submissions: &[Submission]) -> RelayResult<Value> {
        let request = self
            .http
            .post(self.url("/submissions/batch"))
            .query(&[("base64_encoded", "false")])
            .json(&BatchRequest { submissions });
        self.send("create batch submissions", request).await
    }

    async fn get_batch_by_tokens(&self, tokens: &[String]) -> RelayResult<Vec<RawSubmission>> {
        let joined = tokens.join(",");
        let request = self.http.get(self.url("/submissions/batch")).query(&[
            ("tokens", joined.as_str()),
            ("base64_encoded", "false"),
            ("fields", "*"),
        ]);
        let response: BatchResponse = self.send("get batch submissions", request).await?;
        Ok(response.into_submissions())
    }

    async fn list_languages(&self) -> RelayResult<Vec<LanguageDescriptor>> {
        self.send("get languages", self.http.get(self.url("/languages")))
            .await
    }

    async fn list_statuses(&self) -> RelayResult<Vec<StatusDescriptor>> {
        self.send("get statuses", self.http.get(self.url("/statuses")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::net::SocketAddr;
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    fn config_for(addr: SocketAddr) -> Config {
        Config {
            judge0_url: format!("http://{addr}"),
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        }
    }

    async fn read_request_head(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answer one GET with a canned response and hand back the request head
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Config, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let head = read_request_head(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(head);
        });

        (config_for(addr), rx)
    }

    #[tokio::test]
    async fn test_silent_backend_times_out_as_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept, then never answer
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let config = Config {
            request_timeout: Duration::from_millis(300),
            ..config_for(addr)
        };
        let client = Judge0Client::new(&config).unwrap();

        let started = Instant::now();
        let err = client.get_by_token("abc").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.operation(), "get submission");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_backend_error_message_is_passed_through() {
        let (config, _) = serve_once(
            "422 Unprocessable Entity",
            r#"{"message":"language with id 999 doesn't exist"}"#,
        )
        .await;

        let err = Judge0Client::new(&config)
            .unwrap()
            .list_languages()
            .await
            .unwrap_err();

        match err {
            RelayError::Backend {
                operation,
                status,
                message,
            } => {
                assert_eq!(operation, "get languages");
                assert_eq!(status, Some(422));
                assert_eq!(message, "language with id 999 doesn't exist");
            }
            other => panic!("expected a backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_backend_error() {
        let (config, _) = serve_once("200 OK", "<html>proxy page</html>").await;

        let err = Judge0Client::new(&config)
            .unwrap()
            .get_by_token("abc")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains("malformed backend response"), "{err}");
    }

    #[tokio::test]
    async fn test_token_is_escaped_as_one_path_segment() {
        let (config, head) = serve_once("200 OK", r#"{"token":"t"}"#).await;

        let raw = Judge0Client::new(&config)
            .unwrap()
            .get_by_token("../languages?x=1")
            .await
            .unwrap();
        assert_eq!(raw.token.as_deref(), Some("t"));

        let head = head.await.unwrap();
        let request_line = head.lines().next().unwrap_or_default();
        assert!(
            request_line.starts_with("GET /submissions/..%2Flanguages%3Fx=1?"),
            "{request_line}"
        );
        assert!(request_line.contains("fields=*"), "{request_line}");
    }

    #[test]
    fn test_unparseable_backend_url_is_rejected() {
        let config = Config {
            judge0_url: "not a url".into(),
            ..Config::default()
        };
        let err = Judge0Client::new(&config).unwrap_err();
        assert_eq!(err.operation(), "configure HTTP client");
    }

    #[test]
    fn test_url_building() {
        let config = Config {
            judge0_url: "http://judge0:2358/".into(),
            ..Config::default()
        };
        let client = Judge0Client::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://judge0:2358");
        assert_eq!(client.url("/submissions"), "http://judge0:2358/submissions");
    }

    #[test]
    fn test_invalid_auth_token_is_rejected() {
        let config = Config {
            judge0_auth_token: Some("bad\ntoken".into()),
            ..Config::default()
        };
        assert!(Judge0Client::new(&config).is_err());
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        let body = r#"{"message":"some attributes for this submission cannot be converted to UTF-8"}"#;
        assert_eq!(
            error_message(body, StatusCode::BAD_REQUEST),
            "some attributes for this submission cannot be converted to UTF-8"
        );
        assert_eq!(
            error_message(r#"{"error":"not found"}"#, StatusCode::NOT_FOUND),
            "not found"
        );
    }

    #[test]
    fn test_error_message_validation_object() {
        let body = r#"{"language_id":["language with id 999 doesn't exist"]}"#;
        let message = error_message(body, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(message.contains("language with id 999 doesn't exist"));
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message("  Bad Gateway  ", StatusCode::BAD_GATEWAY), "Bad Gateway");
        assert_eq!(error_message("", StatusCode::SERVICE_UNAVAILABLE), "Service Unavailable");
    }

    #[test]
    fn test_batch_response_shapes() {
        let list: BatchResponse = serde_json::from_value(json!([{"token": "a"}, {"token": "b"}])).unwrap();
        assert_eq!(list.into_submissions().len(), 2);

        let envelope: BatchResponse =
            serde_json::from_value(json!({"submissions": [{"token": "a"}]})).unwrap();
        let items = envelope.into_submissions();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].token.as_deref(), Some("a"));
    }

    #[tokio::test]
    #[ignore] // Requires a running Judge0 instance at JUDGE0_URL
    async fn test_live_round_trip() {
        let client = Judge0Client::new(&Config::from_env()).expect("client");
        let submission = Submission {
            source_code: "print('hello')".into(),
            language_id: 71,
            stdin: String::new(),
            expected_output: None,
        };
        let created = client.submit(&submission, true).await.expect("submit");
        let token = created.token.expect("token");
        let fetched = client.get_by_token(&token).await.expect("get");
        assert_eq!(fetched.stdout.as_deref().map(str::trim), Some("hello"));
    }
}
