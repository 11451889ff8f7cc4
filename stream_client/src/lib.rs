use std::{pin::Pin, time::Duration};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Path of the streaming speech endpoint
pub const SPEECH_STREAM_PATH: &str = "/v1/audio/speech/stream";

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Transport-level failures, classified the way the probes report them
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection refused. Is the server running on {target}?")]
    Connect { target: String },

    #[error("Request timed out after {:.1}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    fn classify(err: reqwest::Error, target: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout { after: timeout }
        } else if err.is_connect() {
            ClientError::Connect {
                target: target.to_string(),
            }
        } else {
            ClientError::Transport(err)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Bound on connecting, on waiting for response headers, and on each body read
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for one speech endpoint.
///
/// Every `StreamClient` owns its own connection pool with no idle
/// connections kept, so two clients never share a socket.
pub struct StreamClient {
    client: Client,
    url: String,
    target: String,
    timeout: Duration,
}

impl StreamClient {
    /// `base_url` is `http://host:port`; the endpoint path is appended.
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let base = base_url.trim_end_matches('/');
        let target = base
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(base)
            .to_string();
        let client = Client::builder()
            .connect_timeout(options.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            client,
            url: format!("{base}{SPEECH_STREAM_PATH}"),
            target,
            timeout: options.timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// host:port this client talks to
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST `payload` and return the body as a chunk stream.
    ///
    /// Any status other than 200 is an error; its body text is read
    /// best-effort for the report.
    pub async fn open<T: Serialize + ?Sized>(&self, payload: &T) -> Result<SpeechStream, ClientError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(%request_id, url = %self.url, "opening speech stream");

        let send = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "*/*")
            .header(REQUEST_ID_HEADER, &request_id)
            .json(payload)
            .send();

        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| ClientError::Timeout { after: self.timeout })?
            .map_err(|e| ClientError::classify(e, &self.target, self.timeout))?;

        let status = response.status();
        info!(%request_id, status = status.as_u16(), "speech stream response");

        if status != StatusCode::OK {
            let body = tokio::time::timeout(self.timeout, response.text())
                .await
                .ok()
                .and_then(|r| r.ok())
                .unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(SpeechStream {
            inner: Box::pin(response.bytes_stream()),
            request_id,
            status: status.as_u16(),
            target: self.target.clone(),
            timeout: self.timeout,
        })
    }
}

/// Body of a successful speech response, read chunk by chunk
pub struct SpeechStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    request_id: String,
    status: u16,
    target: String,
    timeout: Duration,
}

impl SpeechStream {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Next chunk as delivered by the transport, `None` once the body is exhausted.
    ///
    /// Each read waits at most the client timeout.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, ClientError> {
        match tokio::time::timeout(self.timeout, self.inner.next()).await {
            Err(_) => Err(ClientError::Timeout { after: self.timeout }),
            Ok(None) => Ok(None),
            Ok(Some(Ok(chunk))) => Ok(Some(chunk)),
            Ok(Some(Err(e))) => Err(ClientError::classify(e, &self.target, self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_and_target() {
        let client = StreamClient::new("http://127.0.0.1:4123/", ClientOptions::default()).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:4123/v1/audio/speech/stream");
        assert_eq!(client.target(), "127.0.0.1:4123");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_error_messages() {
        let err = ClientError::Connect {
            target: "10.0.0.1:4123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Connection refused. Is the server running on 10.0.0.1:4123?"
        );

        let err = ClientError::Timeout {
            after: Duration::from_secs(60),
        };
        assert_eq!(err.to_string(), "Request timed out after 60.0s");

        let err = ClientError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[tokio::test]
    async fn test_open_against_closed_port_is_connect_error() {
        // bind then drop to get a port with no listener
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = StreamClient::new(
            &format!("http://127.0.0.1:{port}"),
            ClientOptions {
                timeout: Duration::from_secs(5),
            },
        )
        .unwrap();
        let err = client.open(&serde_json::json!({"input": "hi"})).await.err().unwrap();
        assert!(matches!(err, ClientError::Connect { .. }), "unexpected error: {err:?}");
    }
}
