//! `LlmGateway` implementation over HTTP

use super::error::{error_from_reqwest, error_from_status, parse_stream_chunk};
use super::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use fusion_application::{GatewayError, LlmGateway, StreamHandle};
use fusion_domain::{GenerationOptions, Message, Model, StreamEvent};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const STREAM_BUFFER: usize = 64;
const DONE_SENTINEL: &str = "[DONE]";

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub base_url: String,
    pub api_key: String,
    /// Limit for a whole non-streaming call, or for the response headers
    /// of a streaming one.
    pub request_timeout: Duration,
}

impl OpenAiCompatConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Gateway to any server implementing the chat completions protocol.
///
/// The underlying `reqwest::Client` pools connections and is shared by
/// every concurrent call.
pub struct OpenAiCompatGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    request_timeout: Duration,
}

impl OpenAiCompatGateway {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: completions_url(&config.base_url),
            api_key: config.api_key,
            request_timeout: config.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the request and reject non-success statuses.
    async fn post(&self, body: &ChatRequest<'_>) -> Result<reqwest::Response, GatewayError> {
        debug!(
            model = body.model,
            messages = body.messages.len(),
            stream = body.stream,
            "POST {}",
            self.endpoint
        );

        let send = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send();

        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(|e| error_from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = error_from_status(status, &text);
            warn!(model = body.model, status = status.as_u16(), "Request rejected: {}", err);
            return Err(err);
        }

        Ok(response)
    }
}

fn completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = base.strip_suffix("/v1").unwrap_or(base);
    format!("{}{}", base, COMPLETIONS_PATH)
}

#[async_trait]
impl LlmGateway for OpenAiCompatGateway {
    async fn generate(
        &self,
        model: &Model,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<String, GatewayError> {
        let request = ChatRequest::new(model.as_str(), messages, options.streaming(false));

        let call = async {
            let response = self.post(&request).await?;
            response
                .json::<ChatResponse>()
                .await
                .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
        };

        let body = tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout)??;

        body.into_text().ok_or_else(|| {
            GatewayError::InvalidResponse(format!("{} returned no choices", model))
        })
    }

    async fn generate_streaming(
        &self,
        model: &Model,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<StreamHandle, GatewayError> {
        let request = ChatRequest::new(model.as_str(), messages, options.streaming(true));
        let response = self.post(&request).await?;

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let model = model.clone();

        tokio::spawn(async move {
            let mut events = response.bytes_stream().eventsource();
            let mut full = String::new();
            let mut done = false;

            loop {
                let next = tokio::select! {
                    _ = tx.closed() => {
                        debug!(model = %model, "Stream receiver dropped; closing connection");
                        return;
                    }
                    next = events.next() => next,
                };

                let event = match next {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => {
                        warn!(model = %model, "Stream transport error: {}", e);
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                    None => break,
                };

                if event.data.trim() == DONE_SENTINEL {
                    done = true;
                    break;
                }

                match parse_stream_chunk(&event.data) {
                    Ok(Some(delta)) => {
                        full.push_str(&delta);
                        if tx.send(StreamEvent::Delta(delta)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => {
                        warn!(model = %model, "Stream reported an error: {}", message);
                        let _ = tx.send(StreamEvent::Error(message)).await;
                        return;
                    }
                }
            }

            if !done {
                warn!(model = %model, bytes = full.len(), "Stream closed before [DONE]");
                let _ = tx
                    .send(StreamEvent::Error("stream ended before [DONE]".to_string()))
                    .await;
                return;
            }

            debug!(model = %model, bytes = full.len(), "Stream finished");
            let _ = tx.send(StreamEvent::Completed(full)).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response on a local port and return the
    /// base URL plus a handle yielding the raw request.
    async fn serve_once(
        status_line: &str,
        content_type: &str,
        body: String,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let head = format!(
            "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            status_line,
            content_type,
            body.len()
        );
        serve(head, body).await
    }

    /// Body delimited only by the server closing the connection.
    async fn serve_until_close(body: String) -> (String, tokio::task::JoinHandle<String>) {
        let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n"
            .to_string();
        serve(head, body).await
    }

    async fn serve(head: String, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn gateway(base_url: &str) -> OpenAiCompatGateway {
        OpenAiCompatGateway::new(OpenAiCompatConfig::new(base_url, "sk-test")).unwrap()
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            completions_url("https://api.together.xyz"),
            "https://api.together.xyz/v1/chat/completions"
        );
        assert_eq!(
            completions_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Paris"}}]}"#;
        let (url, server) = serve_once("200 OK", "application/json", body.to_string()).await;

        let text = gateway(&url)
            .generate(
                &Model::new("m1"),
                &[Message::user("capital of France?")],
                GenerationOptions::reference_defaults(),
            )
            .await
            .unwrap();
        assert_eq!(text, "Paris");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""model":"m1""#));
        assert!(request.contains(r#""stream":false"#));
    }

    #[tokio::test]
    async fn test_generate_maps_unauthorized() {
        let body = r#"{"error":{"message":"Invalid API key"}}"#;
        let (url, _server) =
            serve_once("401 Unauthorized", "application/json", body.to_string()).await;

        let err = gateway(&url)
            .generate(
                &Model::new("m1"),
                &[Message::user("hi")],
                GenerationOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Auth("Invalid API key".into()));
    }

    #[tokio::test]
    async fn test_generate_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(&format!("http://{}", addr))
            .generate(
                &Model::new("m1"),
                &[Message::user("hi")],
                GenerationOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn test_streaming_forwards_deltas_in_order() {
        let body = [
            r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#,
            r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#,
            r#"data: {"choices":[{"delta":{"content":"lo"}}]}"#,
            "data: [DONE]",
        ]
        .map(|line| format!("{}\n\n", line))
        .concat();
        let (url, server) = serve_once("200 OK", "text/event-stream", body).await;

        let mut handle = gateway(&url)
            .generate_streaming(
                &Model::new("agg"),
                &[Message::system("merge"), Message::user("a,b")],
                GenerationOptions::aggregator_defaults(),
            )
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.receiver.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hel".into()),
                StreamEvent::Delta("lo".into()),
                StreamEvent::Completed("Hello".into()),
            ]
        );

        let request = server.await.unwrap();
        assert!(request.contains(r#""stream":true"#));
        assert!(request.contains(r#""role":"system""#));
    }

    #[tokio::test]
    async fn test_streaming_close_without_done_is_an_error() {
        let body = format!("{}\n\n", r#"data: {"choices":[{"delta":{"content":"The ans"}}]}"#);
        let (url, server) = serve_until_close(body).await;

        let mut handle = gateway(&url)
            .generate_streaming(
                &Model::new("agg"),
                &[Message::user("a,b")],
                GenerationOptions::aggregator_defaults(),
            )
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.receiver.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("The ans".into()),
                StreamEvent::Error("stream ended before [DONE]".into()),
            ]
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_streaming_in_band_error() {
        let body = [
            r#"data: {"choices":[{"delta":{"content":"par"}}]}"#,
            r#"data: {"error":{"message":"overloaded"}}"#,
        ]
        .map(|line| format!("{}\n\n", line))
        .concat();
        let (url, _server) = serve_once("200 OK", "text/event-stream", body).await;

        let handle = gateway(&url)
            .generate_streaming(
                &Model::new("agg"),
                &[Message::user("x")],
                GenerationOptions::aggregator_defaults(),
            )
            .await
            .unwrap();

        let err = handle.collect_text().await.unwrap_err();
        assert_eq!(err, GatewayError::Provider("overloaded".into()));
    }

    #[tokio::test]
    async fn test_streaming_rate_limited_before_first_byte() {
        let (url, _server) =
            serve_once("429 Too Many Requests", "text/plain", "slow down".to_string()).await;

        let result = gateway(&url)
            .generate_streaming(
                &Model::new("agg"),
                &[Message::user("x")],
                GenerationOptions::aggregator_defaults(),
            )
            .await;
        assert!(matches!(result, Err(GatewayError::RateLimited(_))));
    }
}
