//! Streaming HTTP client with a per-instance header set

use bytes::Bytes;
use deckhand_shared_config::HttpConfig;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::buffer::{response_buffer, ChunkProducer, Completion};
use crate::error::{HttpError, HttpResult};
use crate::status::ExpectedStatus;

/// Maximum error body size kept for diagnostics
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// A fully drained response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code reported by the server
    pub status: StatusCode,
    /// Body bytes in transmission order
    pub body: Bytes,
    /// How the body drain ended
    pub completion: Completion,
}

impl HttpResponse {
    /// Lossy UTF-8 view of the body
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client that performs one request at a time
///
/// Request methods take `&mut self`: an instance never has more than one
/// request in flight. Share an instance behind a `tokio::sync::Mutex` and
/// hold the guard across `set_header` and the request when the header set
/// must match the request.
///
/// The body of each response is pumped by a separate task into a bounded
/// [`ResponseBuffer`](crate::ResponseBuffer) and drained by the caller, so
/// the call resolves only once the body is complete or the configured
/// inactivity timeout elapses.
#[derive(Debug)]
pub struct StreamingHttpClient {
    http_client: Client,
    headers: HeaderMap,
    config: HttpConfig,
}

impl StreamingHttpClient {
    /// Create a client from configuration
    pub fn new(config: &HttpConfig) -> HttpResult<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(2)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(HttpError::Build)?;

        Ok(Self::with_client(config, http_client))
    }

    /// Create a client with a custom `reqwest::Client` (for testing)
    pub fn with_client(config: &HttpConfig, http_client: Client) -> Self {
        Self {
            http_client,
            headers: HeaderMap::new(),
            config: config.clone(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Set a header sent with every following request, replacing any previous value
    ///
    /// # Errors
    /// `HttpError::InvalidHeader` if the name or value is not valid HTTP
    pub fn set_header(&mut self, key: &str, value: &str) -> HttpResult<()> {
        let name = parse_header_name(key)?;
        let value = HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
            name: key.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Remove a header; removing an absent header is not an error
    ///
    /// # Errors
    /// `HttpError::InvalidHeader` if the name is not valid HTTP
    pub fn delete_header(&mut self, key: &str) -> HttpResult<()> {
        let name = parse_header_name(key)?;
        self.headers.remove(name);
        Ok(())
    }

    /// Current value of a header, if set and printable
    pub fn header(&self, key: &str) -> Option<String> {
        self.headers
            .get(key)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Issue a GET and drain the body
    pub async fn get(&mut self, url: &str, expect: ExpectedStatus) -> HttpResult<HttpResponse> {
        self.perform(Method::GET, url, None, expect).await
    }

    /// Issue a POST with `body` and drain the response body
    pub async fn post(
        &mut self,
        url: &str,
        body: impl Into<String>,
        expect: ExpectedStatus,
    ) -> HttpResult<HttpResponse> {
        self.perform(Method::POST, url, Some(body.into()), expect)
            .await
    }

    /// Issue a PUT with an empty body and drain the response body
    pub async fn put(&mut self, url: &str, expect: ExpectedStatus) -> HttpResult<HttpResponse> {
        self.perform(Method::PUT, url, Some(String::new()), expect)
            .await
    }

    async fn perform(
        &mut self,
        method: Method,
        url: &str,
        body: Option<String>,
        expect: ExpectedStatus,
    ) -> HttpResult<HttpResponse> {
        let mut request = self
            .http_client
            .request(method.clone(), url)
            .headers(self.headers.clone());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(%method, url, error = %e, "HTTP request failed");
            HttpError::Transport(e)
        })?;

        let status = response.status();
        debug!(%method, url, status = status.as_u16(), "HTTP response received");
        for (name, value) in response.headers() {
            trace!(header = %name, value = ?value, "Response header");
        }

        if !expect.accepts(status) {
            let body = truncate_error_body(response.text().await.unwrap_or_default());
            warn!(%method, url, status = status.as_u16(), "HTTP status error");
            return Err(HttpError::Status { status, body });
        }

        let (producer, mut buffer) = response_buffer(self.config.buffer_capacity);
        let pump = spawn_body_pump(response, producer);

        let drained = buffer
            .drain(self.config.inactivity_timeout, self.config.max_body_bytes)
            .await;

        // Only relevant after an inactivity timeout or an error
        if !pump.is_finished() {
            pump.abort();
        }

        let drained = drained?;
        Ok(HttpResponse {
            status,
            body: drained.bytes,
            completion: drained.completion,
        })
    }
}

/// Forward body chunks from the transport into the response buffer
fn spawn_body_pump(response: Response, producer: ChunkProducer) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = response.bytes_stream();
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    if !producer.push(chunk).await {
                        return;
                    }
                }
                Err(e) => {
                    producer.fail(e).await;
                    return;
                }
            }
        }
        producer.finish().await;
    })
}

fn parse_header_name(key: &str) -> HttpResult<HeaderName> {
    HeaderName::from_bytes(key.as_bytes()).map_err(|e| HttpError::InvalidHeader {
        name: key.to_string(),
        reason: e.to_string(),
    })
}

/// Truncate error body on a UTF-8 boundary
fn truncate_error_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_SIZE {
        return body;
    }

    let truncate_at = body
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
        .last()
        .unwrap_or(0);

    format!("{}... (truncated)", &body[..truncate_at])
}
