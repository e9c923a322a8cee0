//! Streaming HTTP transport for Deckhand
//!
//! [`StreamingHttpClient`] issues GET/POST/PUT requests and hands back the
//! complete response body. Body chunks are delivered by a transport task
//! into a bounded [`ResponseBuffer`] and drained in order by the caller.
//!
//! Draining stops on the transport's completion event. If the transport
//! goes quiet for longer than the configured inactivity timeout, the bytes
//! received so far are returned and [`Completion::InactivityTimeout`] is
//! reported on the response.
//!
//! Whether a status code counts as success is decided per call with
//! [`ExpectedStatus`].
//!
//! # Example
//!
//! ```rust,no_run
//! use deckhand_shared_config::HttpConfig;
//! use deckhand_streaming_http::{ExpectedStatus, StreamingHttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = StreamingHttpClient::new(&HttpConfig::default())?;
//! client.set_header("Accept", "application/json")?;
//!
//! let response = client
//!     .get("https://example.com/status", ExpectedStatus::OK)
//!     .await?;
//! println!("{} bytes", response.body.len());
//! # Ok(())
//! # }
//! ```

mod buffer;
mod client;
mod error;
mod status;

pub use buffer::{
    response_buffer, ChunkProducer, Completion, DrainedBody, ResponseBuffer, TransportEvent,
};
pub use client::{HttpResponse, StreamingHttpClient};
pub use error::{HttpError, HttpResult};
pub use status::ExpectedStatus;

pub use reqwest::StatusCode;
