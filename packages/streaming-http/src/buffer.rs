//! Bounded producer/consumer handoff for response bodies
//!
//! The transport side pushes body chunks as they arrive; the requesting
//! task drains them into one contiguous body. Draining ends on an explicit
//! completion event. The inactivity timeout is only a fallback: when no
//! event arrives within it, the chunks received so far are returned.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::{HttpError, HttpResult};

/// Event delivered from the transport to the waiting consumer
#[derive(Debug)]
pub enum TransportEvent {
    /// A body chunk, in transmission order
    Chunk(Bytes),
    /// The transport delivered the whole body
    Finished,
    /// The transport failed mid-body
    Failed(reqwest::Error),
}

/// Why a drain stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The producer signalled the end of the body
    Finished,
    /// The producer went away without signalling
    ProducerClosed,
    /// No event arrived within the inactivity timeout
    InactivityTimeout,
}

impl Completion {
    /// True when the body is known to be complete
    pub fn is_complete(&self) -> bool {
        matches!(self, Completion::Finished)
    }
}

/// Body assembled by [`ResponseBuffer::drain`]
#[derive(Debug, Clone)]
pub struct DrainedBody {
    pub bytes: Bytes,
    pub chunks: usize,
    pub completion: Completion,
}

/// Create a buffer holding at most `capacity` undelivered chunks
///
/// A capacity of zero is treated as one.
pub fn response_buffer(capacity: usize) -> (ChunkProducer, ResponseBuffer) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ChunkProducer { tx }, ResponseBuffer { rx })
}

/// Producer half, owned by the transport event context
#[derive(Debug)]
pub struct ChunkProducer {
    tx: mpsc::Sender<TransportEvent>,
}

impl ChunkProducer {
    /// Push one chunk, waiting while the buffer is full
    ///
    /// Returns `false` once the consumer has stopped reading.
    pub async fn push(&self, chunk: Bytes) -> bool {
        trace!(len = chunk.len(), "Buffering body chunk");
        self.tx.send(TransportEvent::Chunk(chunk)).await.is_ok()
    }

    /// Signal that the whole body has been delivered
    pub async fn finish(self) {
        if self.tx.send(TransportEvent::Finished).await.is_err() {
            trace!("Consumer gone before completion event");
        }
    }

    /// Signal a transport failure
    pub async fn fail(self, error: reqwest::Error) {
        if self.tx.send(TransportEvent::Failed(error)).await.is_err() {
            trace!("Consumer gone before failure event");
        }
    }
}

/// Consumer half, drained by the requesting task
#[derive(Debug)]
pub struct ResponseBuffer {
    rx: mpsc::Receiver<TransportEvent>,
}

impl ResponseBuffer {
    /// Drain chunks in order until completion or inactivity
    ///
    /// # Errors
    /// - `HttpError::Transport` if the producer reported a failure
    /// - `HttpError::BodyTooLarge` if the body grows past `max_body_bytes`
    pub async fn drain(
        &mut self,
        inactivity: Duration,
        max_body_bytes: usize,
    ) -> HttpResult<DrainedBody> {
        let mut body = BytesMut::new();
        let mut chunks = 0usize;

        let completion = loop {
            match tokio::time::timeout(inactivity, self.rx.recv()).await {
                Ok(Some(TransportEvent::Chunk(chunk))) => {
                    if body.len() + chunk.len() > max_body_bytes {
                        self.rx.close();
                        return Err(HttpError::BodyTooLarge {
                            limit: max_body_bytes,
                        });
                    }
                    body.extend_from_slice(&chunk);
                    chunks += 1;
                }
                Ok(Some(TransportEvent::Finished)) => break Completion::Finished,
                Ok(Some(TransportEvent::Failed(e))) => {
                    self.rx.close();
                    return Err(HttpError::Transport(e));
                }
                Ok(None) => break Completion::ProducerClosed,
                Err(_) => {
                    warn!(
                        timeout_ms = inactivity.as_millis() as u64,
                        chunks,
                        bytes = body.len(),
                        "No body data within inactivity timeout, returning partial body"
                    );
                    break Completion::InactivityTimeout;
                }
            }
        };

        // Late chunks must not be picked up by anyone
        self.rx.close();

        debug!(chunks, bytes = body.len(), ?completion, "Response body drained");

        Ok(DrainedBody {
            bytes: body.freeze(),
            chunks,
            completion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::time::sleep;

    const INACTIVITY: Duration = Duration::from_millis(1000);
    const LIMIT: usize = 1024 * 1024;

    /// Spawn a producer that waits `delay_ms` before each chunk
    fn spawn_producer(
        producer: ChunkProducer,
        chunks: Vec<(u64, &'static str)>,
        finish: bool,
    ) -> tokio::task::JoinHandle<usize> {
        tokio::spawn(async move {
            let mut delivered = 0;
            for (delay_ms, chunk) in chunks {
                sleep(Duration::from_millis(delay_ms)).await;
                if !producer.push(Bytes::from_static(chunk.as_bytes())).await {
                    return delivered;
                }
                delivered += 1;
            }
            if finish {
                producer.finish().await;
            }
            delivered
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunks_concatenated_in_order() {
        let (producer, mut buffer) = response_buffer(4);
        spawn_producer(
            producer,
            vec![(0, "{\"a\":"), (10, "1,"), (250, "\"b\":"), (900, "2}")],
            true,
        );

        let drained = buffer.drain(INACTIVITY, LIMIT).await.unwrap();
        assert_eq!(&drained.bytes[..], b"{\"a\":1,\"b\":2}");
        assert_eq!(drained.chunks, 4);
        assert_eq!(drained.completion, Completion::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_just_inside_timeout_is_kept() {
        let (producer, mut buffer) = response_buffer(4);
        spawn_producer(producer, vec![(0, "first"), (999, "-last")], false);

        let drained = buffer.drain(INACTIVITY, LIMIT).await.unwrap();
        assert_eq!(&drained.bytes[..], b"first-last");
        assert_eq!(drained.completion, Completion::ProducerClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gap_past_timeout_returns_first_k_chunks() {
        let (producer, mut buffer) = response_buffer(4);
        let handle = spawn_producer(
            producer,
            vec![(0, "one,"), (100, "two,"), (1500, "three")],
            true,
        );

        let drained = buffer.drain(INACTIVITY, LIMIT).await.unwrap();
        assert_eq!(&drained.bytes[..], b"one,two,");
        assert_eq!(drained.chunks, 2);
        assert_eq!(drained.completion, Completion::InactivityTimeout);
        assert!(!drained.completion.is_complete());

        // The late chunk is refused once the consumer has stopped
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_body_finishes_immediately() {
        let (producer, mut buffer) = response_buffer(1);
        producer.finish().await;

        let drained = buffer.drain(INACTIVITY, LIMIT).await.unwrap();
        assert!(drained.bytes.is_empty());
        assert_eq!(drained.completion, Completion::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_producer_times_out_with_empty_body() {
        let (_producer, mut buffer) = response_buffer(1);

        let drained = buffer.drain(INACTIVITY, LIMIT).await.unwrap();
        assert!(drained.bytes.is_empty());
        assert_eq!(drained.completion, Completion::InactivityTimeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_body_limit_enforced() {
        let (producer, mut buffer) = response_buffer(4);
        spawn_producer(producer, vec![(0, "0123456789"), (0, "abcdef")], true);

        let result = buffer.drain(INACTIVITY, 12).await;
        assert_matches!(result, Err(HttpError::BodyTooLarge { limit: 12 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_capacity_applies_backpressure_without_loss() {
        let (producer, mut buffer) = response_buffer(1);
        let parts: Vec<(u64, &'static str)> =
            vec![(0, "a"), (0, "b"), (0, "c"), (0, "d"), (0, "e"), (0, "f")];
        spawn_producer(producer, parts, true);

        let drained = buffer.drain(INACTIVITY, LIMIT).await.unwrap();
        assert_eq!(&drained.bytes[..], b"abcdef");
        assert_eq!(drained.chunks, 6);
    }

    #[test]
    fn test_push_waits_while_full_and_stops_when_consumer_gone() {
        let (producer, buffer) = response_buffer(1);

        let mut first = tokio_test::task::spawn(producer.push(Bytes::from_static(b"a")));
        assert!(tokio_test::assert_ready!(first.poll()));
        drop(first);

        let mut second = tokio_test::task::spawn(producer.push(Bytes::from_static(b"b")));
        tokio_test::assert_pending!(second.poll());

        drop(buffer);
        assert!(second.is_woken());
        assert!(!tokio_test::assert_ready!(second.poll()));
    }
}
