//! Message transport contract
//!
//! Delivery is fire-and-forget; the controller logs a failed send and
//! moves on.

use tracing::info;

use crate::error::TransportError;

/// Topic for reads granted by the local cache
pub const TOPIC_ACCESS: &str = "nfc/access";

/// Topic for reads the remote party must authenticate
pub const TOPIC_VERIFY: &str = "nfc/verify";

/// Outbound message channel
pub trait Transport {
    /// Publish `payload` on `topic`
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        (**self).send(topic, payload)
    }
}

/// Publishes to the `tracing` log
///
/// Payloads are sealed hex text, so logging them exposes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl Transport for LogTransport {
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        info!(
            topic,
            payload = %String::from_utf8_lossy(payload),
            "Published message"
        );
        Ok(())
    }
}

/// A message captured by [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Destination topic
    pub topic: String,
    /// Raw payload
    pub payload: Vec<u8>,
}

/// Records every message; used in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    messages: Vec<SentMessage>,
    fail: bool,
}

impl MemoryTransport {
    /// Empty transport that accepts every message
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that rejects every message
    pub fn failing() -> Self {
        Self {
            messages: Vec::new(),
            fail: true,
        }
    }

    /// Messages received so far
    pub fn messages(&self) -> &[SentMessage] {
        &self.messages
    }

    /// Drain the received messages
    pub fn take(&mut self) -> Vec<SentMessage> {
        std::mem::take(&mut self.messages)
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::SendFailed {
                topic: topic.to_string(),
                reason: "transport offline".to_string(),
            });
        }
        self.messages.push(SentMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
