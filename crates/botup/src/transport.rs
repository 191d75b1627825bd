//! Chat-transport seam.
//!
//! The prober never talks to Discord directly; it sends and deletes
//! messages through [`ChatTransport`] and receives inbound traffic as
//! [`InboundMessage`] values pushed in by the application layer. The
//! service binary provides the REST implementation.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a transport implementation
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(String),

    #[error("api returned status {0}")]
    Status(u16),

    #[error("malformed response payload: {0}")]
    Payload(String),
}

/// One inbound message event, as delivered by the transport's
/// subscription mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundMessage {
    /// Message id (snowflake)
    pub id: u64,

    /// Author's user id
    pub author: u64,

    /// Channel the message was posted in
    pub channel: u64,

    /// Message this one replies to, when reply threading was used
    pub reply_to: Option<u64>,
}

/// Outbound operations the prober needs from the chat protocol
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post `content` in `channel`, returning the new message's id.
    async fn send_message(&self, channel: u64, content: &str) -> Result<u64, TransportError>;

    /// Delete a message. Advisory: callers ignore failures.
    async fn delete_message(&self, channel: u64, message: u64) -> Result<(), TransportError>;
}
