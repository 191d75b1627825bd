//! Discord REST transport.
//!
//! Implements the core's [`ChatTransport`] over the Discord HTTP API and
//! provides the inbound side as per-channel polling tasks: each task
//! fetches messages created after its cursor and forwards them into an
//! mpsc channel the listener drains. The gateway websocket is deliberately
//! not used; polling keeps the session layer to plain HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use botup::{snowflake, ChatTransport, InboundMessage, TransportError};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, warn};

const API_BASE: &str = "https://discord.com/api/v10";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const FETCH_LIMIT: u32 = 100;

pub struct DiscordTransport {
    http: reqwest::Client,
    authorization: String,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    id: String,
    author: AuthorPayload,
    #[serde(default)]
    message_reference: Option<ReferencePayload>,
}

#[derive(Debug, Deserialize)]
struct AuthorPayload {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ReferencePayload {
    #[serde(default)]
    message_id: Option<String>,
}

/// Discord serializes snowflakes as decimal strings.
fn parse_id(raw: &str) -> Result<u64, TransportError> {
    raw.parse().map_err(|_| TransportError::Payload(format!("non-numeric id {raw:?}")))
}

fn to_inbound(payload: MessagePayload, channel: u64) -> Result<InboundMessage, TransportError> {
    let reply_to = match payload.message_reference.and_then(|reference| reference.message_id) {
        Some(raw) => Some(parse_id(&raw)?),
        None => None,
    };
    Ok(InboundMessage {
        id: parse_id(&payload.id)?,
        author: parse_id(&payload.author.id)?,
        channel,
        reply_to,
    })
}

impl DiscordTransport {
    pub fn new(token: &str) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| TransportError::Http(err.to_string()))?;

        Ok(Self { http, authorization: format!("Bot {token}") })
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, TransportError> {
        let response = request
            .header("Authorization", &self.authorization)
            .send()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(response)
    }

    /// Messages in `channel` newer than the `after` cursor, oldest first.
    pub async fn fetch_after(
        &self,
        channel: u64,
        after: u64,
    ) -> Result<Vec<InboundMessage>, TransportError> {
        let url = format!("{API_BASE}/channels/{channel}/messages");
        let request = self
            .http
            .get(url)
            .query(&[("after", after.to_string()), ("limit", FETCH_LIMIT.to_string())]);

        let payloads: Vec<MessagePayload> = self
            .execute(request)
            .await?
            .json()
            .await
            .map_err(|err| TransportError::Payload(err.to_string()))?;

        // The API returns newest first; the listener wants arrival order.
        payloads.into_iter().rev().map(|payload| to_inbound(payload, channel)).collect()
    }
}

#[async_trait]
impl ChatTransport for DiscordTransport {
    async fn send_message(&self, channel: u64, content: &str) -> Result<u64, TransportError> {
        let url = format!("{API_BASE}/channels/{channel}/messages");
        let request = self.http.post(url).json(&serde_json::json!({ "content": content }));

        let payload: MessagePayload = self
            .execute(request)
            .await?
            .json()
            .await
            .map_err(|err| TransportError::Payload(err.to_string()))?;

        parse_id(&payload.id)
    }

    async fn delete_message(&self, channel: u64, message: u64) -> Result<(), TransportError> {
        let url = format!("{API_BASE}/channels/{channel}/messages/{message}");
        self.execute(self.http.delete(url)).await.map(|_| ())
    }
}

/// Start one polling task per channel. Tasks run for the process
/// lifetime and stop only when the listener side of `tx` is dropped.
pub fn spawn_pollers(
    transport: Arc<DiscordTransport>,
    channels: Vec<u64>,
    tx: mpsc::Sender<InboundMessage>,
) {
    for channel in channels {
        let transport = Arc::clone(&transport);
        let tx = tx.clone();
        tokio::spawn(poll_channel(transport, channel, tx));
    }
}

async fn poll_channel(
    transport: Arc<DiscordTransport>,
    channel: u64,
    tx: mpsc::Sender<InboundMessage>,
) {
    // Start the cursor at "now" so history is not replayed on startup.
    let mut after = snowflake::at(Utc::now());
    let mut ticker = interval(POLL_INTERVAL);

    loop {
        ticker.tick().await;
        match transport.fetch_after(channel, after).await {
            Ok(messages) => {
                for message in messages {
                    after = after.max(message.id);
                    if tx.send(message).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => warn!("Failed to poll channel {channel}: {err}"),
        }
        debug!("Polled channel {channel}, cursor at {after}");
    }
}
