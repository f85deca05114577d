//! Bridge adapter - drives a WhatsApp Web session hosted by an HTTP gateway
//!
//! The gateway keeps the multi-device socket; this adapter starts the session,
//! long-polls its event queue and maps outbound calls onto REST endpoints.

pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{MessageKey, Presence, SessionEvent};
use crate::domain::traits::{Connector, Session, WaClient};
use crate::infrastructure::config::{BridgeConfig, SessionConfig};
use crate::infrastructure::storage::SessionStore;
use wire::{
    decode_event, EventBatch, JidRequest, KeyRequest, KeysRequest, PresenceRequest, ReactionRequest,
    SendResponse, SendTextRequest, StartRequest, TextRequest, WireKey,
};

const EVENT_BUFFER: usize = 256;
const MAX_POLL_FAILURES: u32 = 5;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Outbound REST client for one gateway session
pub struct BridgeClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BridgeClient {
    pub fn new(http: Client, url: &str, instance: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: format!("{}/session/{}", url.trim_end_matches('/'), instance),
            api_key,
        }
    }

    /// Get the API URL for an endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, BotError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BotError::Auth(format!("Bridge rejected credentials: {}", status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!("Bridge API error {}: {}", status, body)));
        }
        Ok(response)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, BotError> {
        let request = self.authorize(self.http.post(self.endpoint(path))).json(body);
        let response = request.send().await?;
        Self::check(response).await
    }

    /// Start (or resume) the gateway session
    pub async fn start(&self, credentials: Option<&str>) -> Result<(), BotError> {
        self.post("start", &StartRequest { credentials }).await?;
        Ok(())
    }

    /// Long-poll for events after `offset`
    pub async fn poll(&self, offset: i64, timeout_secs: u64) -> Result<EventBatch, BotError> {
        let request = self
            .authorize(self.http.get(self.endpoint("events")))
            .query(&[("offset", offset.to_string()), ("timeout", timeout_secs.to_string())])
            .timeout(Duration::from_secs(timeout_secs + 10));

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WaClient for BridgeClient {
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        quoted: Option<&MessageKey>,
        mentions: &[String],
    ) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);
        let body = SendTextRequest {
            chat_id,
            text,
            quoted: quoted.map(WireKey::from),
            mentions,
        };
        let sent: SendResponse = self.post("messages/text", &body).await?.json().await?;
        Ok(sent.id)
    }

    async fn send_reaction(&self, key: &MessageKey, emoji: &str) -> Result<(), BotError> {
        self.post("messages/reaction", &ReactionRequest { key: key.into(), emoji }).await?;
        Ok(())
    }

    async fn read_messages(&self, keys: &[MessageKey]) -> Result<(), BotError> {
        let body = KeysRequest {
            keys: keys.iter().map(WireKey::from).collect(),
        };
        self.post("messages/read", &body).await?;
        Ok(())
    }

    async fn send_presence(&self, chat_id: &str, presence: Presence) -> Result<(), BotError> {
        let body = PresenceRequest {
            chat_id,
            presence: presence.as_str(),
        };
        self.post("presence", &body).await?;
        Ok(())
    }

    async fn update_profile_status(&self, text: &str) -> Result<(), BotError> {
        self.post("profile/status", &TextRequest { text }).await?;
        Ok(())
    }

    async fn post_status(&self, text: &str) -> Result<(), BotError> {
        self.post("status", &TextRequest { text }).await?;
        Ok(())
    }

    async fn follow_newsletter(&self, jid: &str) -> Result<(), BotError> {
        self.post("newsletter/follow", &JidRequest { jid }).await?;
        Ok(())
    }

    async fn delete_message(&self, key: &MessageKey) -> Result<(), BotError> {
        self.post("messages/delete", &KeyRequest { key: key.into() }).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), BotError> {
        self.post("close", &serde_json::json!({})).await?;
        Ok(())
    }
}

/// Connector for the bridge gateway, resuming from stored credentials
pub struct BridgeConnector {
    http: Client,
    url: String,
    api_key: Option<String>,
    poll_timeout_secs: u64,
    instance: String,
    store: SessionStore,
}

impl BridgeConnector {
    pub fn new(bridge: &BridgeConfig, session: &SessionConfig) -> Result<Self, BotError> {
        let url = bridge
            .url
            .clone()
            .ok_or_else(|| BotError::Internal("bridge url is not configured".to_string()))?;

        Ok(Self {
            http: Client::new(),
            url,
            api_key: bridge.api_key.clone(),
            poll_timeout_secs: bridge.poll_timeout_secs,
            instance: session.instance.clone(),
            store: SessionStore::new(&session.dir),
        })
    }
}

#[async_trait]
impl Connector for BridgeConnector {
    async fn connect(&self) -> Result<Session, BotError> {
        self.store.init().await?;
        let credentials = self.store.load_credentials().await?.map(|stored| stored.credentials);
        if credentials.is_some() {
            tracing::info!("Resuming session {} from {}", self.instance, self.store.path().display());
        } else {
            tracing::info!("No stored session for {}, pairing required", self.instance);
        }

        let client = Arc::new(BridgeClient::new(
            self.http.clone(),
            &self.url,
            &self.instance,
            self.api_key.clone(),
        ));
        client.start(credentials.as_deref()).await?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(poll_events(client.clone(), tx, self.poll_timeout_secs));

        Ok(Session::new(client, rx))
    }

    async fn persist_credentials(&self, credentials: &str) -> Result<(), BotError> {
        self.store.save_credentials(&self.instance, credentials).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "bridge"
    }
}

/// Pump gateway events into the session channel until the session is dropped
async fn poll_events(client: Arc<BridgeClient>, tx: mpsc::Sender<SessionEvent>, timeout_secs: u64) {
    let mut offset = 0;
    let mut failures = 0;

    loop {
        let polled = tokio::select! {
            _ = tx.closed() => break,
            polled = client.poll(offset, timeout_secs) => polled,
        };

        match polled {
            Ok(batch) => {
                failures = 0;
                offset = batch.next_offset;
                for raw in batch.events {
                    match decode_event(raw) {
                        Ok(Some(event)) => {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Dropping malformed bridge event: {}", e),
                    }
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("Bridge poll failed ({}/{}): {}", failures, MAX_POLL_FAILURES, e);
                if failures >= MAX_POLL_FAILURES || matches!(e, BotError::Auth(_)) {
                    tracing::error!("Bridge unreachable, ending session");
                    break;
                }
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_layout() {
        let client = BridgeClient::new(Client::new(), "http://localhost:8080/", "sila-bot", None);
        assert_eq!(client.endpoint("messages/text"), "http://localhost:8080/session/sila-bot/messages/text");
    }

    #[test]
    fn test_connector_requires_url() {
        let bridge = BridgeConfig {
            enabled: true,
            url: None,
            api_key: None,
            poll_timeout_secs: 30,
        };
        assert!(BridgeConnector::new(&bridge, &SessionConfig::default()).is_err());
    }
}
