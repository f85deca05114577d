//! Bridge wire format - Baileys-shaped JSON exchanged with the gateway

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::domain::entities::{
    ConnectionStatus, ConnectionUpdate, Content, DeleteNotice, DisconnectReason, GroupAction,
    GroupParticipantsUpdate, InboundMessage, MessageKey, SessionEvent,
};

/// One long-poll response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBatch {
    #[serde(default)]
    pub events: Vec<RawEvent>,
    pub next_offset: i64,
}

/// Event envelope; `data` is decoded per event name
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireKey {
    pub remote_jid: String,
    #[serde(default)]
    pub from_me: bool,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
}

impl From<WireKey> for MessageKey {
    fn from(key: WireKey) -> Self {
        MessageKey {
            chat_id: key.remote_jid,
            from_me: key.from_me,
            id: key.id,
            participant: key.participant,
        }
    }
}

impl From<&MessageKey> for WireKey {
    fn from(key: &MessageKey) -> Self {
        WireKey {
            remote_jid: key.chat_id.clone(),
            from_me: key.from_me,
            id: key.id.clone(),
            participant: key.participant.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConnectionUpdate {
    connection: Option<String>,
    last_disconnect: Option<WireDisconnect>,
    qr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDisconnect {
    status_code: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireUpsert {
    messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub key: WireKey,
    pub message: Option<WireContent>,
    pub message_timestamp: Option<WireTimestamp>,
    pub push_name: Option<String>,
}

/// `messageTimestamp` arrives as a number, a numeric string or a protobuf Long
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Seconds(i64),
    Text(String),
    Long { low: i64, high: i64 },
    Other(serde_json::Value),
}

impl WireTimestamp {
    pub fn seconds(&self) -> Option<i64> {
        match self {
            Self::Seconds(secs) => Some(*secs),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Long { low, high } => Some((*high << 32) | (*low as u32 as i64)),
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContent {
    pub conversation: Option<String>,
    pub extended_text_message: Option<WireExtendedText>,
    pub image_message: Option<WireMedia>,
    pub video_message: Option<WireMedia>,
    pub audio_message: Option<WireMedia>,
    pub document_message: Option<WireMedia>,
    pub sticker_message: Option<WireMedia>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireExtendedText {
    pub text: String,
    pub context_info: Option<WireContextInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContextInfo {
    #[serde(default)]
    pub mentioned_jid: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMedia {
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireDelete {
    keys: Option<Vec<WireKey>>,
    jid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireGroupParticipants {
    id: String,
    participants: Vec<String>,
    action: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WireCreds {
    credentials: String,
}

impl WireContent {
    fn into_content(self) -> Content {
        if let Some(text) = self.conversation {
            return Content::Text(text);
        }
        if let Some(ext) = self.extended_text_message {
            let mentions = ext.context_info.map(|c| c.mentioned_jid).unwrap_or_default();
            return Content::ExtendedText { text: ext.text, mentions };
        }

        let media = [
            ("image", self.image_message),
            ("video", self.video_message),
            ("audio", self.audio_message),
            ("document", self.document_message),
            ("sticker", self.sticker_message),
        ];
        media
            .into_iter()
            .find_map(|(kind, media)| {
                media.map(|m| Content::Media {
                    kind: kind.to_string(),
                    caption: m.caption,
                })
            })
            .unwrap_or(Content::Empty)
    }
}

impl From<WireMessage> for InboundMessage {
    fn from(msg: WireMessage) -> Self {
        let content = msg.message.map(WireContent::into_content).unwrap_or(Content::Empty);
        let timestamp: DateTime<Utc> = msg
            .message_timestamp
            .as_ref()
            .and_then(WireTimestamp::seconds)
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        InboundMessage {
            key: msg.key.into(),
            content,
            timestamp,
            push_name: msg.push_name,
        }
    }
}

fn data<T: serde::de::DeserializeOwned>(raw: RawEvent) -> Result<T, BotError> {
    serde_json::from_value(raw.data).map_err(|e| BotError::Parse(format!("{} payload: {}", raw.event, e)))
}

/// Decode one envelope. `Ok(None)` for events the bot does not consume.
pub fn decode_event(raw: RawEvent) -> Result<Option<SessionEvent>, BotError> {
    let event = match raw.event.as_str() {
        "connection.update" => {
            let update: WireConnectionUpdate = data(raw)?;
            let connection = match update.connection.as_deref() {
                Some("open") => Some(ConnectionStatus::Open),
                Some("close") => Some(ConnectionStatus::Close),
                Some("connecting") => Some(ConnectionStatus::Connecting),
                _ => None,
            };
            SessionEvent::Connection(ConnectionUpdate {
                connection,
                last_disconnect: update
                    .last_disconnect
                    .and_then(|d| d.status_code)
                    .map(DisconnectReason::from_status_code),
                qr: update.qr,
            })
        }
        "messages.upsert" => {
            let upsert: WireUpsert = data(raw)?;
            SessionEvent::MessagesUpsert(upsert.messages.into_iter().map(InboundMessage::from).collect())
        }
        "messages.delete" => {
            let delete: WireDelete = data(raw)?;
            match (delete.keys, delete.jid) {
                (Some(keys), _) => SessionEvent::MessagesDelete(DeleteNotice::Keys(
                    keys.into_iter().map(MessageKey::from).collect(),
                )),
                (None, Some(jid)) => SessionEvent::MessagesDelete(DeleteNotice::Chat(jid)),
                (None, None) => return Err(BotError::Parse("messages.delete without keys or jid".to_string())),
            }
        }
        "group-participants.update" => {
            let update: WireGroupParticipants = data(raw)?;
            let Some(action) = GroupAction::parse(&update.action) else {
                tracing::debug!("Skipping group action {}", update.action);
                return Ok(None);
            };
            SessionEvent::GroupParticipants(GroupParticipantsUpdate {
                group_id: update.id,
                participants: update.participants,
                action,
            })
        }
        "creds.update" => {
            let creds: WireCreds = data(raw)?;
            SessionEvent::CredentialsUpdate(creds.credentials)
        }
        other => {
            tracing::debug!("Skipping bridge event {}", other);
            return Ok(None);
        }
    };
    Ok(Some(event))
}

// Outbound request bodies

#[derive(Debug, Serialize)]
pub struct StartRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted: Option<WireKey>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub mentions: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct SendResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ReactionRequest<'a> {
    pub key: WireKey,
    pub emoji: &'a str,
}

#[derive(Debug, Serialize)]
pub struct KeysRequest {
    pub keys: Vec<WireKey>,
}

#[derive(Debug, Serialize)]
pub struct KeyRequest {
    pub key: WireKey,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRequest<'a> {
    pub chat_id: &'a str,
    pub presence: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TextRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct JidRequest<'a> {
    pub jid: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(event: &str, data: serde_json::Value) -> RawEvent {
        RawEvent {
            event: event.to_string(),
            data,
        }
    }

    #[test]
    fn test_decode_connection_close() {
        let event = decode_event(raw(
            "connection.update",
            json!({"connection": "close", "lastDisconnect": {"statusCode": 401}}),
        ))
        .unwrap()
        .unwrap();

        match event {
            SessionEvent::Connection(update) => {
                assert_eq!(update.connection, Some(ConnectionStatus::Close));
                assert_eq!(update.last_disconnect, Some(DisconnectReason::LoggedOut));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_decode_qr_only_update() {
        let event = decode_event(raw("connection.update", json!({"qr": "2@abc"}))).unwrap().unwrap();
        assert!(matches!(event, SessionEvent::Connection(ref u) if u.qr.as_deref() == Some("2@abc") && u.connection.is_none()));
    }

    #[test]
    fn test_decode_upsert_content_kinds() {
        let event = decode_event(raw(
            "messages.upsert",
            json!({"messages": [
                {"key": {"remoteJid": "111@s.whatsapp.net", "id": "A1"}, "message": {"conversation": ".ping"}, "messageTimestamp": 1700000000, "pushName": "Amani"},
                {"key": {"remoteJid": "222@g.us", "id": "A2", "participant": "333@s.whatsapp.net"},
                 "message": {"extendedTextMessage": {"text": "hi @444", "contextInfo": {"mentionedJid": ["444@s.whatsapp.net"]}}}},
                {"key": {"remoteJid": "111@s.whatsapp.net", "id": "A3", "fromMe": true}, "message": {"imageMessage": {"caption": "look"}}},
                {"key": {"remoteJid": "111@s.whatsapp.net", "id": "A4"}}
            ]}),
        ))
        .unwrap()
        .unwrap();

        let SessionEvent::MessagesUpsert(messages) = event else {
            panic!("expected upsert");
        };
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].text(), ".ping");
        assert_eq!(messages[0].push_name.as_deref(), Some("Amani"));
        assert_eq!(messages[0].timestamp.timestamp(), 1_700_000_000);
        assert_eq!(messages[1].sender(), "333@s.whatsapp.net");
        assert_eq!(messages[1].content.mentions(), ["444@s.whatsapp.net".to_string()]);
        assert!(messages[2].key.from_me);
        assert_eq!(messages[2].content.describe(), "[image] look");
        assert!(messages[3].content.is_empty());
    }

    #[test]
    fn test_decode_timestamp_shapes() {
        let event = decode_event(raw(
            "messages.upsert",
            json!({"messages": [
                {"key": {"remoteJid": "111@s.whatsapp.net", "id": "T1"}, "message": {"conversation": "a"}, "messageTimestamp": "1700000000"},
                {"key": {"remoteJid": "111@s.whatsapp.net", "id": "T2"}, "message": {"conversation": "b"}, "messageTimestamp": {"low": 1700000000, "high": 0, "unsigned": true}},
                {"key": {"remoteJid": "111@s.whatsapp.net", "id": "T3"}, "message": {"conversation": ".ping"}, "messageTimestamp": [1, 2]}
            ]}),
        ))
        .unwrap()
        .unwrap();

        let SessionEvent::MessagesUpsert(messages) = event else {
            panic!("expected upsert");
        };
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].timestamp.timestamp(), 1_700_000_000);
        assert_eq!(messages[1].timestamp.timestamp(), 1_700_000_000);
        assert_eq!(messages[2].text(), ".ping");
        assert!(messages[2].timestamp.timestamp() > 1_700_000_000);
    }

    #[test]
    fn test_long_timestamp_with_negative_low_word() {
        let ts = WireTimestamp::Long { low: -1, high: 0 };
        assert_eq!(ts.seconds(), Some(u32::MAX as i64));
    }

    #[test]
    fn test_decode_delete_and_group_events() {
        let delete = decode_event(raw(
            "messages.delete",
            json!({"keys": [{"remoteJid": "111@s.whatsapp.net", "id": "A1"}]}),
        ))
        .unwrap()
        .unwrap();
        assert!(matches!(delete, SessionEvent::MessagesDelete(DeleteNotice::Keys(ref keys)) if keys[0].id == "A1"));

        let group = decode_event(raw(
            "group-participants.update",
            json!({"id": "222@g.us", "participants": ["333@s.whatsapp.net"], "action": "add"}),
        ))
        .unwrap()
        .unwrap();
        assert!(matches!(group, SessionEvent::GroupParticipants(ref u) if u.action == GroupAction::Add));
    }

    #[test]
    fn test_unknown_and_malformed_events() {
        assert!(decode_event(raw("presence.update", json!({}))).unwrap().is_none());
        assert!(decode_event(raw("messages.upsert", json!({"messages": "nope"}))).is_err());
    }

    #[test]
    fn test_event_batch_parses() {
        let batch: EventBatch = serde_json::from_value(json!({
            "events": [{"event": "creds.update", "data": {"credentials": "abc"}}],
            "nextOffset": 42
        }))
        .unwrap();
        assert_eq!(batch.next_offset, 42);
        let event = decode_event(batch.events[0].clone()).unwrap().unwrap();
        assert!(matches!(event, SessionEvent::CredentialsUpdate(ref c) if c == "abc"));
    }
}
