//! Message pipeline integration tests
//! Run with: cargo test --test dispatcher_test

mod common;

use std::sync::Arc;

use async_trait::async_trait;

use common::{test_app, test_config, Call, RecordingClient, GROUP, OWNER, USER};
use sila_bot::application::errors::CommandError;
use sila_bot::application::messaging::{templates, CommandStatus, DispatchOutcome, MessageDispatcher};
use sila_bot::domain::entities::{Content, DeleteNotice, GroupAction, GroupParticipantsUpdate, InboundMessage, MessageKey};
use sila_bot::plugins::{CommandContext, Plugin};

fn dispatcher() -> MessageDispatcher {
    MessageDispatcher::new(".")
}

fn group_message(author: &str, id: &str, text: &str) -> InboundMessage {
    InboundMessage::new(
        MessageKey::new(GROUP, id).with_participant(author),
        Content::Text(text.to_string()),
    )
}

struct Broken;

#[async_trait]
impl Plugin for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn execute(&self, _ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        Err(CommandError::ExecutionFailed("boom".to_string()))
    }
}

struct Exploding;

#[async_trait]
impl Plugin for Exploding {
    fn name(&self) -> &str {
        "explode"
    }

    fn description(&self) -> &str {
        "Always panics"
    }

    async fn execute(&self, _ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        panic!("kaboom")
    }
}

#[tokio::test]
async fn test_own_messages_are_ignored() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();
    let mut message = InboundMessage::from_text(USER, ".ping");
    message.key = message.key.from_me();

    let outcome = dispatcher().dispatch(&mut app, &client, &message).await;

    assert_eq!(outcome, DispatchOutcome::Ignored);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_banned_user_gets_notice_only_for_commands() {
    let mut app = test_app(test_config());
    app.bans.add(USER, "spam", Some(OWNER));
    let client = RecordingClient::new();

    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(USER, ".ping"))
        .await;
    assert_eq!(outcome, DispatchOutcome::Banned { notified: true });
    let texts = client.texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, USER);
    assert!(texts[0].1.contains("YOU ARE BANNED"));
    assert!(texts[0].1.contains("spam"));

    client.clear();
    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(USER, "hello"))
        .await;
    assert_eq!(outcome, DispatchOutcome::Banned { notified: false });
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_auto_reply_short_circuits_commands() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();
    let message = InboundMessage::from_text(USER, "  Hi ");

    let outcome = dispatcher().dispatch(&mut app, &client, &message).await;

    assert_eq!(outcome, DispatchOutcome::AutoReplied);
    let texts = client.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].1.contains("@254711111111"));
    assert!(texts[0].1.contains("Sila MD"));
    assert!(client.calls().contains(&Call::Read(vec![message.key.id.clone()])));
    assert!(client
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Text { mentions, .. } if mentions == &vec![USER.to_string()])));
}

#[tokio::test]
async fn test_unknown_command_echoes_name() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();
    let message = InboundMessage::from_text(USER, ".Frobnicate now");

    let outcome = dispatcher().dispatch(&mut app, &client, &message).await;

    assert_eq!(outcome, DispatchOutcome::UnknownCommand("frobnicate".to_string()));
    assert!(client.calls().contains(&Call::Text {
        chat: USER.to_string(),
        text: templates::unknown_command("frobnicate", "."),
        quoted: Some(message.key.id.clone()),
        mentions: vec![],
    }));
}

#[tokio::test]
async fn test_commands_dispatch_case_insensitively() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();
    let message = InboundMessage::from_text(USER, ".PING");

    let outcome = dispatcher().dispatch(&mut app, &client, &message).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Command {
            name: "ping".to_string(),
            status: CommandStatus::Completed
        }
    );
    assert!(client.calls().contains(&Call::Reaction {
        id: message.key.id.clone(),
        emoji: "🏓".to_string()
    }));
}

#[tokio::test]
async fn test_plain_text_is_passive() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();

    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(USER, "just chatting"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Passive);
    assert!(client.texts().is_empty());
}

#[tokio::test]
async fn test_plugin_error_and_panic_get_generic_reply() {
    let mut app = test_app(test_config());
    app.registry.register(Arc::new(Broken));
    app.registry.register(Arc::new(Exploding));
    let client = RecordingClient::new();

    for command in [".broken", ".explode"] {
        client.clear();
        let outcome = dispatcher()
            .dispatch(&mut app, &client, &InboundMessage::from_text(USER, command))
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Command {
                status: CommandStatus::Failed,
                ..
            }
        ));
        let texts = client.texts();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].1, templates::command_failed());
    }

    // The dispatcher keeps working after a panic
    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(USER, ".alive"))
        .await;
    assert!(matches!(
        outcome,
        DispatchOutcome::Command {
            status: CommandStatus::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_owner_commands_are_gated() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();

    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(USER, ".ban 254722222222"))
        .await;
    assert_eq!(
        outcome,
        DispatchOutcome::Command {
            name: "ban".to_string(),
            status: CommandStatus::PermissionDenied
        }
    );
    assert_eq!(client.texts()[0].1, templates::permission_denied());
    assert!(app.bans.is_empty());
}

#[tokio::test]
async fn test_owner_ban_then_user_is_blocked() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();

    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(OWNER, ".ban 254711111111 flooding the chat"))
        .await;
    assert!(matches!(
        outcome,
        DispatchOutcome::Command {
            status: CommandStatus::Completed,
            ..
        }
    ));
    let record = app.bans.is_banned(USER).expect("user banned");
    assert_eq!(record.reason, "flooding the chat");
    assert_eq!(record.banned_by.as_deref(), Some(OWNER));

    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(USER, ".menu"))
        .await;
    assert_eq!(outcome, DispatchOutcome::Banned { notified: true });

    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(OWNER, ".ban"))
        .await;
    assert!(matches!(
        outcome,
        DispatchOutcome::Command {
            status: CommandStatus::InvalidArgs,
            ..
        }
    ));
}

#[tokio::test]
async fn test_anti_delete_replays_cached_message_once() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();
    let dispatcher = dispatcher();
    let message = InboundMessage::from_text(USER, "my secret plan");

    dispatcher.dispatch(&mut app, &client, &message).await;
    client.clear();

    let notice = DeleteNotice::Keys(vec![message.key.clone()]);
    assert_eq!(dispatcher.handle_delete(&mut app, &client, &notice).await, 1);
    let texts = client.texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, OWNER);
    assert!(texts[0].1.ends_with("my secret plan"));

    assert_eq!(dispatcher.handle_delete(&mut app, &client, &notice).await, 0);

    let unknown = DeleteNotice::Keys(vec![MessageKey::new(USER, "NOT-CACHED")]);
    assert_eq!(dispatcher.handle_delete(&mut app, &client, &unknown).await, 0);
    assert_eq!(client.texts().len(), 1);
}

#[tokio::test]
async fn test_failed_replay_keeps_message_and_continues() {
    let mut app = test_app(test_config());
    let client = RecordingClient::failing_texts(1);
    let dispatcher = dispatcher();
    let first = InboundMessage::from_text(USER, "plan A");
    let second = InboundMessage::from_text(USER, "plan B");
    app.anti_delete.store(&first);
    app.anti_delete.store(&second);

    let notice = DeleteNotice::Keys(vec![first.key.clone(), second.key.clone()]);
    assert_eq!(dispatcher.handle_delete(&mut app, &client, &notice).await, 1);

    let texts = client.texts();
    assert_eq!(texts.len(), 2);
    assert!(texts[1].1.ends_with("plan B"));
    assert!(app.anti_delete.cache().get(&first.key.id).is_some());
    assert!(app.anti_delete.cache().get(&second.key.id).is_none());

    // The kept message is replayed on the next notice
    assert_eq!(dispatcher.handle_delete(&mut app, &client, &notice).await, 1);
    assert!(client.texts()[2].1.ends_with("plan A"));
    assert!(app.anti_delete.cache().is_empty());
}

#[tokio::test]
async fn test_anti_delete_disabled() {
    let mut config = test_config();
    config.features.anti_delete = false;
    let mut app = test_app(config);
    let client = RecordingClient::new();
    let dispatcher = dispatcher();
    let message = InboundMessage::from_text(USER, "gone");

    dispatcher.dispatch(&mut app, &client, &message).await;
    let notice = DeleteNotice::Keys(vec![message.key.clone()]);

    assert_eq!(dispatcher.handle_delete(&mut app, &client, &notice).await, 0);
}

#[tokio::test]
async fn test_send_failures_do_not_abort_pipeline() {
    let mut app = test_app(test_config());
    let client = RecordingClient::failing();

    let outcome = dispatcher()
        .dispatch(&mut app, &client, &InboundMessage::from_text(USER, ".nothing"))
        .await;

    assert_eq!(outcome, DispatchOutcome::UnknownCommand("nothing".to_string()));
    assert_eq!(client.texts().len(), 1);
}

#[tokio::test]
async fn test_newsletter_posts_get_a_heart() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();
    let message = InboundMessage::from_text("120363999999999999@newsletter", "New episode out");

    dispatcher().dispatch(&mut app, &client, &message).await;

    assert!(client.calls().contains(&Call::Reaction {
        id: message.key.id.clone(),
        emoji: "❤️".to_string()
    }));
}

#[tokio::test]
async fn test_antilink_removes_links_in_enabled_groups() {
    let mut app = test_app(test_config());
    let client = RecordingClient::new();
    let dispatcher = dispatcher();

    let outcome = dispatcher
        .dispatch(&mut app, &client, &group_message(OWNER, "G1", ".antilink on"))
        .await;
    assert!(matches!(
        outcome,
        DispatchOutcome::Command {
            status: CommandStatus::Completed,
            ..
        }
    ));

    client.clear();
    dispatcher
        .dispatch(&mut app, &client, &group_message(USER, "G2", ".ping https://chat.whatsapp.com/AbCdEf"))
        .await;

    let calls = client.calls();
    assert!(calls.contains(&Call::Delete("G2".to_string())));
    assert!(client
        .texts()
        .iter()
        .any(|(chat, text)| chat == GROUP && text.contains("links are not allowed")));
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::Text { text, mentions, .. } if text.contains("links are not allowed") && mentions == &vec![USER.to_string()]
    )));
}

#[tokio::test]
async fn test_group_welcome_announcement() {
    let app = test_app(test_config());
    let client = RecordingClient::new();
    let update = GroupParticipantsUpdate {
        group_id: GROUP.to_string(),
        participants: vec![USER.to_string()],
        action: GroupAction::Add,
    };

    dispatcher().handle_group_update(&app, &client, &update).await;

    let texts = client.texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, GROUP);
    assert!(texts[0].1.contains("Welcome @254711111111"));
    assert!(matches!(
        &client.calls()[0],
        Call::Text { mentions, .. } if mentions == &vec![USER.to_string()]
    ));
}
