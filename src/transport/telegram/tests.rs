use super::*;
use crate::transport::traits::{Button, Inbound, Keyboard, MessageBody, Transport};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn api_url_includes_token_and_method() {
    let transport = TelegramTransport::new("123:ABC".into(), vec![]);
    assert_eq!(
        transport.api_url("getMe"),
        "https://api.telegram.org/bot123:ABC/getMe"
    );
}

// ── Allowlist ───────────────────────────────────────────────────

#[test]
fn user_allowed_wildcard() {
    let transport = TelegramTransport::new("t".into(), vec!["*".into()]);
    assert!(transport.is_user_allowed("anyone"));
}

#[test]
fn user_allowed_specific() {
    let transport = TelegramTransport::new("t".into(), vec!["alice".into(), "bob".into()]);
    assert!(transport.is_user_allowed("alice"));
    assert!(!transport.is_user_allowed("eve"));
}

#[test]
fn user_denied_empty_allowlist() {
    let transport = TelegramTransport::new("t".into(), vec![]);
    assert!(!transport.is_user_allowed("anyone"));
}

#[test]
fn user_exact_match_not_substring() {
    let transport = TelegramTransport::new("t".into(), vec!["alice".into()]);
    assert!(!transport.is_user_allowed("alice_bot"));
    assert!(!transport.is_user_allowed("malice"));
}

#[test]
fn empty_identity_denied_even_with_wildcard() {
    let transport = TelegramTransport::new("t".into(), vec!["*".into()]);
    assert!(!transport.is_user_allowed(""));
}

#[test]
fn user_allowed_by_numeric_id_identity() {
    let transport = TelegramTransport::new("t".into(), vec!["123456789".into()]);
    assert!(transport.is_any_user_allowed(["unknown", "123456789"]));
}

// ── Update parsing ──────────────────────────────────────────────

#[test]
fn parse_update_text_message() {
    let update = serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": {"id": 55},
            "from": {"id": 42, "username": "alice", "first_name": "Alice"},
            "text": "hello there"
        }
    });

    let Some(Inbound::Message {
        chat_id,
        message_id,
        user,
        body,
    }) = parse_update(&update)
    else {
        panic!("expected a message event");
    };
    assert_eq!(chat_id, 55);
    assert_eq!(message_id, 10);
    assert_eq!(user.id, 42);
    assert_eq!(user.username.as_deref(), Some("alice"));
    assert_eq!(body, MessageBody::Text("hello there".into()));
}

#[test]
fn parse_update_start_command() {
    let update = serde_json::json!({
        "update_id": 2,
        "message": {
            "message_id": 11,
            "chat": {"id": 55},
            "from": {"id": 42},
            "text": "/start@CanvassBot"
        }
    });

    let Some(Inbound::Command { name, .. }) = parse_update(&update) else {
        panic!("expected a command event");
    };
    assert_eq!(name, "start");
}

#[test]
fn parse_update_voice_message() {
    let update = serde_json::json!({
        "update_id": 3,
        "message": {
            "message_id": 12,
            "chat": {"id": 55},
            "from": {"id": 42},
            "voice": {"file_id": "AWACR123", "duration": 4}
        }
    });

    let Some(Inbound::Message { body, .. }) = parse_update(&update) else {
        panic!("expected a message event");
    };
    assert_eq!(
        body,
        MessageBody::Voice {
            file_id: "AWACR123".into()
        }
    );
}

#[test]
fn parse_update_sticker_is_unsupported() {
    let update = serde_json::json!({
        "update_id": 4,
        "message": {
            "message_id": 13,
            "chat": {"id": 55},
            "from": {"id": 42},
            "sticker": {"file_id": "STICK"}
        }
    });

    let Some(Inbound::Message { body, .. }) = parse_update(&update) else {
        panic!("expected a message event");
    };
    assert_eq!(body, MessageBody::Unsupported);
}

#[test]
fn parse_update_callback_query() {
    let update = serde_json::json!({
        "update_id": 5,
        "callback_query": {
            "id": "cb-777",
            "data": "0_1",
            "from": {"id": 42, "username": "alice"},
            "message": {"message_id": 14, "chat": {"id": 55}}
        }
    });

    let Some(Inbound::CallbackQuery {
        id,
        data,
        chat_id,
        message_id,
        user,
    }) = parse_update(&update)
    else {
        panic!("expected a callback event");
    };
    assert_eq!(id, "cb-777");
    assert_eq!(data, "0_1");
    assert_eq!(chat_id, 55);
    assert_eq!(message_id, 14);
    assert_eq!(user.id, 42);
}

#[test]
fn parse_update_without_sender_is_dropped() {
    let update = serde_json::json!({
        "update_id": 6,
        "message": {"message_id": 15, "chat": {"id": 55}, "text": "anonymous"}
    });
    assert!(parse_update(&update).is_none());
}

// ── Bot API calls (mock server) ─────────────────────────────────

fn transport_for(server: &MockServer) -> TelegramTransport {
    TelegramTransport::with_api_base("123:ABC".into(), vec!["*".into()], server.uri())
}

#[tokio::test]
async fn send_message_returns_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .and(body_partial_json(
            serde_json::json!({"chat_id": 5, "text": "hi"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"ok": true, "result": {"message_id": 77}}),
        ))
        .mount(&server)
        .await;

    let message_id = transport_for(&server)
        .send_message(5, "hi", None)
        .await
        .unwrap();
    assert_eq!(message_id, 77);
}

#[tokio::test]
async fn send_message_serializes_inline_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .and(body_partial_json(serde_json::json!({
            "reply_markup": {
                "inline_keyboard": [[{"text": "A", "callback_data": "0_0"}]]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"ok": true, "result": {"message_id": 1}}),
        ))
        .mount(&server)
        .await;

    let keyboard = Keyboard {
        rows: vec![vec![Button {
            label: "A".into(),
            data: "0_0".into(),
        }]],
    };
    let result = transport_for(&server)
        .send_message(5, "pick", Some(&keyboard))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn edit_message_targets_the_original_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/editMessageText"))
        .and(body_partial_json(
            serde_json::json!({"chat_id": 5, "message_id": 77, "text": "updated"}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": {}})),
        )
        .mount(&server)
        .await;

    let result = transport_for(&server).edit_message(5, 77, "updated", None).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn forward_message_sends_source_and_target_chats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/forwardMessage"))
        .and(body_partial_json(
            serde_json::json!({"chat_id": 999, "from_chat_id": 5, "message_id": 12}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": {}})),
        )
        .mount(&server)
        .await;

    let result = transport_for(&server).forward_message(999, 5, 12).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn answer_callback_acks_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/answerCallbackQuery"))
        .and(body_partial_json(
            serde_json::json!({"callback_query_id": "cb-777"}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": true})),
        )
        .mount(&server)
        .await;

    let result = transport_for(&server).answer_callback("cb-777").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn failed_delivery_surfaces_method_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .respond_with(ResponseTemplate::new(403).set_body_string("bot was blocked by the user"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .send_message(5, "hi", None)
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("sendMessage"));
    assert!(err.contains("403"));
}
