use super::TelegramTransport;
use crate::transport::traits::{Inbound, MessageBody, UserMeta};
use serde_json::Value;

impl TelegramTransport {
    /// Long-poll `getUpdates` and feed decoded events into `tx`. Runs until
    /// the receiving side goes away. Poll and parse failures are logged and
    /// retried after a short pause.
    pub async fn listen(&self, tx: tokio::sync::mpsc::Sender<Inbound>) -> anyhow::Result<()> {
        let mut offset: i64 = 0;

        tracing::info!("telegram transport listening for updates...");

        loop {
            let body = serde_json::json!({
                "offset": offset,
                "timeout": 30,
                "allowed_updates": ["message", "callback_query"]
            });

            let resp = match self
                .client
                .post(self.api_url("getUpdates"))
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("telegram poll error: {e}");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    continue;
                }
            };

            let data: Value = match resp.json().await {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("telegram parse error: {e}");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    continue;
                }
            };

            if let Some(results) = data.get("result").and_then(Value::as_array) {
                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                        offset = uid + 1;
                    }

                    let Some(inbound) = parse_update(update) else {
                        continue;
                    };

                    let user = inbound.user();
                    let user_id = user.id.to_string();
                    let mut identities = vec![user_id.as_str()];
                    if let Some(username) = user.username.as_deref() {
                        identities.push(username);
                    }
                    if !self.is_any_user_allowed(identities) {
                        tracing::warn!(
                            user_id = user.id,
                            username = user.username.as_deref().unwrap_or("unknown"),
                            "ignoring update from unauthorized user"
                        );
                        continue;
                    }

                    if tx.send(inbound).await.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Decode one `getUpdates` entry into an [`Inbound`] event. Updates without
/// a usable author or chat yield `None`.
pub fn parse_update(update: &Value) -> Option<Inbound> {
    if let Some(callback) = update.get("callback_query") {
        return parse_callback_query(callback);
    }
    if let Some(message) = update.get("message") {
        return parse_message(message);
    }
    None
}

fn parse_callback_query(callback: &Value) -> Option<Inbound> {
    let id = callback.get("id").and_then(Value::as_str)?.to_string();
    let data = callback.get("data").and_then(Value::as_str)?.to_string();
    let user = parse_user(callback.get("from")?)?;
    let message = callback.get("message")?;
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_i64)?;
    let message_id = message.get("message_id").and_then(Value::as_i64)?;

    Some(Inbound::CallbackQuery {
        id,
        data,
        chat_id,
        message_id,
        user,
    })
}

fn parse_message(message: &Value) -> Option<Inbound> {
    let user = parse_user(message.get("from")?)?;
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_i64)?;
    let message_id = message.get("message_id").and_then(Value::as_i64)?;

    if let Some(text) = message.get("text").and_then(Value::as_str) {
        if let Some(command) = parse_command(text) {
            return Some(Inbound::Command {
                chat_id,
                user,
                name: command,
            });
        }
        return Some(Inbound::Message {
            chat_id,
            message_id,
            user,
            body: MessageBody::Text(text.to_string()),
        });
    }

    if let Some(file_id) = message
        .get("voice")
        .and_then(|v| v.get("file_id"))
        .and_then(Value::as_str)
    {
        return Some(Inbound::Message {
            chat_id,
            message_id,
            user,
            body: MessageBody::Voice {
                file_id: file_id.to_string(),
            },
        });
    }

    Some(Inbound::Message {
        chat_id,
        message_id,
        user,
        body: MessageBody::Unsupported,
    })
}

fn parse_user(from: &Value) -> Option<UserMeta> {
    Some(UserMeta {
        id: from.get("id").and_then(Value::as_i64)?,
        username: from
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_string),
        first_name: from
            .get("first_name")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// `/start`, `/start@SomeBot`, and `/start args` all decode to `start`.
fn parse_command(text: &str) -> Option<String> {
    let stripped = text.strip_prefix('/')?;
    let word = stripped.split_whitespace().next()?;
    let name = word.split('@').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
