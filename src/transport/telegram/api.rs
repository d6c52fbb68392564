use super::TelegramTransport;
use crate::error::TransportError;
use crate::transport::traits::{Keyboard, Transport};
use anyhow::Context;
use async_trait::async_trait;

fn inline_markup(keyboard: &Keyboard) -> serde_json::Value {
    let rows: Vec<Vec<serde_json::Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    serde_json::json!({
                        "text": button.label,
                        "callback_data": button.data,
                    })
                })
                .collect()
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

impl TelegramTransport {
    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("telegram {method} request"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(TransportError::Delivery {
                method: method.to_string(),
                status: status.to_string(),
                body,
            }
            .into());
        }

        resp.json()
            .await
            .with_context(|| format!("telegram {method} response body"))
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<i64> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = inline_markup(keyboard);
        }

        let response = self.call("sendMessage", body).await?;
        response
            .get("result")
            .and_then(|r| r.get("message_id"))
            .and_then(serde_json::Value::as_i64)
            .context("sendMessage response missing message_id")
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<()> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = inline_markup(keyboard);
        }

        self.call("editMessageText", body).await.map(|_| ())
    }

    async fn forward_message(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "chat_id": to_chat_id,
            "from_chat_id": from_chat_id,
            "message_id": message_id,
        });

        self.call("forwardMessage", body).await.map(|_| ())
    }

    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()> {
        let body = serde_json::json!({ "callback_query_id": callback_id });
        self.call("answerCallbackQuery", body).await.map(|_| ())
    }
}
