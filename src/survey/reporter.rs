//! Assembles the completed survey into an admin-facing report plus the
//! deferred voice forwards, and delivers both best-effort.

use super::catalog::Catalog;
use super::render::THANK_YOU_TEXT;
use super::session::Session;
use crate::transport::{Transport, UserMeta};
use chrono::Utc;

const NO_ANSWER: &str = "no answer";
const NOT_SET: &str = "not set";

/// Instruction to relay one original voice message to the admin chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardAction {
    pub prompt: String,
    pub message_id: i64,
}

/// Formats the full answer set: requester identity block, then every catalog
/// question in order with its joined answers or an explicit no-answer marker.
pub fn build_report(user: &UserMeta, catalog: &Catalog, session: &Session) -> String {
    let username = user
        .username
        .as_deref()
        .map_or_else(|| NOT_SET.to_string(), |name| format!("@{name}"));
    let first_name = user.first_name.as_deref().unwrap_or(NOT_SET);

    let mut report = format!(
        "Survey completed at {}\n\nUser id: {}\nUsername: {username}\nName: {first_name}\n\nSurvey results:\n\n",
        Utc::now().to_rfc3339(),
        user.id,
    );

    for question in catalog.iter() {
        let answers = session.selected(question.id);
        let joined = if answers.is_empty() {
            NO_ANSWER.to_string()
        } else {
            answers.join(", ")
        };
        report.push_str(&format!("{}\nAnswer: {joined}\n\n", question.prompt));
    }

    report
}

/// One deferred forward per recorded voice answer, tagged with the prompt of
/// the question it answers.
pub fn forward_actions(catalog: &Catalog, session: &Session) -> Vec<ForwardAction> {
    session
        .pending_forwards
        .iter()
        .map(|forward| ForwardAction {
            prompt: catalog
                .get(forward.question_id)
                .map_or_else(|| format!("question {}", forward.question_id), |q| q.prompt.clone()),
            message_id: forward.message_id,
        })
        .collect()
}

/// Emits the report and all deferred forwards to the admin chat, then thanks
/// the user. Every send is best-effort: a failed delivery is logged and never
/// blocks the remaining sends or the user-facing acknowledgment.
pub async fn deliver(
    transport: &dyn Transport,
    admin_chat_id: i64,
    user_chat_id: i64,
    user: &UserMeta,
    catalog: &Catalog,
    session: &Session,
) {
    let report = build_report(user, catalog, session);
    if let Err(error) = transport.send_message(admin_chat_id, &report, None).await {
        tracing::warn!(user_id = user.id, %error, "failed to deliver survey report");
    }

    for action in forward_actions(catalog, session) {
        let caption = format!("Voice answer to the question:\n\n{}", action.prompt);
        if let Err(error) = transport.send_message(admin_chat_id, &caption, None).await {
            tracing::warn!(user_id = user.id, %error, "failed to send voice caption");
        }
        if let Err(error) = transport
            .forward_message(admin_chat_id, user_chat_id, action.message_id)
            .await
        {
            tracing::warn!(
                user_id = user.id,
                message_id = action.message_id,
                %error,
                "failed to forward voice message"
            );
        }
    }

    if let Err(error) = transport.send_message(user_chat_id, THANK_YOU_TEXT, None).await {
        tracing::warn!(user_id = user.id, %error, "failed to send closing acknowledgment");
    }
}
