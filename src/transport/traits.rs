use async_trait::async_trait;

/// An inline keyboard: rows of labelled buttons carrying callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

/// Identity metadata of the message author, carried into the admin report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMeta {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Voice { file_id: String },
    /// Anything the survey cannot record (stickers, photos, ...).
    Unsupported,
}

/// A decoded inbound update from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A slash command such as `/start`, with the leading slash stripped.
    Command {
        chat_id: i64,
        user: UserMeta,
        name: String,
    },
    /// An inline-button tap. `id` is unique per physical tap.
    CallbackQuery {
        id: String,
        data: String,
        chat_id: i64,
        message_id: i64,
        user: UserMeta,
    },
    Message {
        chat_id: i64,
        message_id: i64,
        user: UserMeta,
        body: MessageBody,
    },
}

impl Inbound {
    pub fn user(&self) -> &UserMeta {
        match self {
            Inbound::Command { user, .. }
            | Inbound::CallbackQuery { user, .. }
            | Inbound::Message { user, .. } => user,
        }
    }

    pub fn chat_id(&self) -> i64 {
        match self {
            Inbound::Command { chat_id, .. }
            | Inbound::CallbackQuery { chat_id, .. }
            | Inbound::Message { chat_id, .. } => *chat_id,
        }
    }
}

/// Outbound side of the chat platform. The conversation core only ever talks
/// to this trait; the Telegram client is one implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message, optionally with an inline keyboard. Returns the id of
    /// the sent message so keyboards can be edited later.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<i64>;

    /// Replace the text and keyboard of a previously sent message.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<()>;

    /// Relay an original message (used for voice answers) to another chat.
    async fn forward_message(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> anyhow::Result<()>;

    /// Acknowledge a callback query so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()>;
}
