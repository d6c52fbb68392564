pub mod telegram;
pub mod traits;

pub use telegram::TelegramTransport;
pub use traits::{Button, Inbound, Keyboard, MessageBody, Transport, UserMeta};
