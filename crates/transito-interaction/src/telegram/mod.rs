mod client;
mod types;

pub use client::TelegramClient;
pub use types::{CallbackQuery, Chat, MAX_MESSAGE_CHARS, Message, Update};
