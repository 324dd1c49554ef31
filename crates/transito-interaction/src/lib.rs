//! Chat platform transport for transito.

pub mod backoff;
pub mod telegram;
pub mod transport;

pub use backoff::Backoff;
pub use telegram::TelegramClient;
pub use transport::{ChatTransport, IncomingUpdate};
