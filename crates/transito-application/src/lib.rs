//! Application layer for transito.
//!
//! Coordinates the core state machine with storage and the chat transport:
//! menu and setup dialogue, the polling loop and the idle-session sweeper.

pub mod bootstrap;
pub mod bot;
pub mod dialogue;
pub mod sweeper;

pub use bootstrap::AppContext;
pub use bot::BotRunner;
pub use dialogue::DialogueService;
pub use sweeper::spawn_session_sweeper;
