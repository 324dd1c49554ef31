//! Transit session domain: state, events, and the state machine driving them.

mod batch;
mod event;
mod locks;
mod machine;
mod model;
mod store;
mod token;

pub use batch::{BatchFields, BatchRecord};
pub use event::{Choice, InboundEvent, InboundKind, OutboundMessage};
pub use locks::ChatLocks;
pub use machine::{ComboResolution, LabelOutcome, PipelineOptions, SessionStateMachine};
pub use model::{ChatId, Session, Step};
pub use store::SessionStore;
pub use token::Token;
