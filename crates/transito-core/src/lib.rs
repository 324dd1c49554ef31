//! Core domain of the transit reporting bot.
//!
//! Everything here is free of I/O: persistence and transport are reached
//! through the repository traits in [`catalog`], [`combo`] and [`session`].

pub mod aggregate;
pub mod catalog;
pub mod clock;
pub mod combo;
pub mod conversion;
pub mod error;
pub mod label;
pub mod line;
pub mod menus;
pub mod pin;
pub mod session;

pub use error::{Result, TransitoError};
