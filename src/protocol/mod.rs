//! Client side of the scoring terminals' binary TCP protocol.

pub mod client;
pub mod error;
pub mod frame;
pub mod payload;

pub use client::TerminalClient;
pub use error::{ErrorKind, TerminalError};
