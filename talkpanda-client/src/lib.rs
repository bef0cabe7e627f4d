//! Conversation session client
//!
//! [`ConversationSessionClient`] sequences the network protocol for one
//! learning conversation: it owns the session identifier and transcript,
//! enforces the `Uninitialized → Active → Finished` lifecycle, and keeps
//! turn-mutating calls exclusive while letting annotation requests for
//! different turns run side by side. The presentation layer reads
//! snapshots; only the client writes.

pub mod error;
pub mod session_client;

pub use error::SessionError;
pub use session_client::{ConversationSessionClient, SessionClose, SessionStart};
