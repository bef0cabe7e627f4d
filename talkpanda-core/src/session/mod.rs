//! Session data model for one learning conversation
//!
//! A session is an ordered transcript of user/assistant turns plus the
//! lifecycle state the session client enforces. Turn text is immutable
//! once appended; the optional annotations are the only mutable part.

pub mod state;
pub mod transcript;

pub use state::{SessionId, SessionState};
pub use transcript::{Feedback, Role, SuggestedReply, Transcript, Turn, TurnId};
