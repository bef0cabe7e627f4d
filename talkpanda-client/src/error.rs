//! Session client errors

use talkpanda_api::ApiError;
use talkpanda_core::session::{Role, TurnId};
use thiserror::Error;

/// Failures surfaced to the presentation layer.
///
/// A closed set: nothing below this leaks raw transport errors into
/// rendering code.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation attempted outside the state that allows it
    #[error("{operation} is not allowed while the session is {state}")]
    InvalidSessionState {
        operation: &'static str,
        state: &'static str,
    },

    /// A chat turn is still awaiting its reply
    #[error("a chat turn is already in flight")]
    TurnAlreadyInFlight,

    /// An annotation request for this turn is still outstanding
    #[error("an annotation request for turn {0} is already in flight")]
    AnnotationAlreadyInFlight(TurnId),

    /// Feedback targets user turns, suggestions target assistant turns
    #[error("turn {turn} is a {actual} turn; a {expected} turn is required")]
    AnnotationTargetMismatch {
        turn: TurnId,
        expected: Role,
        actual: Role,
    },

    /// Turn text was empty after trimming
    #[error("turn text must not be empty")]
    EmptyTurnText,

    /// No turn with this id in the transcript
    #[error("unknown turn: {0}")]
    UnknownTurn(TurnId),

    /// The chat call itself failed; the transcript was left untouched
    #[error("chat request failed: {0}")]
    ChatRequestFailed(#[source] ApiError),

    /// A non-chat backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}
