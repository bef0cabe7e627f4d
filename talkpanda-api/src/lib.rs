//! HTTP transport for talkpanda
//!
//! Two independent backends are consumed: the application backend
//! ([`BackendClient`]) which stores sessions and history, and the AI
//! inference service ([`AiClient`]) which produces chat replies, grammar
//! feedback, and reply suggestions. Every response travels in a
//! success-flag envelope; both clients translate transport and envelope
//! failures into the typed [`ApiError`].

pub mod ai;
pub mod backend;
pub mod envelope;
pub mod error;
mod http;
pub mod speech;

pub use ai::{
    AccuracyReport, AiClient, ChatReply, ExampleReply, FeedbackResponse, ReviewWord, SessionReview,
};
pub use backend::{
    BackendClient, ConversationDetail, FinishSessionRequest, HistoryItem, ScriptEntry,
    SessionSummary, StartSessionResponse,
};
pub use envelope::ApiEnvelope;
pub use error::{ApiError, ApiResult};
pub use speech::{Accent, Gender, SttResult, TtsAudio, Voice};
