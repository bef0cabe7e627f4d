//! Sequencing of the conversation-session protocol

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use talkpanda_api::{
    AiClient, BackendClient, FinishSessionRequest, ScriptEntry, SessionSummary,
};
use talkpanda_core::config::Config;
use talkpanda_core::session::{
    Feedback, Role, SessionId, SessionState, SuggestedReply, Transcript, Turn, TurnId,
};

use crate::error::SessionError;

/// Outcome of [`ConversationSessionClient::start_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
    /// The backend issued a session key
    Keyed(SessionId),
    /// Session creation failed; chat continues without a session key
    Sessionless,
}

/// Outcome of [`ConversationSessionClient::finish_session`]
#[derive(Debug, Clone)]
pub enum SessionClose {
    /// Transcript stored by the backend
    Persisted(SessionSummary),
    /// Sessionless conversation ended locally; nothing was uploaded
    Unpersisted,
}

struct SessionInner {
    state: SessionState,
    transcript: Transcript,
    /// Cached outcome once finished, so repeat calls stay no-ops
    close: Option<SessionClose>,
}

/// Client for one learning conversation.
///
/// Sole writer of the session identifier and transcript. Interior
/// mutability lets annotation requests for different turns proceed
/// concurrently; locks are never held across an await.
pub struct ConversationSessionClient {
    backend: BackendClient,
    ai: AiClient,
    inner: Mutex<SessionInner>,
    /// Turn-ordering gate: at most one chat turn in flight
    turn_in_flight: AtomicBool,
    /// Turns with an outstanding annotation request
    annotations_in_flight: Mutex<HashSet<TurnId>>,
}

impl ConversationSessionClient {
    pub fn new(backend: BackendClient, ai: AiClient) -> Self {
        Self {
            backend,
            ai,
            inner: Mutex::new(SessionInner {
                state: SessionState::Uninitialized,
                transcript: Transcript::new(),
                close: None,
            }),
            turn_in_flight: AtomicBool::new(false),
            annotations_in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(BackendClient::new(&config.backend), AiClient::new(&config.ai))
    }

    /// Establish a session with the backend.
    ///
    /// On success the client enters `Active` with the issued key. When
    /// the backend is unreachable or rejects the request, the client
    /// still enters `Active` without a key and returns
    /// [`SessionStart::Sessionless`] so chat can continue degraded.
    /// Calling again while `Active` replaces the session: new key,
    /// fresh transcript.
    pub async fn start_session(&self) -> Result<SessionStart, SessionError> {
        {
            let inner = self.inner.lock();
            if inner.state == SessionState::Finished {
                return Err(invalid_state("start_session", &inner.state));
            }
            if inner.state.is_active() {
                info!("start_session while active: replacing the current session");
            }
        }

        let start = match self.backend.start_session().await {
            Ok(response) => {
                let id = SessionId::new(response.session_id);
                info!(session_id = %id, "session started");
                SessionStart::Keyed(id)
            }
            Err(err) => {
                warn!(error = %err, "session start failed; continuing sessionless");
                SessionStart::Sessionless
            }
        };

        let mut inner = self.inner.lock();
        inner.state = SessionState::Active {
            session_id: match &start {
                SessionStart::Keyed(id) => Some(id.clone()),
                SessionStart::Sessionless => None,
            },
        };
        inner.transcript.clear();
        inner.close = None;
        self.annotations_in_flight.lock().clear();
        Ok(start)
    }

    /// Send one user turn and return the assistant's reply turn.
    ///
    /// Rejects a second call while one is pending; transcript order is
    /// therefore request-initiation order. A failed call leaves the
    /// transcript untouched.
    pub async fn send_turn(&self, user_text: &str) -> Result<Turn, SessionError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyTurnText);
        }

        let session_id = self.active_session_id("send_turn")?;
        let _gate = TurnGate::acquire(&self.turn_in_flight)?;

        let reply = self
            .ai
            .chat(text, session_id.as_ref())
            .await
            .map_err(SessionError::ChatRequestFailed)?;

        let mut inner = self.inner.lock();
        // The session may have been finished or reset while the reply was
        // pending; dropping the reply beats corrupting a closed transcript.
        if !inner.state.is_active() {
            return Err(invalid_state("send_turn", &inner.state));
        }
        let assistant_turn = Turn::new(Role::Assistant, reply.text);
        inner.transcript.push(Turn::new(Role::User, text));
        inner.transcript.push(assistant_turn.clone());
        debug!(turns = inner.transcript.len(), "turn exchanged");
        Ok(assistant_turn)
    }

    /// Request grammar feedback for a user turn.
    ///
    /// At most one outstanding request per turn; the duplicate caller
    /// gets [`SessionError::AnnotationAlreadyInFlight`] and no second
    /// network call is made. Re-requesting after completion replaces the
    /// stored record.
    pub async fn request_feedback(&self, turn_id: TurnId) -> Result<Feedback, SessionError> {
        let (text, session_id) = self.annotation_target(turn_id, Role::User, "request_feedback")?;
        let _guard = AnnotationGuard::acquire(&self.annotations_in_flight, turn_id)?;

        let response = self.ai.feedback(&text, session_id.as_ref()).await?;
        let feedback = Feedback::from(response);

        let mut inner = self.inner.lock();
        inner.transcript.set_feedback(turn_id, feedback.clone());
        Ok(feedback)
    }

    /// Request one candidate reply to an assistant turn.
    pub async fn request_suggestion(
        &self,
        turn_id: TurnId,
    ) -> Result<SuggestedReply, SessionError> {
        let (text, session_id) =
            self.annotation_target(turn_id, Role::Assistant, "request_suggestion")?;
        let _guard = AnnotationGuard::acquire(&self.annotations_in_flight, turn_id)?;

        let response = self.ai.example_reply(&text, session_id.as_ref()).await?;
        let suggestion = SuggestedReply::new(response.reply_example);

        let mut inner = self.inner.lock();
        inner.transcript.set_suggestion(turn_id, suggestion.clone());
        Ok(suggestion)
    }

    /// Upload the accumulated transcript and close the session.
    ///
    /// Succeeding transitions to `Finished`; the session key becomes
    /// invalid for further turns. Calling again after success is a
    /// warn-logged no-op returning the stored outcome, never a second
    /// submission. A failed upload leaves the session `Active` so the
    /// caller can retry explicitly.
    pub async fn finish_session(&self) -> Result<SessionClose, SessionError> {
        let request = {
            let inner = self.inner.lock();
            match &inner.state {
                SessionState::Uninitialized => {
                    return Err(invalid_state("finish_session", &inner.state))
                }
                SessionState::Finished => {
                    warn!("finish_session called after completion; returning stored outcome");
                    return Ok(inner.close.clone().unwrap_or(SessionClose::Unpersisted));
                }
                SessionState::Active { session_id } => session_id.clone().map(|id| {
                    FinishSessionRequest {
                        session_id: id,
                        script: inner
                            .transcript
                            .turns()
                            .iter()
                            .map(ScriptEntry::from_turn)
                            .collect(),
                    }
                }),
            }
        };

        let close = match request {
            Some(request) => {
                let summary = self.backend.finish_session(&request).await?;
                info!(
                    session_id = %request.session_id,
                    turns = request.script.len(),
                    "session persisted"
                );
                SessionClose::Persisted(summary)
            }
            None => {
                warn!("finishing a sessionless conversation; transcript not persisted");
                SessionClose::Unpersisted
            }
        };

        let mut inner = self.inner.lock();
        inner.state = SessionState::Finished;
        inner.close = Some(close.clone());
        Ok(close)
    }

    /// Clear the server-side conversational context without persisting.
    ///
    /// With `None` the current session is targeted and the local
    /// transcript is cleared too; an explicit id is a pass-through that
    /// leaves local state alone.
    pub async fn reset_session(&self, session_id: Option<&SessionId>) -> Result<(), SessionError> {
        let target = match session_id {
            Some(id) => Some(id.clone()),
            None => self.active_session_id("reset_session")?,
        };

        self.ai.reset(target.as_ref()).await?;

        if session_id.is_none() {
            let mut inner = self.inner.lock();
            inner.transcript.clear();
            self.annotations_in_flight.lock().clear();
            info!("session context reset; transcript cleared");
        }
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    /// Current session key, if any
    pub fn session_id(&self) -> Option<SessionId> {
        match &self.inner.lock().state {
            SessionState::Active { session_id } => session_id.clone(),
            _ => None,
        }
    }

    /// Snapshot of the transcript
    pub fn transcript(&self) -> Transcript {
        self.inner.lock().transcript.clone()
    }

    /// Snapshot of one turn
    pub fn turn(&self, turn_id: TurnId) -> Option<Turn> {
        self.inner.lock().transcript.get(turn_id).cloned()
    }

    /// The application-backend client (history, deletion)
    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// The AI-service client (review, accuracy, speech contracts)
    pub fn ai(&self) -> &AiClient {
        &self.ai
    }

    fn active_session_id(
        &self,
        operation: &'static str,
    ) -> Result<Option<SessionId>, SessionError> {
        let inner = self.inner.lock();
        match &inner.state {
            SessionState::Active { session_id } => Ok(session_id.clone()),
            other => Err(invalid_state(operation, other)),
        }
    }

    fn annotation_target(
        &self,
        turn_id: TurnId,
        expected: Role,
        operation: &'static str,
    ) -> Result<(String, Option<SessionId>), SessionError> {
        let inner = self.inner.lock();
        let session_id = match &inner.state {
            SessionState::Active { session_id } => session_id.clone(),
            other => return Err(invalid_state(operation, other)),
        };
        let turn = inner
            .transcript
            .get(turn_id)
            .ok_or(SessionError::UnknownTurn(turn_id))?;
        if turn.role != expected {
            return Err(SessionError::AnnotationTargetMismatch {
                turn: turn_id,
                expected,
                actual: turn.role,
            });
        }
        Ok((turn.text.clone(), session_id))
    }
}

fn invalid_state(operation: &'static str, state: &SessionState) -> SessionError {
    SessionError::InvalidSessionState {
        operation,
        state: state.name(),
    }
}

/// RAII gate for the one-chat-turn-at-a-time rule
struct TurnGate<'a>(&'a AtomicBool);

impl<'a> TurnGate<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            Ok(Self(flag))
        } else {
            Err(SessionError::TurnAlreadyInFlight)
        }
    }
}

impl Drop for TurnGate<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// RAII marker for an outstanding annotation request on one turn
struct AnnotationGuard<'a> {
    set: &'a Mutex<HashSet<TurnId>>,
    id: TurnId,
}

impl<'a> AnnotationGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<TurnId>>, id: TurnId) -> Result<Self, SessionError> {
        if set.lock().insert(id) {
            Ok(Self { set, id })
        } else {
            Err(SessionError::AnnotationAlreadyInFlight(id))
        }
    }
}

impl Drop for AnnotationGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}
