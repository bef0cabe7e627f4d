//! Transcript data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire value used in uploaded scripts (`from` field)
    pub fn as_script_from(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "ai",
        }
    }

    /// Parse the `from` field of a stored script. Unknown speakers are
    /// folded into `Assistant`, matching how the service labels them.
    pub fn from_script_from(from: &str) -> Self {
        match from {
            "user" => Role::User,
            _ => Role::Assistant,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// Client-assigned turn identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(Uuid);

impl TurnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Grammar feedback attached to a user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Whether the sentence needed a correction
    pub corrected: bool,
    /// Corrected sentence, present when `corrected`
    pub corrected_text: Option<String>,
    /// Natural-language explanation of the correction
    pub explanation: Option<String>,
}

impl Feedback {
    /// Sentence accepted as-is
    pub fn accepted() -> Self {
        Self {
            corrected: false,
            corrected_text: None,
            explanation: None,
        }
    }

    pub fn corrected(text: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            corrected: true,
            corrected_text: Some(text.into()),
            explanation: Some(explanation.into()),
        }
    }
}

/// One candidate reply the user could send next, attached to an assistant turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedReply {
    pub text: String,
}

impl SuggestedReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A single turn in the conversation.
///
/// `role` and `text` never change after creation; the annotation slots
/// are filled in later by the session client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<SuggestedReply>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            feedback: None,
            suggestion: None,
        }
    }
}

/// Ordered sequence of turns for one session.
///
/// Insertion order is request-initiation order; only the session client
/// appends or annotates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a prebuilt turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Append a turn and return its id
    pub fn push_turn(&mut self, role: Role, text: impl Into<String>) -> TurnId {
        let turn = Turn::new(role, text);
        let id = turn.id;
        self.turns.push(turn);
        id
    }

    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    /// Attach feedback to a turn. Returns false if the turn is unknown.
    pub fn set_feedback(&mut self, id: TurnId, feedback: Feedback) -> bool {
        match self.turns.iter_mut().find(|t| t.id == id) {
            Some(turn) => {
                turn.feedback = Some(feedback);
                true
            }
            None => false,
        }
    }

    /// Attach a suggested reply to a turn. Returns false if the turn is unknown.
    pub fn set_suggestion(&mut self, id: TurnId, suggestion: SuggestedReply) -> bool {
        match self.turns.iter_mut().find(|t| t.id == id) {
            Some(turn) => {
                turn.suggestion = Some(suggestion);
                true
            }
            None => false,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn_of(&self, role: Role) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == role)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push_turn(Role::User, "Hello");
        transcript.push_turn(Role::Assistant, "Hi there!");
        transcript.push_turn(Role::User, "How are you?");

        let roles: Vec<Role> = transcript.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(transcript.turns()[2].text, "How are you?");
    }

    #[test]
    fn test_set_feedback() {
        let mut transcript = Transcript::new();
        let id = transcript.push_turn(Role::User, "I goed home");

        assert!(transcript.set_feedback(id, Feedback::corrected("I went home", "past tense")));
        let turn = transcript.get(id).unwrap();
        let feedback = turn.feedback.as_ref().unwrap();
        assert!(feedback.corrected);
        assert_eq!(feedback.corrected_text.as_deref(), Some("I went home"));
    }

    #[test]
    fn test_set_feedback_unknown_turn() {
        let mut transcript = Transcript::new();
        assert!(!transcript.set_feedback(TurnId::new(), Feedback::accepted()));
    }

    #[test]
    fn test_last_turn_of() {
        let mut transcript = Transcript::new();
        transcript.push_turn(Role::User, "first");
        transcript.push_turn(Role::Assistant, "reply");
        let last_user = transcript.push_turn(Role::User, "second");

        assert_eq!(transcript.last_turn_of(Role::User).unwrap().id, last_user);
        assert_eq!(transcript.last_turn_of(Role::Assistant).unwrap().text, "reply");
    }

    #[test]
    fn test_script_from_mapping() {
        assert_eq!(Role::User.as_script_from(), "user");
        assert_eq!(Role::Assistant.as_script_from(), "ai");
        assert_eq!(Role::from_script_from("ai"), Role::Assistant);
        assert_eq!(Role::from_script_from("user"), Role::User);
        assert_eq!(Role::from_script_from("model"), Role::Assistant);
    }
}
