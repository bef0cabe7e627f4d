//! Application backend client: session storage, history, deletion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talkpanda_core::config::BackendConfig;
use talkpanda_core::session::{Role, SessionId, Turn};

use crate::error::ApiResult;
use crate::http::Transport;

/// Response of `POST /api/conversation/start`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: String,
}

/// One `{from, text}` line of an uploaded or stored script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub from: String,
    pub text: String,
}

impl ScriptEntry {
    pub fn from_turn(turn: &Turn) -> Self {
        Self {
            from: turn.role.as_script_from().to_string(),
            text: turn.text.clone(),
        }
    }

    pub fn role(&self) -> Role {
        Role::from_script_from(&self.from)
    }
}

/// Body of `POST /api/conversation/finish`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishSessionRequest {
    pub session_id: SessionId,
    pub script: Vec<ScriptEntry>,
}

/// Persisted-session summary returned by finish and listed by history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub turns: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// One row of `GET /api/conversation/history`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub turns: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Full stored conversation returned by `GET /api/conversation/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub session_id: String,
    pub script: Vec<ScriptEntry>,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    all: Option<bool>,
}

/// Client for the application backend
pub struct BackendClient {
    transport: Transport,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        let mut transport = Transport::new(&config.base_url, config.timeout_secs);
        transport.set_auth_token(config.auth_token.clone());
        Self { transport }
    }

    /// Replace the bearer token used for subsequent requests
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.transport.set_auth_token(token);
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Create a new conversation session
    pub async fn start_session(&self) -> ApiResult<StartSessionResponse> {
        self.transport
            .post_json("/api/conversation/start", &serde_json::json!({}))
            .await
    }

    /// Upload the full transcript and persist the session
    pub async fn finish_session(&self, request: &FinishSessionRequest) -> ApiResult<SessionSummary> {
        self.transport
            .post_json("/api/conversation/finish", request)
            .await
    }

    /// Page through stored session summaries
    pub async fn history(&self, page: u32, limit: u32) -> ApiResult<Vec<HistoryItem>> {
        self.transport
            .get_json(
                "/api/conversation/history",
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await
    }

    /// Fetch one stored conversation with its script
    pub async fn conversation(&self, session_id: &SessionId) -> ApiResult<ConversationDetail> {
        self.transport
            .get_json(&format!("/api/conversation/{}", session_id), &[])
            .await
    }

    /// Delete one stored conversation
    pub async fn delete_conversation(&self, session_id: &SessionId) -> ApiResult<()> {
        self.transport
            .delete_json_ack(
                "/api/conversation/delete",
                &DeleteRequest {
                    session_id: Some(session_id.to_string()),
                    ..Default::default()
                },
            )
            .await
    }

    /// Delete every stored conversation
    pub async fn delete_all(&self) -> ApiResult<()> {
        self.transport
            .delete_json_ack(
                "/api/conversation/delete",
                &DeleteRequest {
                    all: Some(true),
                    ..Default::default()
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_entry_from_turn() {
        let user = Turn::new(Role::User, "Hello");
        let assistant = Turn::new(Role::Assistant, "Hi!");

        let entry = ScriptEntry::from_turn(&user);
        assert_eq!(entry.from, "user");
        assert_eq!(entry.role(), Role::User);

        let entry = ScriptEntry::from_turn(&assistant);
        assert_eq!(entry.from, "ai");
        assert_eq!(entry.role(), Role::Assistant);
    }

    #[test]
    fn test_finish_request_wire_shape() {
        let request = FinishSessionRequest {
            session_id: SessionId::new("sess-1"),
            script: vec![ScriptEntry {
                from: "user".to_string(),
                text: "Hello".to_string(),
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["sessionId"], "sess-1");
        assert_eq!(value["script"][0]["from"], "user");
        assert_eq!(value["script"][0]["text"], "Hello");
    }

    #[test]
    fn test_delete_request_shapes() {
        let one = DeleteRequest {
            session_id: Some("sess-1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&one).unwrap(),
            r#"{"sessionId":"sess-1"}"#
        );

        let all = DeleteRequest {
            all: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&all).unwrap(), r#"{"all":true}"#);
    }

    #[test]
    fn test_history_item_tolerates_missing_fields() {
        let item: HistoryItem =
            serde_json::from_str(r#"{"sessionId": "sess-9"}"#).unwrap();
        assert_eq!(item.session_id, "sess-9");
        assert_eq!(item.turns, 0);
        assert!(item.title.is_none());
    }
}
