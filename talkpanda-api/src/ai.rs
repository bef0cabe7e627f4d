//! AI inference service client: chat, feedback, suggestions, review

use serde::{Deserialize, Serialize};

use talkpanda_core::config::AiServiceConfig;
use talkpanda_core::session::{Feedback, SessionId};

use crate::error::ApiResult;
use crate::http::Transport;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    text: &'a str,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// Assistant reply returned by `POST /api/ai/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub text: String,
}

#[derive(Debug, Serialize)]
struct FeedbackRequest<'a> {
    text: &'a str,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// Raw grammar-check result of `POST /api/ai/feedback`.
///
/// `natural` set (or no `corrected_en` at all) means the sentence was
/// accepted as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub corrected_en: Option<String>,
    #[serde(default)]
    pub reason_ko: Option<String>,
    #[serde(default)]
    pub natural: Option<bool>,
}

impl From<FeedbackResponse> for Feedback {
    fn from(response: FeedbackResponse) -> Self {
        if response.natural.unwrap_or(false) {
            return Feedback::accepted();
        }
        match response.corrected_en {
            Some(text) => Feedback::corrected(text, response.reason_ko.unwrap_or_default()),
            None => Feedback::accepted(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExampleReplyRequest<'a> {
    ai_text: &'a str,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// Candidate reply returned by `POST /api/ai/example-reply`
#[derive(Debug, Clone, Deserialize)]
pub struct ExampleReply {
    pub reply_example: String,
}

#[derive(Debug, Serialize)]
struct ReviewRequest<'a> {
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// Difficult-word review for a session (`POST /api/ai/review`)
#[derive(Debug, Clone, Deserialize)]
pub struct SessionReview {
    #[serde(default)]
    pub words: Vec<ReviewWord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewWord {
    pub word: String,
    #[serde(default)]
    pub meaning: Option<String>,
}

/// Pronunciation/grammar accuracy for a session (`GET /api/stats/accuracy`)
#[derive(Debug, Clone, Deserialize)]
pub struct AccuracyReport {
    pub accuracy: f64,
}

/// Client for the AI inference service
pub struct AiClient {
    pub(crate) transport: Transport,
}

impl AiClient {
    pub fn new(config: &AiServiceConfig) -> Self {
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

    /// Request an assistant reply to one user turn
    pub async fn chat(&self, text: &str, session_id: Option<&SessionId>) -> ApiResult<ChatReply> {
        self.transport
            .post_json(
                "/api/ai/chat",
                &ChatRequest {
                    text,
                    session_id: session_id.map(SessionId::as_str),
                },
            )
            .await
    }

    /// Request grammar feedback for a user sentence
    pub async fn feedback(
        &self,
        text: &str,
        session_id: Option<&SessionId>,
    ) -> ApiResult<FeedbackResponse> {
        self.transport
            .post_json(
                "/api/ai/feedback",
                &FeedbackRequest {
                    text,
                    session_id: session_id.map(SessionId::as_str),
                },
            )
            .await
    }

    /// Request one candidate reply to an assistant message
    pub async fn example_reply(
        &self,
        ai_text: &str,
        session_id: Option<&SessionId>,
    ) -> ApiResult<ExampleReply> {
        self.transport
            .post_json(
                "/api/ai/example-reply",
                &ExampleReplyRequest {
                    ai_text,
                    session_id: session_id.map(SessionId::as_str),
                },
            )
            .await
    }

    /// Clear the model's conversational context for a session.
    /// The endpoint takes the bare session id as a text/plain body.
    pub async fn reset(&self, session_id: Option<&SessionId>) -> ApiResult<()> {
        let body = session_id.map(|id| id.to_string()).unwrap_or_default();
        self.transport
            .post_text_ack("/api/conversation/reset", body)
            .await
    }

    /// Fetch the difficult-word review for a session
    pub async fn review(&self, session_id: Option<&SessionId>) -> ApiResult<SessionReview> {
        self.transport
            .post_json(
                "/api/ai/review",
                &ReviewRequest {
                    session_id: session_id.map(SessionId::as_str),
                },
            )
            .await
    }

    /// Fetch the accuracy score for a session
    pub async fn accuracy(&self, session_id: Option<&SessionId>) -> ApiResult<AccuracyReport> {
        let mut query = Vec::new();
        if let Some(id) = session_id {
            query.push(("sessionId", id.to_string()));
        }
        self.transport.get_json("/api/stats/accuracy", &query).await
    }
}
