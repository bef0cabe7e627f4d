//! Speech call contracts: text-to-speech and speech-to-text.
//!
//! These are external-collaborator interfaces only. The client uploads
//! raw PCM and downs base64 audio; capture, codecs, and playback live
//! outside this crate.

use base64::Engine;
use serde::{Deserialize, Serialize};

use talkpanda_core::config::SpeechConfig;

use crate::ai::AiClient;
use crate::error::{ApiError, ApiResult};

/// Voice accent offered by the TTS service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    Us,
    Uk,
    Au,
}

impl Accent {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "us" => Some(Accent::Us),
            "uk" => Some(Accent::Uk),
            "au" => Some(Accent::Au),
            _ => None,
        }
    }
}

/// Voice gender offered by the TTS service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    #[default]
    Female,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Voice selection resolved from [`SpeechConfig`]; unknown values fall
/// back to the defaults the config validator would have rejected anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct Voice {
    pub accent: Accent,
    pub gender: Gender,
}

impl From<&SpeechConfig> for Voice {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            accent: Accent::parse(&config.accent).unwrap_or_default(),
            gender: Gender::parse(&config.gender).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    accent: Accent,
    gender: Gender,
}

/// Synthesized audio returned by `POST /api/ai/tts`
#[derive(Debug, Clone, Deserialize)]
pub struct TtsAudio {
    /// Base64-encoded audio payload
    pub audio: String,
}

impl TtsAudio {
    pub fn decode(&self) -> ApiResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.audio)
            .map_err(|e| ApiError::InvalidResponse(format!("audio decode failed: {}", e)))
    }
}

/// Transcription returned by `POST /api/stt/recognize`
#[derive(Debug, Clone, Deserialize)]
pub struct SttResult {
    pub text: String,
}

impl AiClient {
    /// Synthesize speech for a piece of assistant text
    pub async fn tts(&self, text: &str, voice: Voice) -> ApiResult<TtsAudio> {
        self.transport
            .post_json(
                "/api/ai/tts",
                &TtsRequest {
                    text,
                    accent: voice.accent,
                    gender: voice.gender,
                },
            )
            .await
    }

    /// Transcribe raw PCM audio
    pub async fn stt(&self, pcm: Vec<u8>) -> ApiResult<SttResult> {
        self.transport.post_bytes("/api/stt/recognize", pcm).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_from_config() {
        let config = SpeechConfig {
            accent: "uk".to_string(),
            gender: "male".to_string(),
        };
        let voice = Voice::from(&config);
        assert_eq!(voice.accent, Accent::Uk);
        assert_eq!(voice.gender, Gender::Male);
    }

    #[test]
    fn test_voice_falls_back_on_unknown() {
        let config = SpeechConfig {
            accent: "fr".to_string(),
            gender: "female".to_string(),
        };
        let voice = Voice::from(&config);
        assert_eq!(voice.accent, Accent::Us);
    }

    #[test]
    fn test_tts_request_serializes_lowercase() {
        let request = TtsRequest {
            text: "Hello",
            accent: Accent::Au,
            gender: Gender::Female,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"text":"Hello","accent":"au","gender":"female"}"#
        );
    }

    #[test]
    fn test_tts_audio_decode() {
        let audio = TtsAudio {
            audio: base64::engine::general_purpose::STANDARD.encode(b"pcm-bytes"),
        };
        assert_eq!(audio.decode().unwrap(), b"pcm-bytes");
    }

    #[test]
    fn test_tts_audio_decode_rejects_garbage() {
        let audio = TtsAudio {
            audio: "!!not-base64!!".to_string(),
        };
        assert!(matches!(audio.decode(), Err(ApiError::InvalidResponse(_))));
    }
}
