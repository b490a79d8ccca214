use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ParseError;
use crate::transcript::Segment;

/// First message sent on a fresh provider connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    pub uid: String,
    pub language: String,
    pub task: String,
    pub model: String,
    pub use_vad: bool,
}

/// Provider status severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProviderStatus {
    Wait,
    Error,
    Warning,
    #[serde(other)]
    Unknown,
}

/// Inbound provider message as it appears on the wire
#[derive(Debug, Deserialize)]
pub struct RawProviderMessage {
    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default)]
    pub status: Option<ProviderStatus>,

    /// Lifecycle keyword, or status detail (string or number)
    #[serde(default)]
    pub message: Option<Value>,

    /// `Some(None)` when the key is present but null
    #[serde(default, deserialize_with = "present")]
    pub segments: Option<Option<Vec<Segment>>>,

    #[serde(default, alias = "isFinal")]
    pub is_final: Option<bool>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub language_prob: Option<f64>,

    #[serde(default)]
    pub backend: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A provider message after classification
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Status { status: ProviderStatus, message: Value },
    Ready { backend: Option<String> },
    Disconnect,
    Language { code: String, probability: Option<f64> },
    /// Any other lifecycle keyword
    Notice(String),
    Segments {
        /// `None` keeps the previous window
        segments: Option<Vec<Segment>>,
        is_final: bool,
    },
}

impl RawProviderMessage {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Classify by precedence: status, then segments, then lifecycle and language
    pub fn into_events(self) -> Result<Vec<ProviderEvent>, ParseError> {
        if let Some(status) = self.status {
            return Ok(vec![ProviderEvent::Status {
                status,
                message: self.message.unwrap_or(Value::Null),
            }]);
        }

        if let Some(segments) = self.segments {
            return Ok(vec![ProviderEvent::Segments {
                segments,
                is_final: self.is_final.unwrap_or(false),
            }]);
        }

        let mut events = Vec::new();

        match self.message.as_ref().and_then(Value::as_str) {
            Some("SERVER_READY") => events.push(ProviderEvent::Ready {
                backend: self.backend,
            }),
            Some("DISCONNECT") => events.push(ProviderEvent::Disconnect),
            Some(other) => events.push(ProviderEvent::Notice(other.to_string())),
            None => {}
        }

        if let Some(code) = self.language {
            events.push(ProviderEvent::Language {
                code,
                probability: self.language_prob,
            });
        }

        if events.is_empty() {
            return Err(ParseError::Shape(
                "expected status, segments, message or language".to_string(),
            ));
        }

        Ok(events)
    }
}
