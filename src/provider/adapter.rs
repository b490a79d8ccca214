use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream};
use tracing::info;
use uuid::Uuid;

use super::messages::{Handshake, ProviderEvent, RawProviderMessage};
use crate::config::ProviderConfig;
use crate::error::{ParseError, TransportError};
use crate::transport::{Frame, WsTransport};

/// Provider side of a production session
pub type ProviderSocket = WsTransport<MaybeTlsStream<TcpStream>>;

/// Open a fresh provider connection
pub async fn connect(url: &str) -> Result<ProviderSocket, TransportError> {
    info!("Connecting to provider at {}", url);

    let (stream, _response) = connect_async(url).await?;

    info!("Connected to provider");
    Ok(WsTransport::new(stream))
}

/// Speaks the provider protocol for one session
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    uid: String,
    task: String,
    model: String,
    use_vad: bool,
}

impl ProviderAdapter {
    /// New adapter with a freshly generated client uid
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            task: config.task.clone(),
            model: config.model.clone(),
            use_vad: config.use_vad,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn handshake(&self, language: &str) -> Handshake {
        Handshake {
            uid: self.uid.clone(),
            language: language.to_string(),
            task: self.task.clone(),
            model: self.model.clone(),
            use_vad: self.use_vad,
        }
    }

    pub fn handshake_frame(&self, language: &str) -> Result<Frame, serde_json::Error> {
        let text = serde_json::to_string(&self.handshake(language))?;
        Ok(Frame::Text(text))
    }

    /// Decode one provider text frame into events
    ///
    /// Messages tagged with another client's uid are rejected.
    pub fn decode(&self, text: &str) -> Result<Vec<ProviderEvent>, ParseError> {
        let raw = RawProviderMessage::parse(text)?;

        if let Some(uid) = raw.uid.as_deref() {
            if uid != self.uid {
                return Err(ParseError::Shape(format!(
                    "message addressed to uid {}",
                    uid
                )));
            }
        }

        raw.into_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_adapter_gets_a_fresh_uid() {
        let config = ProviderConfig::default();
        let a = ProviderAdapter::new(&config);
        let b = ProviderAdapter::new(&config);

        assert_ne!(a.uid(), b.uid());
        assert!(Uuid::parse_str(a.uid()).is_ok());
    }

    #[test]
    fn test_handshake_frame() {
        let adapter = ProviderAdapter::new(&ProviderConfig::default());

        let Frame::Text(text) = adapter.handshake_frame("en-US").unwrap() else {
            panic!("handshake must be a text frame");
        };
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["uid"], adapter.uid());
        assert_eq!(json["language"], "en-US");
        assert_eq!(json["task"], "transcribe");
        assert_eq!(json["model"], "small");
        assert_eq!(json["use_vad"], true);
    }

    #[test]
    fn test_decode_rejects_foreign_uid() {
        let adapter = ProviderAdapter::new(&ProviderConfig::default());

        let result = adapter.decode(r#"{"uid": "someone-else", "message": "SERVER_READY"}"#);
        assert!(matches!(result, Err(ParseError::Shape(_))));

        let own = format!(r#"{{"uid": "{}", "message": "SERVER_READY"}}"#, adapter.uid());
        assert_eq!(
            adapter.decode(&own).unwrap(),
            vec![ProviderEvent::Ready { backend: None }]
        );
    }
}
