use std::sync::Arc;
use tracing::{debug, info, warn};

use super::messages::{
    GetParam, RawRequest, Request, Response, ResponseParams, SetParam, SetRequest,
};
use crate::catalog::Catalogs;
use crate::error::ProtocolError;
use crate::session::SessionState;

/// Executes client requests against one session's state
#[derive(Debug, Clone)]
pub struct ControlHandler {
    /// Supported codecs and languages, shared with every other session
    catalogs: Arc<Catalogs>,
}

/// Fields a successful request contributes to its response
#[derive(Debug, Default)]
struct Reply {
    /// `params` object of the response
    params: Option<ResponseParams>,
    /// Top-level `codecs` echo of `set`/`setup`
    codecs: Option<Vec<String>>,
}

impl ControlHandler {
    pub fn new(catalogs: Arc<Catalogs>) -> Self {
        Self { catalogs }
    }

    /// Handle one request; failures become an `error_msg` response
    pub fn handle(&self, state: &mut SessionState, raw: &RawRequest) -> Response {
        let result = Request::try_from(raw).and_then(|request| self.execute(state, request));

        match result {
            Ok(reply) => Response {
                params: reply.params,
                codecs: reply.codecs,
                ..Response::new(raw)
            },
            Err(e) => {
                warn!("Request '{}' failed: {}", raw.kind(), e);
                Response::error(raw, &e)
            }
        }
    }

    fn execute(&self, state: &mut SessionState, request: Request) -> Result<Reply, ProtocolError> {
        match request {
            Request::Get(params) => Ok(self.get(state, params)),
            Request::Set(set) => Ok(self.set(state, "set", set)),
            Request::Setup(set) => Ok(self.set(state, "setup", set)),
            Request::Unknown(kind) => Err(ProtocolError::Unhandled(kind)),
        }
    }

    fn get(&self, state: &mut SessionState, names: Vec<GetParam>) -> Reply {
        let mut params = ResponseParams::default();

        for name in names {
            match name {
                GetParam::Codec => params.codecs = Some(vec![state.selected_codec.clone()]),
                GetParam::Language => params.language = Some(state.selected_language.clone()),
                GetParam::Results => {
                    let results = state.drain_results();
                    debug!("Draining {} result(s)", results.len());
                    params.results = Some(results);
                }
                GetParam::Unsupported(name) => {
                    warn!("Ignoring unsupported parameter '{}' in 'get' request", name)
                }
            }
        }

        Reply {
            params: Some(params),
            codecs: None,
        }
    }

    /// Resolve every requested value first, then commit whatever resolved
    fn set(&self, state: &mut SessionState, kind: &str, request: SetRequest) -> Reply {
        // Resolve the codec
        let codecs = &self.catalogs.codecs;
        let codec = codecs.first(&request.codecs);
        if codec.is_none() {
            warn!(
                "No supported {} in {:?}, keeping '{}'",
                codecs.kind(),
                request.codecs,
                state.selected_codec
            );
        }

        // Resolve the params, ignoring keys we do not know
        let mut language = None;
        for param in request.params {
            match param {
                SetParam::Language(candidates) => {
                    let languages = &self.catalogs.languages;
                    language = languages.first(&candidates);
                    if language.is_none() {
                        warn!(
                            "No supported {} in {:?}, keeping '{}'",
                            languages.kind(),
                            candidates,
                            state.selected_language
                        );
                    }
                }
                SetParam::Unsupported(key) => {
                    warn!("Ignoring unsupported parameter '{}' in '{}' request", key, kind)
                }
            }
        }

        // Commit and echo whatever resolved
        let mut reply = Reply::default();

        if let Some(codec) = codec {
            info!("Selected codec: {}", codec);
            state.selected_codec = codec.clone();
            reply.codecs = Some(vec![codec]);
        }

        if let Some(language) = language {
            info!("Selected language: {}", language);
            state.selected_language = language.clone();
            reply.params = Some(ResponseParams {
                language: Some(language),
                ..Default::default()
            });
        }

        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::transcript::ResultRecord;
    use serde_json::json;

    fn setup() -> (ControlHandler, SessionState) {
        let catalogs = Arc::new(
            Catalogs::new(
                vec!["ulaw".into(), "slin16".into()],
                vec!["en-US".into(), "de-DE".into()],
            )
            .unwrap(),
        );
        let state = SessionState::new(&SessionConfig::new(catalogs.clone()));
        (ControlHandler::new(catalogs), state)
    }

    fn request(value: serde_json::Value) -> RawRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_get_codec_and_language() {
        let (handler, mut state) = setup();

        let response = handler.handle(
            &mut state,
            &request(json!({"request": "get", "id": "1", "params": ["codec", "language", "pitch"]})),
        );

        assert_eq!(response.response, "get");
        assert_eq!(response.id, json!("1"));
        assert!(response.error_msg.is_none());
        let params = response.params.unwrap();
        assert_eq!(params.codecs, Some(vec!["ulaw".to_string()]));
        assert_eq!(params.language.as_deref(), Some("en-US"));
        assert!(params.results.is_none());
    }

    #[test]
    fn test_get_results_drains_queue() {
        let (handler, mut state) = setup();
        state.queue_result(ResultRecord::unscored("hello"));

        let get = request(json!({"request": "get", "id": "r", "params": ["results"]}));

        let first = handler.handle(&mut state, &get).params.unwrap();
        assert_eq!(first.results.unwrap().len(), 1);

        let second = handler.handle(&mut state, &get).params.unwrap();
        assert_eq!(second.results, Some(vec![]));
    }

    #[test]
    fn test_set_applies_both_fields() {
        let (handler, mut state) = setup();

        let response = handler.handle(
            &mut state,
            &request(json!({
                "request": "setup", "id": "s",
                "codecs": ["opus", "slin16"],
                "params": {"language": "DE-de"}
            })),
        );

        assert_eq!(response.response, "setup");
        assert_eq!(response.codecs, Some(vec!["slin16".to_string()]));
        assert_eq!(response.params.unwrap().language.as_deref(), Some("de-DE"));
        assert_eq!(state.selected_codec, "slin16");
        assert_eq!(state.selected_language, "de-DE");
    }

    #[test]
    fn test_set_with_unsupported_codec_still_applies_language() {
        let (handler, mut state) = setup();

        let response = handler.handle(
            &mut state,
            &request(json!({
                "request": "set", "id": "s",
                "codecs": ["opus"],
                "params": {"language": "de-DE"}
            })),
        );

        assert!(response.error_msg.is_none());
        assert!(response.codecs.is_none());
        assert_eq!(response.params.unwrap().language.as_deref(), Some("de-DE"));
        assert_eq!(state.selected_codec, "ulaw");
        assert_eq!(state.selected_language, "de-DE");
    }

    #[test]
    fn test_set_with_nothing_resolvable_changes_nothing() {
        let (handler, mut state) = setup();

        let response = handler.handle(
            &mut state,
            &request(json!({
                "request": "set", "id": "s",
                "codecs": ["opus"],
                "params": {"language": "xx-XX", "gain": 3}
            })),
        );

        assert!(response.error_msg.is_none());
        assert!(response.codecs.is_none());
        assert!(response.params.is_none());
        assert_eq!(state.selected_codec, "ulaw");
        assert_eq!(state.selected_language, "en-US");
    }

    #[test]
    fn test_missing_params_becomes_error_msg() {
        let (handler, mut state) = setup();

        let response = handler.handle(
            &mut state,
            &request(json!({"request": "set", "id": "s", "codecs": ["ulaw"]})),
        );

        assert_eq!(response.error_msg.as_deref(), Some("Missing request parameters"));
        assert!(response.params.is_none());
        assert!(response.codecs.is_none());
        assert_eq!(state.selected_codec, "ulaw");
    }

    #[test]
    fn test_unknown_request_kind() {
        let (handler, mut state) = setup();

        let response = handler.handle(
            &mut state,
            &request(json!({"request": "frobnicate", "id": "x"})),
        );

        assert_eq!(response.response, "frobnicate");
        assert_eq!(response.id, json!("x"));
        assert!(!response.error_msg.unwrap().is_empty());
    }
}
