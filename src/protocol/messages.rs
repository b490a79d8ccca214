use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ParseError, ProtocolError};
use crate::transcript::ResultRecord;

// ============================================================================
// Inbound
// ============================================================================

/// A text frame received from the client
#[derive(Debug, Clone)]
pub enum ClientMessage {
    Request(RawRequest),
    Response(ClientResponse),
}

impl ClientMessage {
    /// Classify a client text frame by its `request` or `response` key
    ///
    /// Any JSON object with a `request` key is a request, whatever the type of
    /// its fields, so that it can always be answered.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(text)?;

        if value.get("request").is_some() {
            return Ok(Self::Request(serde_json::from_value(value)?));
        }

        if value.get("response").is_some() {
            let response = serde_json::from_value(value)
                .map_err(|e| ParseError::Shape(format!("invalid response message: {}", e)))?;
            return Ok(Self::Response(response));
        }

        Err(ParseError::Shape(
            "expected a 'request' or 'response' message".to_string(),
        ))
    }
}

/// Request envelope before validation
///
/// Every field is kept as raw JSON so that a badly shaped request can still be
/// answered with its id and an `error_msg`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRequest {
    /// Request kind; a string in any valid request
    pub request: Value,

    /// Opaque correlation id, echoed verbatim
    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub params: Option<Value>,

    #[serde(default)]
    pub codecs: Option<Value>,
}

impl RawRequest {
    /// Request kind for log and error messages
    pub fn kind(&self) -> String {
        match &self.request {
            Value::String(kind) => kind.clone(),
            other => other.to_string(),
        }
    }
}

/// The client answering one of our pushed requests
#[derive(Debug, Clone, Deserialize)]
pub struct ClientResponse {
    pub response: String,

    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub error_msg: Option<String>,
}

/// A validated request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Get(Vec<GetParam>),
    Set(SetRequest),
    Setup(SetRequest),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetParam {
    /// Answered as `params.codecs` holding a one-element list, the same shape
    /// `set` responses use for `codecs`, rather than a bare string
    Codec,
    Language,
    Results,
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetRequest {
    /// Codec candidates, most preferred first
    pub codecs: Vec<String>,
    pub params: Vec<SetParam>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetParam {
    /// Language candidates, most preferred first
    Language(Vec<String>),
    Unsupported(String),
}

impl TryFrom<&RawRequest> for Request {
    type Error = ProtocolError;

    fn try_from(raw: &RawRequest) -> Result<Self, Self::Error> {
        let kind = raw.request.as_str().ok_or_else(|| {
            ProtocolError::invalid(&raw.kind(), "request", "expected a string")
        })?;

        match kind {
            "get" => Ok(Request::Get(get_params(kind, raw)?)),
            "set" => Ok(Request::Set(set_request(kind, raw)?)),
            "setup" => Ok(Request::Setup(set_request(kind, raw)?)),
            other => Ok(Request::Unknown(other.to_string())),
        }
    }
}

fn get_params(kind: &str, raw: &RawRequest) -> Result<Vec<GetParam>, ProtocolError> {
    let params = raw.params.as_ref().ok_or(ProtocolError::MissingParams)?;

    string_list(params)
        .ok_or_else(|| ProtocolError::invalid(kind, "params", "expected a list of names"))
        .map(|names| {
            names
                .into_iter()
                .map(|name| match name.as_str() {
                    "codec" => GetParam::Codec,
                    "language" => GetParam::Language,
                    "results" => GetParam::Results,
                    _ => GetParam::Unsupported(name),
                })
                .collect()
        })
}

fn set_request(kind: &str, raw: &RawRequest) -> Result<SetRequest, ProtocolError> {
    let (Some(codecs), Some(params)) = (raw.codecs.as_ref(), raw.params.as_ref()) else {
        return Err(ProtocolError::MissingParams);
    };

    let codecs = string_list(codecs).ok_or_else(|| {
        ProtocolError::invalid(kind, "codecs", "expected a list of codec names")
    })?;

    let params = params.as_object().ok_or_else(|| {
        ProtocolError::invalid(kind, "params", "expected an object")
    })?;

    let params = params
        .iter()
        .map(|(key, value)| match key.as_str() {
            "language" => candidates(value)
                .map(SetParam::Language)
                .ok_or_else(|| {
                    ProtocolError::invalid(
                        kind,
                        "language",
                        "expected a language or a list of languages",
                    )
                }),
            _ => Ok(SetParam::Unsupported(key.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SetRequest { codecs, params })
}

/// A list of strings; `None` for any other shape
fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// A single string or a list of strings
fn candidates(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        other => string_list(other),
    }
}

// ============================================================================
// Outbound
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ResultRecord>>,
}

/// Reply to a client request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echo of the request kind, verbatim
    pub response: Value,
    pub id: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<ResponseParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl Response {
    pub fn new(request: &RawRequest) -> Self {
        Self {
            response: request.request.clone(),
            id: request.id.clone(),
            params: None,
            codecs: None,
            error_msg: None,
        }
    }

    /// Error reply: only the echoed kind, the id and the message
    pub fn error(request: &RawRequest, error: &ProtocolError) -> Self {
        Self {
            error_msg: Some(error.to_string()),
            ..Self::new(request)
        }
    }
}

/// Unsolicited `set` carrying finalized results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsPush {
    pub request: String,
    pub id: String,
    pub params: ResponseParams,
}

impl ResultsPush {
    pub fn new(results: Vec<ResultRecord>) -> Self {
        Self {
            request: "set".to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            params: ResponseParams {
                results: Some(results),
                ..Default::default()
            },
        }
    }
}
