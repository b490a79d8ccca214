use serde::{Deserialize, Deserializer, Serialize};

/// Score attached to results when the provider does not supply one.
///
/// This is not a confidence measure. Records carrying it are flagged with
/// `synthetic_score`.
pub const SYNTHETIC_SCORE: u32 = 100;

/// A timestamped span of recognized text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,

    /// Start offset in seconds
    #[serde(deserialize_with = "seconds")]
    pub start: f64,

    /// End offset in seconds
    #[serde(deserialize_with = "seconds")]
    pub end: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Some engines send offsets as decimal strings ("1.280")
fn seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A finalized transcript increment delivered to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub text: String,
    pub score: u32,

    /// Set when `score` is `SYNTHETIC_SCORE` rather than a provider value
    #[serde(default)]
    pub synthetic_score: bool,
}

impl ResultRecord {
    /// Record for text the provider did not score
    pub fn unscored(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score: SYNTHETIC_SCORE,
            synthetic_score: true,
        }
    }
}
