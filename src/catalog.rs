//! Ordered catalogs of supported codecs and languages
//!
//! A catalog is shared read-only between sessions. The currently selected value
//! lives in each session's state, never here.

use anyhow::Result;

/// Ordered set of supported values
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Human-readable kind for log messages ("codec", "language")
    kind: &'static str,
    supported: Vec<String>,
}

impl Catalog {
    /// Create a catalog; the first entry becomes the per-session default
    pub fn new(kind: &'static str, supported: Vec<String>) -> Result<Self> {
        if supported.is_empty() {
            anyhow::bail!("{} catalog must contain at least one entry", kind);
        }

        Ok(Self { kind, supported })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Value selected for a freshly opened session
    pub fn default_value(&self) -> &str {
        &self.supported[0]
    }

    /// First candidate, in candidate order, that this catalog supports
    ///
    /// Matching ignores ASCII case; the catalog's own spelling is returned.
    pub fn first<S: AsRef<str>>(&self, candidates: &[S]) -> Option<String> {
        candidates
            .iter()
            .find_map(|candidate| self.lookup(candidate.as_ref()))
            .map(str::to_string)
    }

    fn lookup(&self, value: &str) -> Option<&str> {
        self.supported
            .iter()
            .find(|s| s.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }
}

/// The two catalogs a session negotiates against
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub codecs: Catalog,
    pub languages: Catalog,
}

impl Catalogs {
    pub fn new(codecs: Vec<String>, languages: Vec<String>) -> Result<Self> {
        Ok(Self {
            codecs: Catalog::new("codec", codecs)?,
            languages: Catalog::new("language", languages)?,
        })
    }
}
