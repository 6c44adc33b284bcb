//! Failure classification for retry and fallback decisions.
//!
//! Structured failures (HTTP status, transport-level connectivity errors,
//! protocol violations) are classified from their variant. Only opaque
//! failures fall back to scanning their text for connectivity keywords.

use crate::config::{SentinelConfig, DEFAULT_CONNECTIVITY_KEYWORDS};
use crate::SentinelError;

/// Fallback bucket a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Authority outage: 5xx, 408, 429, or a malformed response.
    Server,
    /// Definitive rejection: any other 4xx.
    Client,
    /// Authority unreachable.
    Connectivity,
    /// Anything else. Never converted into a result.
    Unexpected,
}

impl FailureClass {
    /// Whether the retrying transport should try again.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Server | Self::Connectivity)
    }
}

/// Classifies failures using status codes first and keywords last.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    connectivity_keywords: Vec<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTIVITY_KEYWORDS.iter().copied())
    }
}

impl ErrorClassifier {
    /// Create a classifier with the given connectivity vocabulary.
    pub fn new<I, S>(connectivity_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            connectivity_keywords: connectivity_keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Create a classifier from the configured vocabulary.
    pub fn from_config(config: &SentinelConfig) -> Self {
        Self::new(config.connectivity_keywords.iter().cloned())
    }

    /// Extend the connectivity vocabulary.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into().to_lowercase();
        if !keyword.is_empty() {
            self.connectivity_keywords.push(keyword);
        }
        self
    }

    /// Determine the fallback bucket for a failure.
    pub fn classify(&self, error: &SentinelError) -> FailureClass {
        match error {
            SentinelError::Transport { status, message, .. } => {
                if SentinelError::is_retryable_status(*status) {
                    FailureClass::Server
                } else if (400..500).contains(status) {
                    FailureClass::Client
                } else {
                    self.classify_text(message)
                }
            }
            SentinelError::Protocol(_) => FailureClass::Server,
            SentinelError::Connectivity(_) => FailureClass::Connectivity,
            SentinelError::Unexpected(message) => self.classify_text(message),
            SentinelError::Configuration(_)
            | SentinelError::Cache(_)
            | SentinelError::InvalidLicense
            | SentinelError::NotInitialized => FailureClass::Unexpected,
        }
    }

    /// Whether the retrying transport should try again after this failure.
    pub fn is_retryable(&self, error: &SentinelError) -> bool {
        self.classify(error).is_retryable()
    }

    fn classify_text(&self, text: &str) -> FailureClass {
        if contains_keyword(text, &self.connectivity_keywords) {
            FailureClass::Connectivity
        } else {
            FailureClass::Unexpected
        }
    }
}

/// Case-insensitive check for any keyword anywhere in `text`.
pub fn contains_keyword(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| text.contains(&k.to_lowercase()))
}
