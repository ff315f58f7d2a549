//! NLP backend trait and the document shape it produces.

pub mod mock;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NlpError {
    /// The model or its runtime could not be loaded.
    #[error("NLP model unavailable: {0}")]
    Unavailable(String),
    /// The backend replied with something we could not decode.
    #[error("malformed NLP response: {0}")]
    Protocol(String),
    /// The backend reported a failure while parsing a document.
    #[error("NLP worker error: {0}")]
    Worker(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A recognised entity span. `label` uses the model's own vocabulary
/// (`PERSON`, `ORG`, `EVENT`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
}

/// A single token with the tagger's annotations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub text: String,
    /// Coarse part-of-speech tag (`NOUN`, `PROPN`, `VERB`, ...).
    pub pos: String,
    pub is_stop: bool,
    pub is_alpha: bool,
}

/// Output of one NLP pass: entities and tokens, both in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParsedDoc {
    #[serde(default)]
    pub entities: Vec<EntitySpan>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

impl Token {
    pub fn new(text: impl Into<String>, pos: impl Into<String>, is_stop: bool) -> Self {
        let text = text.into();
        let is_alpha = !text.is_empty() && text.chars().all(char::is_alphabetic);
        Self {
            text,
            pos: pos.into(),
            is_stop,
            is_alpha,
        }
    }
}

/// A pretrained pipeline that turns text into entity spans and tagged tokens.
///
/// Backends are loaded once and handed to the extractor explicitly, so a
/// single process can hold several models and tests can swap in
/// [`mock::MockNlp`].
pub trait NlpBackend: Send + Sync {
    /// Short identifier for logs (model name and version where known).
    fn name(&self) -> &str;

    fn parse(&self, text: &str) -> Result<ParsedDoc, NlpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_new_derives_alpha_flag() {
        assert!(Token::new("Rust", "PROPN", false).is_alpha);
        assert!(!Token::new("C++", "PROPN", false).is_alpha);
        assert!(!Token::new("2024", "NUM", false).is_alpha);
        assert!(!Token::new("", "X", false).is_alpha);
    }

    #[test]
    fn parsed_doc_fields_default_when_absent() {
        let doc: ParsedDoc = serde_json::from_str(r#"{"entities": []}"#).unwrap();
        assert!(doc.tokens.is_empty());
    }
}
