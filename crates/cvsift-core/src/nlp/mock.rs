//! Mock NLP backend for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{EntitySpan, NlpBackend, NlpError, ParsedDoc, Token};

/// A configurable mock response for [`MockNlp`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this document regardless of input.
    Doc(ParsedDoc),
    /// Simulate a worker-side failure.
    Error(String),
}

/// A hand-rolled mock implementing [`NlpBackend`] for tests.
///
/// Supports:
/// - A fixed response (used for every call), **or**
/// - A sequence of responses (one per call, repeating the last if exhausted).
/// - Call counting via [`call_count()`](MockNlp::call_count).
/// - Recording the texts it was asked to parse.
pub struct MockNlp {
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    seen: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockNlp {
    /// Create a mock that always returns `doc`.
    pub fn new(doc: ParsedDoc) -> Self {
        Self::with_response(MockResponse::Doc(doc))
    }

    /// Create a mock that recognises nothing.
    pub fn empty() -> Self {
        Self::new(ParsedDoc::default())
    }

    /// Create a mock built from `(text, label)` entity pairs and
    /// `(text, pos, is_stop)` token triples.
    pub fn from_parts(entities: &[(&str, &str)], tokens: &[(&str, &str, bool)]) -> Self {
        Self::new(ParsedDoc {
            entities: entities
                .iter()
                .map(|(text, label)| EntitySpan::new(*text, *label))
                .collect(),
            tokens: tokens
                .iter()
                .map(|(text, pos, stop)| Token::new(*text, *pos, *stop))
                .collect(),
        })
    }

    pub fn with_response(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            seen: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        // Reverse so we can pop() from the front cheaply.
        responses.reverse();
        let fallback = responses[0].clone();
        Self {
            responses: Mutex::new(responses),
            fallback,
            seen: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `parse()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts passed to `parse()`, oldest first.
    pub fn seen_texts(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn next_response(&self) -> MockResponse {
        match self.responses.lock() {
            Ok(mut seq) => seq.pop().unwrap_or_else(|| self.fallback.clone()),
            Err(_) => self.fallback.clone(),
        }
    }
}

impl NlpBackend for MockNlp {
    fn name(&self) -> &str {
        "mock"
    }

    fn parse(&self, text: &str) -> Result<ParsedDoc, NlpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(text.to_string());
        }
        match self.next_response() {
            MockResponse::Doc(doc) => Ok(doc),
            MockResponse::Error(msg) => Err(NlpError::Worker(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_repeats_last_response() {
        let mock = MockNlp::with_sequence(vec![
            MockResponse::Error("boom".into()),
            MockResponse::Doc(ParsedDoc::default()),
        ]);
        assert!(mock.parse("a").is_err());
        assert!(mock.parse("b").is_ok());
        assert!(mock.parse("c").is_ok());
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.seen_texts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn from_parts_builds_entities_and_tokens() {
        let mock = MockNlp::from_parts(&[("Jane Roe", "PERSON")], &[("Rust", "PROPN", false)]);
        let doc = mock.parse("ignored").unwrap();
        assert_eq!(doc.entities, vec![EntitySpan::new("Jane Roe", "PERSON")]);
        assert!(doc.tokens[0].is_alpha);
    }
}
