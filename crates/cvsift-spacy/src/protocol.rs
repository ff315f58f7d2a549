//! Line-delimited JSON exchanged with the spaCy worker.
//!
//! The worker announces itself with one handshake line, then answers every
//! request line with exactly one reply line. Any line may instead be
//! `{"error": "..."}`.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use cvsift_core::{NlpError, ParsedDoc};

/// First line written by a worker whose model loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ready {
    pub ready: bool,
    pub model: String,
    #[serde(default)]
    pub version: Option<String>,
}

// `Failed` must stay first: every JSON object is a valid `ParsedDoc`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Failed { error: String },
    Ok(T),
}

fn decode<T: DeserializeOwned>(line: &str) -> Result<Reply<T>, NlpError> {
    serde_json::from_str(line.trim()).map_err(|e| {
        let preview: String = line.chars().take(200).collect();
        NlpError::Protocol(format!("{e} (line: {preview:?})"))
    })
}

/// Decode the handshake. A worker that reports an error here could not load
/// its model.
pub fn decode_ready(line: &str) -> Result<Ready, NlpError> {
    match decode::<Ready>(line)? {
        Reply::Failed { error } => Err(NlpError::Unavailable(error)),
        Reply::Ok(ready) if ready.ready => Ok(ready),
        Reply::Ok(_) => Err(NlpError::Unavailable("worker reported not ready".into())),
    }
}

/// Decode the reply to one parse request.
pub fn decode_doc(line: &str) -> Result<ParsedDoc, NlpError> {
    match decode::<ParsedDoc>(line)? {
        Reply::Failed { error } => Err(NlpError::Worker(error)),
        Reply::Ok(doc) => Ok(doc),
    }
}

/// Encode one parse request as a single newline-terminated line.
pub fn encode_request(text: &str) -> Result<String, NlpError> {
    let mut line = serde_json::to_string(&serde_json::json!({ "text": text }))
        .map_err(|e| NlpError::Protocol(e.to_string()))?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvsift_core::{EntitySpan, Token};

    #[test]
    fn ready_line_decodes() {
        let ready =
            decode_ready(r#"{"ready": true, "model": "en_core_web_sm", "version": "3.7.1"}"#)
                .unwrap();
        assert_eq!(ready.model, "en_core_web_sm");
        assert_eq!(ready.version.as_deref(), Some("3.7.1"));
    }

    #[test]
    fn ready_error_is_unavailable() {
        let err = decode_ready(r#"{"error": "OSError: [E050] Can't find model 'xx'"}"#)
            .unwrap_err();
        assert!(matches!(err, NlpError::Unavailable(msg) if msg.contains("E050")));
    }

    #[test]
    fn garbage_handshake_is_protocol_error() {
        let err = decode_ready("Traceback (most recent call last):").unwrap_err();
        assert!(matches!(err, NlpError::Protocol(_)));
    }

    #[test]
    fn doc_reply_decodes_entities_and_tokens() {
        let line = r#"{"entities": [{"text": "Jane Roe", "label": "PERSON"}],
            "tokens": [{"text": "Jane", "pos": "PROPN", "is_stop": false, "is_alpha": true}]}"#
            .replace('\n', " ");
        let doc = decode_doc(&line).unwrap();
        assert_eq!(doc.entities, vec![EntitySpan::new("Jane Roe", "PERSON")]);
        assert_eq!(doc.tokens, vec![Token::new("Jane", "PROPN", false)]);
    }

    #[test]
    fn doc_error_is_worker_error() {
        let err = decode_doc(r#"{"error": "KeyError: 'text'"}"#).unwrap_err();
        assert!(matches!(err, NlpError::Worker(_)));
    }

    #[test]
    fn request_is_one_line() {
        let line = encode_request("Jane Roe\nEngineer \"Rust\"").unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        let back: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(back["text"], "Jane Roe\nEngineer \"Rust\"");
    }
}
