use cvsift_core::{Bucket, NlpBackend, NlpError, ParsedDoc, ResumeRecord};

use crate::config::{BucketRule, ExtractionConfig};
use crate::contact::{self, EMAIL_RE, PHONE_RE};

/// Turns resume text into a [`ResumeRecord`].
///
/// Holds the NLP backend handle it was given plus a resolved
/// [`ExtractionConfig`]. Contact fields come from regexes over the raw text;
/// everything else comes from one NLP pass.
pub struct EntityExtractor {
    nlp: Box<dyn NlpBackend>,
    config: ExtractionConfig,
    rules: Vec<BucketRule>,
    skill_pos: Vec<String>,
}

impl EntityExtractor {
    /// Create an extractor with default configuration.
    pub fn new(nlp: Box<dyn NlpBackend>) -> Self {
        Self::with_config(nlp, ExtractionConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(nlp: Box<dyn NlpBackend>, config: ExtractionConfig) -> Self {
        let rules = config.bucket_rules();
        let skill_pos = config.skill_pos();
        Self {
            nlp,
            config,
            rules,
            skill_pos,
        }
    }

    pub fn nlp(&self) -> &dyn NlpBackend {
        self.nlp.as_ref()
    }

    /// Run the NLP backend over `text` and assemble the record.
    pub fn extract(&self, text: &str) -> Result<ResumeRecord, NlpError> {
        let doc = self.nlp.parse(text)?;
        Ok(self.extract_from_parsed(text, &doc))
    }

    /// Assemble a record from text that has already been parsed.
    pub fn extract_from_parsed(&self, text: &str, doc: &ParsedDoc) -> ResumeRecord {
        let mut record = ResumeRecord {
            email: contact::find_all(self.config.email_re.as_ref().unwrap_or(&*EMAIL_RE), text),
            phone: contact::find_all(self.config.phone_re.as_ref().unwrap_or(&*PHONE_RE), text),
            ..Default::default()
        };

        record.name = doc
            .entities
            .iter()
            .find(|e| e.label == self.config.person_label)
            .map(|e| e.text.clone());

        for entity in &doc.entities {
            if let Some(bucket) = self.classify(&entity.label) {
                record.bucket_mut(bucket).insert(entity.text.clone());
            }
        }

        record.skills = doc
            .tokens
            .iter()
            .filter(|t| t.is_alpha && !t.is_stop && self.skill_pos.contains(&t.pos))
            .map(|t| t.text.clone())
            .collect();

        tracing::debug!(
            emails = record.email.len(),
            phones = record.phone.len(),
            has_name = record.name.is_some(),
            skills = record.skills.len(),
            "assembled resume record"
        );
        record
    }

    /// Bucket for an entity label: first matching rule wins, `None` if no
    /// rule lists the label.
    pub fn classify(&self, label: &str) -> Option<Bucket> {
        self.rules.iter().find(|r| r.matches(label)).map(|r| r.bucket)
    }
}
