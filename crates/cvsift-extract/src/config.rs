use regex::Regex;

use cvsift_core::Bucket;

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Routes entity spans whose label is in `labels` into `bucket`.
///
/// Rules are evaluated in order and the first match wins, so a label listed
/// in several rules only ever reaches the earliest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRule {
    pub labels: Vec<String>,
    pub bucket: Bucket,
}

impl BucketRule {
    pub fn new(labels: &[&str], bucket: Bucket) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            bucket,
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

pub const DEFAULT_PERSON_LABEL: &str = "PERSON";

/// Built-in routing, highest priority first.
///
/// `ORG` appears under both certifications and education; under this order
/// every `ORG` span lands in certifications. Reordering the list (via
/// [`ExtractionConfigBuilder::set_bucket_rules`]) changes that.
pub fn default_bucket_rules() -> Vec<BucketRule> {
    vec![
        BucketRule::new(&["ORG", "WORK_OF_ART"], Bucket::Certifications),
        BucketRule::new(&["EDUCATION", "FAC", "FACILITY", "ORG"], Bucket::Education),
        BucketRule::new(&["EVENT"], Bucket::Projects),
        BucketRule::new(&["TITLE"], Bucket::JobTitles),
    ]
}

/// Coarse POS tags whose tokens count as skills.
pub fn default_skill_pos() -> Vec<String> {
    vec!["NOUN".to_string(), "PROPN".to_string()]
}

/// Configuration for [`EntityExtractor`](crate::EntityExtractor).
///
/// Regex fields are `Option<Regex>`: `None` means "use the built-in default".
/// Use [`ExtractionConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub(crate) email_re: Option<Regex>,
    pub(crate) phone_re: Option<Regex>,
    /// Entity label that marks a person name.
    pub(crate) person_label: String,
    pub(crate) bucket_rules: ListOverride<BucketRule>,
    pub(crate) skill_pos: ListOverride<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            email_re: None,
            phone_re: None,
            person_label: DEFAULT_PERSON_LABEL.to_string(),
            bucket_rules: ListOverride::Default,
            skill_pos: ListOverride::Default,
        }
    }
}

impl ExtractionConfig {
    pub fn person_label(&self) -> &str {
        &self.person_label
    }

    /// Effective bucket rules, in evaluation order.
    pub fn bucket_rules(&self) -> Vec<BucketRule> {
        self.bucket_rules.resolve(&default_bucket_rules())
    }

    /// Effective skill POS tags.
    pub fn skill_pos(&self) -> Vec<String> {
        self.skill_pos.resolve(&default_skill_pos())
    }
}

/// Builder for [`ExtractionConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    email_re: Option<String>,
    phone_re: Option<String>,
    person_label: Option<String>,
    bucket_rules: ListOverride<BucketRule>,
    skill_pos: ListOverride<String>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Contact patterns ──

    pub fn email_regex(mut self, pattern: &str) -> Self {
        self.email_re = Some(pattern.to_string());
        self
    }

    pub fn phone_regex(mut self, pattern: &str) -> Self {
        self.phone_re = Some(pattern.to_string());
        self
    }

    // ── Entities ──

    pub fn person_label(mut self, label: &str) -> Self {
        self.person_label = Some(label.to_string());
        self
    }

    pub fn set_bucket_rules(mut self, rules: Vec<BucketRule>) -> Self {
        self.bucket_rules = ListOverride::Replace(rules);
        self
    }

    /// Append a rule after the built-in ones (lowest priority).
    pub fn add_bucket_rule(mut self, rule: BucketRule) -> Self {
        match &mut self.bucket_rules {
            ListOverride::Extend(v) => v.push(rule),
            _ => self.bucket_rules = ListOverride::Extend(vec![rule]),
        }
        self
    }

    // ── Skills ──

    pub fn set_skill_pos(mut self, tags: Vec<String>) -> Self {
        self.skill_pos = ListOverride::Replace(tags);
        self
    }

    pub fn add_skill_pos(mut self, tag: String) -> Self {
        match &mut self.skill_pos {
            ListOverride::Extend(v) => v.push(tag),
            _ => self.skill_pos = ListOverride::Extend(vec![tag]),
        }
        self
    }

    /// Compile all string patterns into regexes and produce an [`ExtractionConfig`].
    pub fn build(self) -> Result<ExtractionConfig, regex::Error> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        Ok(ExtractionConfig {
            email_re: compile(self.email_re)?,
            phone_re: compile(self.phone_re)?,
            person_label: self
                .person_label
                .unwrap_or_else(|| DEFAULT_PERSON_LABEL.to_string()),
            bucket_rules: self.bucket_rules,
            skill_pos: self.skill_pos,
        })
    }
}
