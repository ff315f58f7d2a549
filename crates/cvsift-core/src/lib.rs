use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub mod backend;
pub mod config_file;
pub mod nlp;
pub mod sink;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, join_pages};
pub use nlp::{EntitySpan, NlpBackend, NlpError, ParsedDoc, Token};
pub use sink::{RecordSink, SinkError};

/// Placeholder rendered for a field that extracted nothing.
pub const DEFAULT_SENTINEL: &str = "0";

/// A column of the resume record, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Email,
    Phone,
    Name,
    JobTitles,
    Education,
    Certifications,
    Projects,
    Experience,
    Skills,
}

impl Field {
    /// Every field, in the order columns are written.
    pub const ALL: [Field; 9] = [
        Field::Email,
        Field::Phone,
        Field::Name,
        Field::JobTitles,
        Field::Education,
        Field::Certifications,
        Field::Projects,
        Field::Experience,
        Field::Skills,
    ];

    /// Display name, also used as the CSV header and JSON key.
    pub fn name(self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Name => "Name",
            Field::JobTitles => "Job Titles",
            Field::Education => "Education",
            Field::Certifications => "Certifications",
            Field::Projects => "Projects",
            Field::Experience => "Experience",
            Field::Skills => "Skills",
        }
    }

    /// Whether this field holds a deduplicated set rather than a single string.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Field::JobTitles
                | Field::Education
                | Field::Certifications
                | Field::Projects
                | Field::Skills
        )
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Entity-derived list fields that bucket rules can route spans into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    JobTitles,
    Education,
    Certifications,
    Projects,
}

impl Bucket {
    pub fn field(self) -> Field {
        match self {
            Bucket::JobTitles => Field::JobTitles,
            Bucket::Education => Field::Education,
            Bucket::Certifications => Field::Certifications,
            Bucket::Projects => Field::Projects,
        }
    }
}

/// Structured fields pulled out of a single resume.
///
/// Holds only what was actually found; empty fields are rendered with a
/// sentinel by [`values()`](Self::values). Set-valued fields use `BTreeSet`
/// so repeated runs over the same text render identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeRecord {
    /// Email matches in order of appearance, duplicates kept.
    pub email: Vec<String>,
    /// Phone matches in order of appearance, duplicates kept.
    pub phone: Vec<String>,
    /// Text of the first person entity.
    pub name: Option<String>,
    pub job_titles: BTreeSet<String>,
    pub education: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
    pub projects: BTreeSet<String>,
    pub skills: BTreeSet<String>,
}

/// A rendered field value with the sentinel already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Flatten to a single string; list items are joined with `sep`.
    pub fn join(&self, sep: &str) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(sep),
        }
    }
}

impl ResumeRecord {
    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut BTreeSet<String> {
        match bucket {
            Bucket::JobTitles => &mut self.job_titles,
            Bucket::Education => &mut self.education,
            Bucket::Certifications => &mut self.certifications,
            Bucket::Projects => &mut self.projects,
        }
    }

    /// Render one field. Empty scalars become `sentinel`, empty sets become
    /// `[sentinel]`. Experience is never extracted and always renders as the
    /// sentinel.
    pub fn value(&self, field: Field, sentinel: &str) -> FieldValue {
        let text = |joined: String| {
            if joined.is_empty() {
                FieldValue::Text(sentinel.to_string())
            } else {
                FieldValue::Text(joined)
            }
        };
        let list = |set: &BTreeSet<String>| {
            if set.is_empty() {
                FieldValue::List(vec![sentinel.to_string()])
            } else {
                FieldValue::List(set.iter().cloned().collect())
            }
        };

        match field {
            Field::Email => text(self.email.join(", ")),
            Field::Phone => text(self.phone.join(", ")),
            Field::Name => text(self.name.clone().unwrap_or_default()),
            Field::JobTitles => list(&self.job_titles),
            Field::Education => list(&self.education),
            Field::Certifications => list(&self.certifications),
            Field::Projects => list(&self.projects),
            Field::Experience => FieldValue::Text(sentinel.to_string()),
            Field::Skills => list(&self.skills),
        }
    }

    /// Render every field in schema order.
    pub fn values(&self, sentinel: &str) -> Vec<(Field, FieldValue)> {
        Field::ALL
            .iter()
            .map(|&f| (f, self.value(f, sentinel)))
            .collect()
    }

    /// Borrowing view that serializes as an ordered map of field name to value.
    pub fn view<'a>(&'a self, sentinel: &'a str) -> RecordView<'a> {
        RecordView {
            record: self,
            sentinel,
        }
    }
}

/// Serializable projection of a [`ResumeRecord`] with a fixed sentinel.
pub struct RecordView<'a> {
    record: &'a ResumeRecord,
    sentinel: &'a str,
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::ALL.len()))?;
        for (field, value) in self.record.values(self.sentinel) {
            map.serialize_entry(field.name(), &value)?;
        }
        map.end()
    }
}
