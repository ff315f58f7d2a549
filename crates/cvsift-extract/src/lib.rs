use std::path::Path;

use thiserror::Error;

pub mod config;
pub mod contact;
pub mod extractor;

pub use config::{
    BucketRule, ExtractionConfig, ExtractionConfigBuilder, ListOverride, default_bucket_rules,
    default_skill_pos,
};
pub use extractor::EntityExtractor;
// Re-export domain types from core (canonical definitions live there)
pub use cvsift_core::{
    BackendError, Bucket, Field, FieldValue, NlpBackend, NlpError, PdfBackend, RecordSink,
    ResumeRecord, SinkError,
};

/// Failure of one pipeline run, by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The file is missing, unreadable, or not a PDF.
    #[error("input error: {0}")]
    Input(#[source] BackendError),
    /// A page could not be rendered to text.
    #[error("extraction error: {0}")]
    Extraction(#[source] BackendError),
    #[error("model error: {0}")]
    Model(#[from] NlpError),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

impl From<BackendError> for PipelineError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Extraction(_) => PipelineError::Extraction(e),
            BackendError::Open(_) | BackendError::Io(_) => PipelineError::Input(e),
        }
    }
}

/// Extract a resume record from a PDF and hand it to every sink.
///
/// Pipeline:
/// 1. Extract text from the PDF via `pdf`
/// 2. Run the entity extractor over the text
/// 3. Write the record to each sink, in order
///
/// The first failure aborts the run; nothing is retried.
pub fn process_resume(
    path: &Path,
    pdf: &dyn PdfBackend,
    extractor: &EntityExtractor,
    sinks: &mut [Box<dyn RecordSink>],
) -> Result<ResumeRecord, PipelineError> {
    let text = pdf.extract_text(path)?;
    tracing::debug!(path = %path.display(), chars = text.len(), "extracted text");

    let record = extractor.extract(&text)?;

    for sink in sinks.iter_mut() {
        sink.write(path, &record)?;
    }

    tracing::info!(
        path = %path.display(),
        model = extractor.nlp().name(),
        "processed resume"
    );
    Ok(record)
}
