use std::path::Path;

use thiserror::Error;

use crate::ResumeRecord;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Encode(String),
}

/// Destination for an extracted record: console, CSV file, ...
pub trait RecordSink {
    /// Emit `record`, which was extracted from the document at `source`.
    fn write(&mut self, source: &Path, record: &ResumeRecord) -> Result<(), SinkError>;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write(&mut self, source: &Path, record: &ResumeRecord) -> Result<(), SinkError> {
        (**self).write(source, record)
    }
}
