//! Integration tests for [`process_resume`].
//!
//! PDF rendering and the NLP model are both stubbed: a fixed list of page
//! strings stands in for the PDF and [`MockNlp`] stands in for spaCy.

use std::path::Path;
use std::sync::Arc;

use cvsift_core::nlp::mock::{MockNlp, MockResponse};
use cvsift_core::{NlpBackend, NlpError, ParsedDoc, join_pages};
use cvsift_extract::{
    BackendError, EntityExtractor, Field, FieldValue, PdfBackend, PipelineError, RecordSink,
    ResumeRecord, SinkError, process_resume,
};
use cvsift_reporting::{ConsoleSink, CsvAppendSink, RenderFormat};

/// Serves fixed page text for any path.
struct PagesPdf(Vec<&'static str>);

impl PdfBackend for PagesPdf {
    fn extract_text(&self, _path: &Path) -> Result<String, BackendError> {
        Ok(join_pages(&self.0))
    }
}

/// Always fails with the given error constructor.
struct FailingPdf(fn() -> BackendError);

impl PdfBackend for FailingPdf {
    fn extract_text(&self, _path: &Path) -> Result<String, BackendError> {
        Err((self.0)())
    }
}

struct FailingSink;

impl RecordSink for FailingSink {
    fn write(&mut self, _source: &Path, _record: &ResumeRecord) -> Result<(), SinkError> {
        Err(SinkError::Encode("disk full".into()))
    }
}

/// Shares one mock between the extractor and the test body.
struct SharedNlp(Arc<MockNlp>);

impl NlpBackend for SharedNlp {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn parse(&self, text: &str) -> Result<ParsedDoc, NlpError> {
        self.0.parse(text)
    }
}

fn resume_nlp() -> MockNlp {
    MockNlp::from_parts(
        &[
            ("Jane Roe", "PERSON"),
            ("Initech", "ORG"),
            ("RustConf", "EVENT"),
        ],
        &[
            ("Rust", "PROPN", false),
            ("databases", "NOUN", false),
            ("the", "DET", true),
        ],
    )
}

#[test]
fn pages_reach_nlp_in_order() {
    let mock = Arc::new(resume_nlp());
    let extractor = EntityExtractor::new(Box::new(SharedNlp(Arc::clone(&mock))));
    let pdf = PagesPdf(vec![
        "  Jane Roe\njane@example.com",
        "Initech 2019-2023",
        "RustConf speaker\n",
    ]);

    process_resume(Path::new("jane.pdf"), &pdf, &extractor, &mut []).unwrap();

    assert_eq!(
        mock.seen_texts(),
        vec!["Jane Roe\njane@example.com\nInitech 2019-2023\nRustConf speaker"]
    );
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn full_run_writes_console_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("resume_data.csv");
    let extractor = EntityExtractor::new(Box::new(resume_nlp()));
    let pdf = PagesPdf(vec!["Jane Roe | jane@example.com | +1 415 555 0134"]);

    let mut sinks: Vec<Box<dyn RecordSink>> = vec![
        Box::new(CsvAppendSink::new(&csv_path)),
        Box::new(ConsoleSink::new(std::io::sink()).format(RenderFormat::Quiet)),
    ];
    let record = process_resume(Path::new("jane.pdf"), &pdf, &extractor, &mut sinks).unwrap();

    assert_eq!(record.name.as_deref(), Some("Jane Roe"));
    assert_eq!(record.phone, vec!["+1 415 555 0134"]);
    assert_eq!(
        record.value(Field::Certifications, "0"),
        FieldValue::List(vec!["Initech".into()])
    );
    assert_eq!(
        record.value(Field::Skills, "0"),
        FieldValue::List(vec!["Rust".into(), "databases".into()])
    );

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn second_run_appends_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("resume_data.csv");
    let extractor = EntityExtractor::new(Box::new(resume_nlp()));
    let pdf = PagesPdf(vec!["Jane Roe"]);

    for _ in 0..2 {
        let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(CsvAppendSink::new(&csv_path))];
        process_resume(Path::new("jane.pdf"), &pdf, &extractor, &mut sinks).unwrap();
    }

    let content = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Email,Phone,Name,Job Titles"));
    assert_eq!(lines[1], lines[2]);
}

#[test]
fn open_failure_is_input_error() {
    let extractor = EntityExtractor::new(Box::new(MockNlp::empty()));
    let pdf = FailingPdf(|| BackendError::Open("no such file".into()));
    let err = process_resume(Path::new("missing.pdf"), &pdf, &extractor, &mut []).unwrap_err();
    assert!(matches!(err, PipelineError::Input(_)), "{err}");
}

#[test]
fn page_failure_is_extraction_error() {
    let extractor = EntityExtractor::new(Box::new(MockNlp::empty()));
    let pdf = FailingPdf(|| BackendError::Extraction("page 2: bad xref".into()));
    let err = process_resume(Path::new("broken.pdf"), &pdf, &extractor, &mut []).unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)), "{err}");
}

#[test]
fn nlp_failure_is_model_error_and_skips_sinks() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("resume_data.csv");
    let extractor = EntityExtractor::new(Box::new(MockNlp::with_response(
        MockResponse::Error("model crashed".into()),
    )));
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(CsvAppendSink::new(&csv_path))];

    let err = process_resume(
        Path::new("jane.pdf"),
        &PagesPdf(vec!["Jane"]),
        &extractor,
        &mut sinks,
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::Model(_)), "{err}");
    assert!(!csv_path.exists());
}

#[test]
fn sink_failure_is_sink_error() {
    let extractor = EntityExtractor::new(Box::new(MockNlp::empty()));
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(FailingSink)];
    let err = process_resume(
        Path::new("jane.pdf"),
        &PagesPdf(vec!["Jane"]),
        &extractor,
        &mut sinks,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Sink(_)), "{err}");
}
