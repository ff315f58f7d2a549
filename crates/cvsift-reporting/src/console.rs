use std::io::Write;
use std::path::Path;

use cvsift_core::{DEFAULT_SENTINEL, RecordSink, ResumeRecord, SinkError};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// How the record body is rendered after the success line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    /// One `Field: value` line per field.
    #[default]
    Text,
    /// A pretty-printed JSON object keyed by field name.
    Json,
    /// Success line only.
    Quiet,
}

/// Prints a success marker and the record to a writer (stdout by default).
pub struct ConsoleSink<W: Write> {
    writer: W,
    color: ColorMode,
    format: RenderFormat,
    sentinel: String,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            color: ColorMode(false),
            format: RenderFormat::Text,
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn format(mut self, format: RenderFormat) -> Self {
        self.format = format;
        self
    }

    pub fn sentinel(mut self, sentinel: &str) -> Self {
        self.sentinel = sentinel.to_string();
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Render a record as aligned `Field: value` lines; lists are comma-joined.
pub fn render_text(record: &ResumeRecord, sentinel: &str) -> String {
    let mut out = String::new();
    for (field, value) in record.values(sentinel) {
        let label = format!("{}:", field.name());
        out.push_str(&format!("  {:<16}{}\n", label, value.join(", ")));
    }
    out
}

impl<W: Write> RecordSink for ConsoleSink<W> {
    fn write(&mut self, source: &Path, record: &ResumeRecord) -> Result<(), SinkError> {
        let marker = format!("✅ Processed: {}", source.display());
        if self.color.enabled() {
            writeln!(self.writer, "{}", marker.green())?;
        } else {
            writeln!(self.writer, "{}", marker)?;
        }

        match self.format {
            RenderFormat::Text => {
                write!(self.writer, "{}", render_text(record, &self.sentinel))?;
            }
            RenderFormat::Json => {
                let json = serde_json::to_string_pretty(&record.view(&self.sentinel))
                    .map_err(|e| SinkError::Encode(e.to_string()))?;
                writeln!(self.writer, "{}", json)?;
            }
            RenderFormat::Quiet => {}
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResumeRecord {
        ResumeRecord {
            email: vec!["jane@example.com".into()],
            name: Some("Jane Roe".into()),
            skills: ["Rust".to_string(), "Kubernetes".to_string()]
                .into_iter()
                .collect(),
            ..Default::default()
        }
    }

    fn written(sink: ConsoleSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn text_output_has_marker_and_every_field() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.write(Path::new("cv/jane.pdf"), &sample()).unwrap();
        let out = written(sink);

        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("✅ Processed: cv/jane.pdf"));
        assert_eq!(out.lines().count(), 10);
        assert!(out.contains("  Name:           Jane Roe\n"));
        assert!(out.contains("  Skills:         Kubernetes, Rust\n"));
        assert!(out.contains("  Experience:     0\n"));
    }

    #[test]
    fn quiet_output_is_marker_only() {
        let mut sink = ConsoleSink::new(Vec::new()).format(RenderFormat::Quiet);
        sink.write(Path::new("jane.pdf"), &sample()).unwrap();
        assert_eq!(written(sink), "✅ Processed: jane.pdf\n");
    }

    #[test]
    fn json_output_uses_custom_sentinel() {
        let mut sink = ConsoleSink::new(Vec::new())
            .format(RenderFormat::Json)
            .sentinel("");
        sink.write(Path::new("jane.pdf"), &sample()).unwrap();
        let out = written(sink);
        let body = out.split_once('\n').unwrap().1;
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["Name"], "Jane Roe");
        assert_eq!(json["Phone"], "");
        assert_eq!(json["Projects"], serde_json::json!([""]));
        assert_eq!(json["Skills"], serde_json::json!(["Kubernetes", "Rust"]));
    }

    #[test]
    fn colored_marker_contains_escape_codes() {
        let mut sink = ConsoleSink::new(Vec::new())
            .color(ColorMode(true))
            .format(RenderFormat::Quiet);
        sink.write(Path::new("jane.pdf"), &sample()).unwrap();
        let out = written(sink);
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("Processed: jane.pdf"));
    }
}
