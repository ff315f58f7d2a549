use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use cvsift_core::{DEFAULT_SENTINEL, Field, RecordSink, ResumeRecord, SinkError};

/// Default target when no CSV path is configured.
pub const DEFAULT_CSV_PATH: &str = "resume_data.csv";

/// Separator between items of a list field inside one CSV cell.
const LIST_SEPARATOR: &str = "; ";

/// Appends one CSV row per record, writing the header when the file is new.
///
/// There is no locking: two processes appending to the same file at once can
/// interleave rows. Run one writer per file.
pub struct CsvAppendSink {
    path: PathBuf,
    sentinel: String,
}

impl CsvAppendSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn sentinel(mut self, sentinel: &str) -> Self {
        self.sentinel = sentinel.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What must precede the next row. An existing but empty file counts as
    /// new; a file whose last line is unterminated gets a newline first.
    fn prefix(&self) -> Result<Prefix, SinkError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Prefix::Header),
            Err(e) => return Err(SinkError::Io(e)),
        };
        if file.metadata()?.len() == 0 {
            return Ok(Prefix::Header);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(if last[0] == b'\n' {
            Prefix::Nothing
        } else {
            Prefix::Newline
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Header,
    Newline,
    Nothing,
}

/// Header row: field names in schema order.
pub fn header_row() -> Vec<&'static str> {
    Field::ALL.iter().map(|f| f.name()).collect()
}

/// Data row: field values in schema order, list items joined with `"; "`.
pub fn data_row(record: &ResumeRecord, sentinel: &str) -> Vec<String> {
    record
        .values(sentinel)
        .into_iter()
        .map(|(_, value)| value.join(LIST_SEPARATOR))
        .collect()
}

fn csv_error(e: csv::Error) -> SinkError {
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => SinkError::Io(io),
        _ => SinkError::Encode(message),
    }
}

impl RecordSink for CsvAppendSink {
    fn write(&mut self, source: &Path, record: &ResumeRecord) -> Result<(), SinkError> {
        let prefix = self.prefix()?;
        let write_header = prefix == Prefix::Header;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if prefix == Prefix::Newline {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if write_header {
            writer.write_record(header_row()).map_err(csv_error)?;
        }
        writer
            .write_record(data_row(record, &self.sentinel))
            .map_err(csv_error)?;
        writer.flush()?;

        tracing::debug!(
            csv = %self.path.display(),
            source = %source.display(),
            header = write_header,
            "appended record"
        );
        Ok(())
    }
}
