//! Sinks for extracted resume records: the console and an append-only CSV file.

pub mod append;
pub mod console;

pub use append::{CsvAppendSink, DEFAULT_CSV_PATH, data_row, header_row};
pub use console::{ColorMode, ConsoleSink, RenderFormat, render_text};
