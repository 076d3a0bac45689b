//! Output format writers.

mod csv;
mod json;
pub mod json_envelope;
pub mod progress;
mod text;
mod types;
mod writer;

pub use csv::CsvWriter;
pub use json::JsonWriter;
pub use text::TextWriter;
pub use types::{FrameReport, RunSummary};
pub use writer::ReportWriter;

use crate::config::OutputFormat;
use std::io::Write;

/// Build the writer for a format over `sink`.
pub fn writer_for<'a, W: Write + 'a>(
    format: OutputFormat,
    sink: W,
    variant: &str,
    threshold: f32,
) -> Box<dyn ReportWriter + 'a> {
    match format {
        OutputFormat::Text => Box::new(TextWriter::new(sink)),
        OutputFormat::Csv => Box::new(CsvWriter::new(sink)),
        OutputFormat::Json => Box::new(JsonWriter::new(sink, variant, threshold)),
    }
}
