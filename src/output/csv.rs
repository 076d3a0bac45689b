//! CSV output format writer.

use crate::error::{Error, Result};
use crate::output::{FrameReport, ReportWriter};
use std::io::Write;

const HEADER: [&str; 5] = ["file", "label", "confidence", "outcome", "error"];

/// CSV format output writer.
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    /// Create a CSV writer over any sink.
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(sink),
        }
    }

    /// Consume the writer, returning the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be flushed.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| Error::Io(e.into_error()))
    }
}

impl<W: Write> ReportWriter for CsvWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(HEADER)
            .map_err(|source| Error::CsvWrite { source })
    }

    fn write_report(&mut self, report: &FrameReport) -> Result<()> {
        let file = report.file.display().to_string();
        let confidence = format!("{:.2}", report.confidence);
        self.writer
            .write_record([
                file.as_str(),
                report.label.as_str(),
                confidence.as_str(),
                report.outcome.as_str(),
                report.error.as_deref().unwrap_or(""),
            ])
            .map_err(|source| Error::CsvWrite { source })
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::FrameOutcome;
    use std::path::PathBuf;

    #[test]
    fn test_csv_writer_basic() {
        let mut writer = CsvWriter::new(Vec::new());
        writer.write_header().unwrap();
        writer
            .write_report(&FrameReport::new(
                PathBuf::from("/frames/hand, left.png"),
                &FrameOutcome::NoHand,
            ))
            .unwrap();
        writer.finalize().unwrap();

        let contents = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("file,label,confidence,outcome,error"));
        assert_eq!(
            lines.next(),
            Some("\"/frames/hand, left.png\",No Hand,0.00,no_hand,")
        );
    }
}
