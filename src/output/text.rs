//! Human-readable text writer.

use crate::error::Result;
use crate::output::{FrameReport, ReportWriter};
use std::io::Write;

/// One line per frame: `path: label (confidence%)`.
pub struct TextWriter<W: Write> {
    sink: W,
}

impl<W: Write> TextWriter<W> {
    /// Create a text writer over any sink.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Consume the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> ReportWriter for TextWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_report(&mut self, report: &FrameReport) -> Result<()> {
        write!(
            self.sink,
            "{}: {} ({:.2}%)",
            report.file.display(),
            report.label,
            report.confidence
        )?;
        if let Some(error) = &report.error {
            write!(self.sink, " - {error}")?;
        }
        writeln!(self.sink)?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}
