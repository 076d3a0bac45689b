//! Output writer trait definition.

use crate::error::Result;
use crate::output::FrameReport;

/// Trait for writing frame classification results.
pub trait ReportWriter {
    /// Write the header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single frame report.
    fn write_report(&mut self, report: &FrameReport) -> Result<()>;

    /// Finalize the output (flush, emit buffered documents, etc.).
    fn finalize(&mut self) -> Result<()>;
}
