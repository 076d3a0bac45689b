//! JSON output format writer.

use crate::error::{Error, Result};
use crate::output::json_envelope::{ClassificationPayload, EventType, JsonEnvelope, ResultType};
use crate::output::{FrameReport, ReportWriter, RunSummary};
use std::io::Write;

/// Buffers every report and emits one envelope on finalize.
pub struct JsonWriter<W: Write> {
    sink: W,
    variant: String,
    threshold: f32,
    frames: Vec<FrameReport>,
}

impl<W: Write> JsonWriter<W> {
    /// Create a JSON writer for one run of `variant`.
    pub fn new(sink: W, variant: &str, threshold: f32) -> Self {
        Self {
            sink,
            variant: variant.to_string(),
            threshold,
            frames: Vec::new(),
        }
    }

    /// Consume the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_report(&mut self, report: &FrameReport) -> Result<()> {
        self.frames.push(report.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let frames = std::mem::take(&mut self.frames);
        let payload = ClassificationPayload {
            result_type: ResultType::Classification,
            variant: self.variant.clone(),
            threshold: self.threshold,
            summary: RunSummary::from_reports(&frames),
            frames,
        };
        let envelope = JsonEnvelope::new(EventType::Result, payload);

        serde_json::to_writer_pretty(&mut self.sink, &envelope)
            .map_err(|source| Error::JsonWrite { source })?;
        writeln!(self.sink)?;
        self.sink.flush()?;
        Ok(())
    }
}
