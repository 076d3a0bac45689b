//! Output type definitions.

use crate::decision::percent;
use crate::pipeline::FrameOutcome;
use serde::Serialize;
use std::path::PathBuf;

/// Result of classifying one frame file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Source file.
    pub file: PathBuf,
    /// Label or sentinel.
    pub label: String,
    /// Confidence percentage, two decimals.
    pub confidence: f64,
    /// Outcome kind (`classified`, `uncertain`, `no_hand`, `error`, `unavailable`).
    pub outcome: String,
    /// Failure description for errored frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameReport {
    /// Build a report from a pipeline outcome.
    pub fn new(file: PathBuf, outcome: &FrameOutcome) -> Self {
        Self {
            file,
            label: outcome.label().to_string(),
            confidence: percent(outcome.confidence()),
            outcome: outcome.kind().to_string(),
            error: outcome.error().map(ToString::to_string),
        }
    }

    /// Report for a file that could not be read at all.
    pub fn unreadable(file: PathBuf, message: String) -> Self {
        Self {
            file,
            label: crate::constants::sentinel::ERROR.to_string(),
            confidence: 0.0,
            outcome: "error".to_string(),
            error: Some(message),
        }
    }
}

/// Outcome counts across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Frames seen.
    pub frames: usize,
    /// Frames with a confident label.
    pub classified: usize,
    /// Frames below the threshold.
    pub uncertain: usize,
    /// Frames where no hand was found.
    pub no_hand: usize,
    /// Frames that failed.
    pub errors: usize,
    /// Frames skipped because the model is unavailable.
    pub unavailable: usize,
}

impl RunSummary {
    /// Tally a set of reports.
    pub fn from_reports(reports: &[FrameReport]) -> Self {
        let mut summary = Self {
            frames: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.outcome.as_str() {
                "classified" => summary.classified += 1,
                "uncertain" => summary.uncertain += 1,
                "no_hand" => summary.no_hand += 1,
                "unavailable" => summary.unavailable += 1,
                _ => summary.errors += 1,
            }
        }
        summary
    }
}
