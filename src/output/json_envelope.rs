//! JSON envelope types for CLI output.
//!
//! Every JSON document the CLI prints for file classification and the
//! inspection commands is wrapped in the same envelope so consumers can
//! dispatch on `event` and `payload.result_type`.

use crate::output::{FrameReport, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Current envelope format version.
pub const SPEC_VERSION: &str = "1.0";

/// JSON envelope wrapping all CLI output events.
#[derive(Debug, Serialize)]
pub struct JsonEnvelope<T> {
    /// Envelope format version.
    pub spec_version: String,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event type.
    pub event: EventType,
    /// Event-specific payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Create a new envelope with the current timestamp.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            timestamp: Utc::now(),
            event,
            payload,
        }
    }
}

/// Event types for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Final result.
    Result,
    /// Error occurred.
    Error,
}

/// Result type discriminator for result payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Frame classification results.
    Classification,
    /// Variant list.
    VariantList,
    /// Single variant details.
    VariantInfo,
    /// Configuration display.
    Config,
}

/// Error payload for error events.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Error code (`snake_case` identifier).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Payload for classification results.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationPayload {
    /// Result type discriminator.
    pub result_type: ResultType,
    /// Variant used.
    pub variant: String,
    /// Threshold in effect.
    pub threshold: f32,
    /// Per-frame results in input order.
    pub frames: Vec<FrameReport>,
    /// Outcome counts.
    pub summary: RunSummary,
}

/// Payload for variant list result.
#[derive(Debug, Clone, Serialize)]
pub struct VariantListPayload {
    /// Result type discriminator.
    pub result_type: ResultType,
    /// Known variants.
    pub variants: Vec<VariantEntry>,
}

/// A single variant entry.
#[derive(Debug, Clone, Serialize)]
pub struct VariantEntry {
    /// Variant name.
    pub name: String,
    /// `preset` or `config`.
    pub source: String,
    /// Whether this is the default variant.
    pub is_default: bool,
    /// Classifier input resolution.
    pub input_size: u32,
    /// Frame decode strategy.
    pub decode: String,
    /// Whether a hand localizer runs first.
    pub localized: bool,
    /// Confidence threshold.
    pub threshold: f32,
}

/// Payload for variant details.
#[derive(Debug, Clone, Serialize)]
pub struct VariantInfoPayload {
    /// Result type discriminator.
    pub result_type: ResultType,
    /// Variant name.
    pub name: String,
    /// Resolved model path.
    pub model_path: PathBuf,
    /// Resolved localizer model path, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localizer_model_path: Option<PathBuf>,
    /// Full variant settings.
    pub variant: serde_json::Value,
}

/// Payload for config show result.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPayload {
    /// Result type discriminator.
    pub result_type: ResultType,
    /// Path to the config file.
    pub config_path: PathBuf,
    /// The configuration contents.
    pub config: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization() {
        let payload = ClassificationPayload {
            result_type: ResultType::Classification,
            variant: "letters-64".to_string(),
            threshold: 0.6,
            frames: Vec::new(),
            summary: RunSummary::default(),
        };
        let envelope = JsonEnvelope::new(EventType::Result, payload);

        let json = serde_json::to_string(&envelope).expect("serialize");
        assert!(json.contains("\"spec_version\":\"1.0\""));
        assert!(json.contains("\"event\":\"result\""));
        assert!(json.contains("\"result_type\":\"classification\""));
        assert!(json.contains("\"variant\":\"letters-64\""));
    }

    #[test]
    fn test_result_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ResultType::VariantList).expect("serialize"),
            "\"variant_list\""
        );
        assert_eq!(
            serde_json::to_string(&ResultType::VariantInfo).expect("serialize"),
            "\"variant_info\""
        );
    }

    #[test]
    fn test_variant_info_skips_missing_localizer() {
        let payload = VariantInfoPayload {
            result_type: ResultType::VariantInfo,
            name: "mobilenet-224".to_string(),
            model_path: PathBuf::from("/models/mobilenet-224.onnx"),
            localizer_model_path: None,
            variant: serde_json::Value::Null,
        };
        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(!json.contains("localizer_model_path"));
    }
}
