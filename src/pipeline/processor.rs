//! Per-frame processing: decode, localize, normalize, classify, decide.

use crate::config::{DecodeStrategy, InferenceConfig, VariantConfig};
use crate::constants::{localizer::DEFAULT_PADDING, sentinel};
use crate::decision::{ClassificationResult, percent};
use crate::error::{Error, FrameError, Result};
use crate::frame::{Frame, decode_base64_payload, decode_frame};
use crate::inference::SignClassifier;
use crate::localize::{HandDetector, OnnxHandDetector, localize};
use crate::normalize::{NormalizeOptions, normalize};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Terminal outcome of one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The classifier ran; label may be `"Uncertain"`.
    Classified(ClassificationResult),
    /// The localizer found no hand.
    NoHand,
    /// A stage failed.
    Failed(FrameError),
    /// The model never loaded.
    Unavailable,
}

impl FrameOutcome {
    /// Plain-text reply for the streaming path.
    pub fn label(&self) -> &str {
        match self {
            Self::Classified(result) => &result.label,
            Self::NoHand => sentinel::NO_HAND,
            Self::Failed(_) => sentinel::ERROR,
            Self::Unavailable => sentinel::UNAVAILABLE,
        }
    }

    /// Probability in `[0, 1]`; zero for every non-classified outcome.
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Classified(result) => result.confidence,
            _ => 0.0,
        }
    }

    /// Short outcome name used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Classified(result) if result.is_uncertain() => "uncertain",
            Self::Classified(_) => "classified",
            Self::NoHand => "no_hand",
            Self::Failed(_) => "error",
            Self::Unavailable => "unavailable",
        }
    }

    /// Stage error, if any.
    pub fn error(&self) -> Option<&FrameError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Request body for the request/response path.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectRequest {
    /// Base64 image, optionally a `data:...;base64,` URI.
    pub image: String,
}

impl DetectRequest {
    /// Parse a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the body is not a JSON object
    /// with a string `image` field.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::InvalidRequest {
            message: e.to_string(),
        })
    }
}

/// Reply body for the request/response path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectResponse {
    /// Label or sentinel.
    pub label: String,
    /// Confidence as a percentage rounded to two decimals.
    pub confidence: f64,
    /// Failure description, present only for errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

enum ModelState {
    Ready(SignClassifier),
    Unavailable { reason: String },
}

struct Localizer {
    detector: Arc<dyn HandDetector>,
    padding: u32,
}

/// A variant's full pipeline, loaded once and shared across frames.
pub struct SignPipeline {
    name: String,
    decode: DecodeStrategy,
    normalize: NormalizeOptions,
    localizer: Option<Localizer>,
    state: ModelState,
}

impl SignPipeline {
    /// Load a variant, degrading to an unavailable pipeline on failure.
    ///
    /// The load error is logged once; every later call answers `"[None]"`.
    pub fn load(
        name: &str,
        variant: &VariantConfig,
        model_dir: &Path,
        inference: &InferenceConfig,
    ) -> Self {
        match Self::try_load(name, variant, model_dir, inference) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                error!("Variant '{}' unavailable: {}", name, e);
                Self::unavailable(name, variant, &e.to_string())
            }
        }
    }

    /// Load a variant, failing on any model or vocabulary problem.
    ///
    /// # Errors
    ///
    /// Returns an error if the classifier, its labels, or the hand landmark
    /// model cannot be loaded.
    pub fn try_load(
        name: &str,
        variant: &VariantConfig,
        model_dir: &Path,
        inference: &InferenceConfig,
    ) -> Result<Self> {
        let classifier = SignClassifier::from_variant(variant, model_dir, inference)?;

        let detector: Option<Arc<dyn HandDetector>> = match &variant.localizer {
            Some(cfg) => {
                let path = variant
                    .localizer_model_path(model_dir)
                    .ok_or_else(|| Error::Internal {
                        message: "localizer configured without a model path".to_string(),
                    })?;
                Some(Arc::new(OnnxHandDetector::load(
                    &path,
                    cfg.input_size,
                    cfg.min_presence,
                    inference,
                )?))
            }
            None => None,
        };

        Ok(Self::from_parts(name, variant, classifier, detector))
    }

    /// Assemble a pipeline from already-loaded parts.
    ///
    /// The localizer padding comes from the variant, or the default when the
    /// variant declares no localizer.
    pub fn from_parts(
        name: &str,
        variant: &VariantConfig,
        classifier: SignClassifier,
        detector: Option<Arc<dyn HandDetector>>,
    ) -> Self {
        let padding = variant
            .localizer
            .as_ref()
            .map_or(DEFAULT_PADDING, |l| l.padding);

        Self {
            name: name.to_string(),
            decode: variant.decode,
            normalize: NormalizeOptions::from_variant(variant),
            localizer: detector.map(|detector| Localizer { detector, padding }),
            state: ModelState::Ready(classifier),
        }
    }

    /// A pipeline whose model failed to load.
    pub fn unavailable(name: &str, variant: &VariantConfig, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            decode: variant.decode,
            normalize: NormalizeOptions::from_variant(variant),
            localizer: None,
            state: ModelState::Unavailable {
                reason: reason.to_string(),
            },
        }
    }

    /// True when the model loaded.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    /// Why the model is unavailable, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Unavailable { reason } => Some(reason),
            ModelState::Ready(_) => None,
        }
    }

    /// Run the full pipeline over transport bytes.
    pub fn classify_bytes(&self, bytes: &[u8]) -> FrameOutcome {
        let ModelState::Ready(classifier) = &self.state else {
            debug!(variant = %self.name, "Model unavailable, skipping frame");
            return FrameOutcome::Unavailable;
        };

        debug!(bytes = bytes.len(), "Decoding frame");
        let outcome = match decode_frame(bytes, self.decode) {
            Ok(frame) => self.run_stages(classifier, &frame),
            Err(e) => FrameOutcome::Failed(e),
        };
        self.log_outcome(&outcome);
        outcome
    }

    fn run_stages(&self, classifier: &SignClassifier, frame: &Frame) -> FrameOutcome {
        match self.stages(classifier, frame) {
            Ok(Some(result)) => FrameOutcome::Classified(result),
            Ok(None) => FrameOutcome::NoHand,
            Err(e) => FrameOutcome::Failed(e),
        }
    }

    fn stages(
        &self,
        classifier: &SignClassifier,
        frame: &Frame,
    ) -> std::result::Result<Option<ClassificationResult>, FrameError> {
        let bbox = match &self.localizer {
            Some(localizer) => {
                debug!(
                    width = frame.width(),
                    height = frame.height(),
                    "Localizing hand"
                );
                match localize(localizer.detector.as_ref(), frame, localizer.padding)? {
                    Some(bbox) => Some(bbox),
                    None => return Ok(None),
                }
            }
            None => None,
        };

        debug!(?bbox, size = self.normalize.input_size, "Normalizing frame");
        let tensor = normalize(frame, bbox, &self.normalize)?;

        debug!(shape = ?tensor.shape(), "Classifying frame");
        classifier.classify(&tensor).map(Some)
    }

    fn log_outcome(&self, outcome: &FrameOutcome) {
        match outcome {
            FrameOutcome::Failed(e) => {
                warn!(variant = %self.name, code = e.code(), "Frame failed: {}", e);
            }
            other => debug!(
                variant = %self.name,
                outcome = other.kind(),
                label = other.label(),
                confidence = other.confidence(),
                "Frame decided"
            ),
        }
    }

    /// Streaming path: transport bytes in, plain-text reply out.
    pub fn stream_reply(&self, bytes: &[u8]) -> String {
        self.classify_bytes(bytes).label().to_string()
    }

    /// Request path: base64 image (optionally a data URI) in, response body out.
    pub fn request_reply(&self, payload: &str) -> DetectResponse {
        let outcome = match decode_base64_payload(payload) {
            Ok(bytes) => self.classify_bytes(&bytes),
            Err(e) if self.is_ready() => {
                self.log_outcome(&FrameOutcome::Failed(e.clone()));
                FrameOutcome::Failed(e)
            }
            Err(_) => FrameOutcome::Unavailable,
        };
        self.response_for(&outcome)
    }

    /// Convert an outcome to a request-path response.
    pub fn response_for(&self, outcome: &FrameOutcome) -> DetectResponse {
        let error = match outcome {
            FrameOutcome::Failed(e) => Some(e.to_string()),
            FrameOutcome::Unavailable => self.unavailable_reason().map(ToString::to_string),
            FrameOutcome::Classified(_) | FrameOutcome::NoHand => None,
        };

        DetectResponse {
            label: outcome.label().to_string(),
            confidence: percent(outcome.confidence()),
            error,
        }
    }

    /// Classify on the blocking pool, giving up after `timeout`.
    ///
    /// A timed-out frame reports [`FrameError::Timeout`]. The abandoned work
    /// still finishes in the background and holds the model until it does.
    pub async fn classify_with_timeout(
        self: &Arc<Self>,
        bytes: Vec<u8>,
        timeout: Duration,
    ) -> FrameOutcome {
        let pipeline = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || pipeline.classify_bytes(&bytes));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => {
                let e = FrameError::Inference {
                    reason: join_error.to_string(),
                };
                self.log_outcome(&FrameOutcome::Failed(e.clone()));
                FrameOutcome::Failed(e)
            }
            Err(_) => {
                let e = FrameError::Timeout {
                    millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                };
                self.log_outcome(&FrameOutcome::Failed(e.clone()));
                FrameOutcome::Failed(e)
            }
        }
    }
}

impl std::fmt::Debug for SignPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignPipeline")
            .field("name", &self.name)
            .field("decode", &self.decode)
            .field("normalize", &self.normalize)
            .field("localized", &self.localizer.is_some())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::{LabelSource, OutputActivation, preset};
    use crate::inference::StaticModel;
    use crate::localize::{HandLandmarks, StaticHandDetector};
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn tiny_variant() -> VariantConfig {
        let mut variant = preset("letters-64").unwrap();
        variant.input_size = 8;
        variant.labels = LabelSource::Inline(vec!["A".into(), "B".into()]);
        variant
    }

    fn pipeline_with(variant: &VariantConfig, output: Vec<f32>) -> (SignPipeline, Arc<StaticModel>) {
        let shape = NormalizeOptions::from_variant(variant).tensor_shape();
        let model = Arc::new(StaticModel::new(shape, output));
        let labels = match &variant.labels {
            LabelSource::Inline(l) => l.clone(),
            LabelSource::File(_) => unreachable!(),
        };
        let classifier = SignClassifier::with_model(
            model.clone(),
            labels,
            OutputActivation::Probabilities,
            variant.threshold,
        )
        .unwrap();
        (
            SignPipeline::from_parts("test", variant, classifier, None),
            model,
        )
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_stream_reply_labels() {
        let (pipeline, _) = pipeline_with(&tiny_variant(), vec![0.1, 0.9]);
        assert_eq!(pipeline.stream_reply(&png(20, 10)), "B");
        assert_eq!(pipeline.stream_reply(&[]), "[Error]");
    }

    #[test]
    fn test_uncertain_outcome() {
        let (pipeline, _) = pipeline_with(&tiny_variant(), vec![0.55, 0.45]);
        let outcome = pipeline.classify_bytes(&png(4, 4));
        assert_eq!(outcome.label(), "Uncertain");
        assert_eq!(outcome.kind(), "uncertain");
        assert_eq!(outcome.confidence(), 0.55);
    }

    #[test]
    fn test_no_hand_skips_classifier() {
        let mut variant = tiny_variant();
        variant.localizer = preset("hand-crop-224").unwrap().localizer;
        let (base, model) = pipeline_with(&variant, vec![0.1, 0.9]);
        let detector = Arc::new(StaticHandDetector::empty());

        let calls_after_load = model.calls();
        let pipeline = SignPipeline {
            localizer: Some(Localizer {
                detector: detector.clone(),
                padding: 20,
            }),
            ..base
        };

        let outcome = pipeline.classify_bytes(&png(30, 30));
        assert_eq!(outcome, FrameOutcome::NoHand);
        assert_eq!(outcome.confidence(), 0.0);
        assert_eq!(detector.calls(), 1);
        assert_eq!(model.calls(), calls_after_load);
    }

    #[test]
    fn test_hand_crop_classifies() {
        let variant = tiny_variant();
        let (base, model) = pipeline_with(&variant, vec![0.2, 0.8]);
        let detector = Arc::new(StaticHandDetector::new(vec![HandLandmarks::from_points(
            &[(0.4, 0.4), (0.6, 0.7)],
        )]));
        let pipeline = SignPipeline {
            localizer: Some(Localizer {
                detector,
                padding: 2,
            }),
            ..base
        };
        let before = model.calls();
        assert_eq!(pipeline.stream_reply(&png(50, 40)), "B");
        assert_eq!(model.calls(), before + 1);
    }

    #[test]
    fn test_unavailable_pipeline() {
        let variant = tiny_variant();
        let pipeline = SignPipeline::unavailable("test", &variant, "model missing");
        assert!(!pipeline.is_ready());
        assert!(pipeline.unavailable_reason().is_some());
        assert_eq!(pipeline.stream_reply(&png(4, 4)), "[None]");

        let response = pipeline.request_reply("not base64!");
        assert_eq!(response.label, "[None]");
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.error.as_deref(), Some("model missing"));
    }

    #[test]
    fn test_load_missing_model_degrades() {
        let variant = tiny_variant();
        let dir = tempfile::tempdir().unwrap();
        let pipeline =
            SignPipeline::load("letters", &variant, dir.path(), &InferenceConfig::default());
        assert!(!pipeline.is_ready());
        assert!(pipeline.unavailable_reason().is_some());
        assert_eq!(pipeline.stream_reply(&[1, 2, 3]), "[None]");
    }

    #[test]
    fn test_request_reply_percent() {
        use base64::Engine;

        let (pipeline, _) = pipeline_with(&tiny_variant(), vec![0.123_456, 0.876_544]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(png(6, 6));
        let response = pipeline.request_reply(&format!("data:image/png;base64,{encoded}"));
        assert_eq!(response.label, "B");
        assert_eq!(response.confidence, 87.65);
        assert!(response.error.is_none());

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"label":"B","confidence":87.65}"#);
    }

    #[test]
    fn test_request_reply_bad_payload() {
        let (pipeline, _) = pipeline_with(&tiny_variant(), vec![0.1, 0.9]);
        let response = pipeline.request_reply("data:image/png;base64,@@@@");
        assert_eq!(response.label, "[Error]");
        assert_eq!(response.confidence, 0.0);
        assert!(response.error.unwrap().starts_with("decode failed"));
    }

    #[test]
    fn test_detect_request_parse() {
        let request = DetectRequest::parse(r#"{"image": "data:image/png;base64,AAAA"}"#).unwrap();
        assert_eq!(request.image, "data:image/png;base64,AAAA");
        assert!(matches!(
            DetectRequest::parse(r#"{"frame": "AAAA"}"#),
            Err(Error::InvalidRequest { .. })
        ));
        assert!(DetectRequest::parse("not json").is_err());
    }

    #[tokio::test]
    async fn test_classify_with_timeout_completes() {
        let (pipeline, _) = pipeline_with(&tiny_variant(), vec![0.05, 0.95]);
        let pipeline = Arc::new(pipeline);
        let outcome = pipeline
            .classify_with_timeout(png(8, 8), Duration::from_secs(5))
            .await;
        assert_eq!(outcome.label(), "B");
    }
}
