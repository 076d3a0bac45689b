//! Sign classifier: model plus vocabulary plus threshold.

use crate::config::{InferenceConfig, OutputActivation, VariantConfig};
use crate::decision::{ClassificationResult, decide};
use crate::error::{Error, FrameError, Result};
use crate::inference::labels::load_labels;
use crate::inference::model::{OnnxSignModel, SignModel};
use crate::inference::utils::{is_probability_vector, softmax};
use crate::normalize::{NormalizeOptions, NormalizedTensor};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A loaded classifier bound to its label vocabulary.
///
/// The vocabulary length always equals the model's output length; this is
/// checked once at construction with a blank forward pass.
pub struct SignClassifier {
    model: Arc<dyn SignModel>,
    labels: Vec<String>,
    activation: OutputActivation,
    threshold: f32,
}

impl SignClassifier {
    /// Load the classifier a variant describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or labels cannot be loaded, or the
    /// vocabulary does not match the model's output length.
    pub fn from_variant(
        variant: &VariantConfig,
        model_dir: &Path,
        inference: &InferenceConfig,
    ) -> Result<Self> {
        let labels = load_labels(&variant.labels, model_dir)?;
        let shape = NormalizeOptions::from_variant(variant).tensor_shape();
        let model = OnnxSignModel::load(&variant.model_path(model_dir), shape, inference)?;

        let classifier = Self::with_model(
            Arc::new(model),
            labels,
            variant.activation,
            variant.threshold,
        )?;
        info!(
            "Classifier ready: {} labels, input {:?}, threshold {}",
            classifier.labels.len(),
            shape,
            classifier.threshold
        );
        Ok(classifier)
    }

    /// Wrap an already-loaded model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LabelCountMismatch`] if the model's output length
    /// differs from `labels.len()`, or [`Error::Internal`] if the check pass
    /// itself fails.
    pub fn with_model(
        model: Arc<dyn SignModel>,
        labels: Vec<String>,
        activation: OutputActivation,
        threshold: f32,
    ) -> Result<Self> {
        let classifier = Self {
            model,
            labels,
            activation,
            threshold,
        };
        classifier.check_vocabulary()?;
        Ok(classifier)
    }

    fn check_vocabulary(&self) -> Result<()> {
        let blank = blank_tensor(self.model.input_shape())?;
        let outputs = self
            .model
            .predict(&blank)
            .map_err(|e| Error::Internal {
                message: format!("vocabulary check pass failed: {e}"),
            })?;

        if outputs.len() != self.labels.len() {
            return Err(Error::LabelCountMismatch {
                labels: self.labels.len(),
                outputs: outputs.len(),
            });
        }
        debug!(outputs = outputs.len(), "Vocabulary matches model output");
        Ok(())
    }

    /// Classify one normalized frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Inference`] if the tensor shape is wrong, the
    /// model fails, or its output is not a valid probability vector.
    pub fn classify(
        &self,
        tensor: &NormalizedTensor,
    ) -> std::result::Result<ClassificationResult, FrameError> {
        let expected = self.model.input_shape();
        if tensor.shape() != expected {
            return Err(FrameError::Inference {
                reason: format!(
                    "tensor shape {:?} does not match model input {expected:?}",
                    tensor.shape()
                ),
            });
        }

        let raw = self.model.predict(tensor)?;
        if raw.len() != self.labels.len() {
            return Err(FrameError::Inference {
                reason: format!(
                    "model returned {} values for {} labels",
                    raw.len(),
                    self.labels.len()
                ),
            });
        }

        let probabilities = match self.activation {
            OutputActivation::Probabilities => raw,
            OutputActivation::Logits => softmax(&raw),
        };

        if !is_probability_vector(&probabilities) {
            return Err(FrameError::Inference {
                reason: "model output is not a probability vector".to_string(),
            });
        }

        Ok(decide(&probabilities, &self.labels, self.threshold))
    }
}

impl std::fmt::Debug for SignClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignClassifier")
            .field("labels", &self.labels.len())
            .field("activation", &self.activation)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

fn blank_tensor(shape: [usize; 4]) -> Result<NormalizedTensor> {
    use crate::config::TensorLayout;
    use crate::constants::CHANNELS;

    let layout = match shape {
        [1, h, w, CHANNELS] if h == w => TensorLayout::Nhwc,
        [1, CHANNELS, h, w] if h == w => TensorLayout::Nchw,
        _ => {
            return Err(Error::Internal {
                message: format!("unsupported model input shape {shape:?}"),
            });
        }
    };
    let size = if layout == TensorLayout::Nhwc {
        shape[1]
    } else {
        shape[2]
    };
    NormalizedTensor::from_parts(layout, size, vec![0.0; size * size * CHANNELS]).map_err(|e| {
        Error::Internal {
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::TensorLayout;
    use crate::inference::model::StaticModel;

    const SHAPE: [usize; 4] = [1, 4, 4, 3];

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("L{i}")).collect()
    }

    fn tensor() -> NormalizedTensor {
        NormalizedTensor::from_parts(TensorLayout::Nhwc, 4, vec![0.5; 48]).unwrap()
    }

    #[test]
    fn test_vocabulary_mismatch_rejected_at_load() {
        let model = Arc::new(StaticModel::new(SHAPE, vec![0.5, 0.5]));
        let result =
            SignClassifier::with_model(model, labels(3), OutputActivation::Probabilities, 0.6);
        assert!(matches!(
            result,
            Err(Error::LabelCountMismatch {
                labels: 3,
                outputs: 2
            })
        ));
    }

    #[test]
    fn test_classify_probabilities() {
        let model = Arc::new(StaticModel::new(SHAPE, vec![0.1, 0.8, 0.1]));
        let classifier =
            SignClassifier::with_model(model, labels(3), OutputActivation::Probabilities, 0.6)
                .unwrap();
        let result = classifier.classify(&tensor()).unwrap();
        assert_eq!(result.label, "L1");
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_classify_logits_applies_softmax() {
        let model = Arc::new(StaticModel::new(SHAPE, vec![0.0, 5.0, 0.0]));
        let classifier =
            SignClassifier::with_model(model, labels(3), OutputActivation::Logits, 0.6).unwrap();
        let result = classifier.classify(&tensor()).unwrap();
        assert_eq!(result.label, "L1");
        assert!(result.confidence > 0.98 && result.confidence <= 1.0);
    }

    #[test]
    fn test_raw_logits_declared_as_probabilities_fail() {
        let model = Arc::new(StaticModel::new(SHAPE, vec![-2.0, 7.5]));
        let classifier =
            SignClassifier::with_model(model, labels(2), OutputActivation::Probabilities, 0.6)
                .unwrap();
        let err = classifier.classify(&tensor()).unwrap_err();
        assert!(matches!(err, FrameError::Inference { .. }));
    }

    #[test]
    fn test_sigmoid_scores_declared_as_probabilities_fail() {
        let model = Arc::new(StaticModel::new(SHAPE, vec![0.9, 0.7, 0.2]));
        let classifier =
            SignClassifier::with_model(model, labels(3), OutputActivation::Probabilities, 0.6)
                .unwrap();
        let err = classifier.classify(&tensor()).unwrap_err();
        assert!(err.to_string().contains("not a probability vector"));
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        let model = Arc::new(StaticModel::new(SHAPE, vec![0.2, 0.8]));
        let classifier = SignClassifier::with_model(
            model.clone(),
            labels(2),
            OutputActivation::Probabilities,
            0.6,
        )
        .unwrap();
        let calls_after_load = model.calls();

        let wrong = NormalizedTensor::from_parts(TensorLayout::Nchw, 4, vec![0.0; 48]).unwrap();
        let err = classifier.classify(&wrong).unwrap_err();
        assert!(matches!(err, FrameError::Inference { .. }));
        assert_eq!(model.calls(), calls_after_load);
    }

    #[test]
    fn test_failing_model_cannot_load() {
        let model = Arc::new(StaticModel::failing(SHAPE, "bad graph"));
        let result =
            SignClassifier::with_model(model, labels(2), OutputActivation::Probabilities, 0.6);
        assert!(matches!(result, Err(Error::Internal { .. })));
    }

    #[test]
    fn test_blank_tensor_layouts() {
        assert_eq!(blank_tensor([1, 8, 8, 3]).unwrap().shape(), [1, 8, 8, 3]);
        assert_eq!(blank_tensor([1, 3, 8, 8]).unwrap().shape(), [1, 3, 8, 8]);
        assert!(blank_tensor([1, 8, 4, 3]).is_err());
    }
}
