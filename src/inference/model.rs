//! Classifier model abstraction and implementations.

use crate::config::InferenceConfig;
use crate::error::{FrameError, Result};
use crate::inference::session::{build_session, run_single_input};
use crate::normalize::NormalizedTensor;
use ort::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A loaded image classifier with a fixed input shape.
///
/// Models are constructed once and shared read-only across frames.
pub trait SignModel: Send + Sync {
    /// Exact tensor shape the model accepts.
    fn input_shape(&self) -> [usize; 4];

    /// Run one forward pass, returning the raw output vector.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Inference`] on any runtime failure.
    fn predict(&self, tensor: &NormalizedTensor) -> std::result::Result<Vec<f32>, FrameError>;
}

/// ONNX Runtime backed classifier.
pub struct OnnxSignModel {
    session: Mutex<Session>,
    input_shape: [usize; 4],
    path: PathBuf,
}

impl OnnxSignModel {
    /// Load a model file for the given input shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the runtime rejects it.
    pub fn load(path: &Path, input_shape: [usize; 4], inference: &InferenceConfig) -> Result<Self> {
        let session = build_session(path, inference)?;
        Ok(Self {
            session: Mutex::new(session),
            input_shape,
            path: path.to_path_buf(),
        })
    }
}

impl std::fmt::Debug for OnnxSignModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSignModel")
            .field("path", &self.path)
            .field("input_shape", &self.input_shape)
            .finish_non_exhaustive()
    }
}

impl SignModel for OnnxSignModel {
    fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    fn predict(&self, tensor: &NormalizedTensor) -> std::result::Result<Vec<f32>, FrameError> {
        let mut outputs = run_single_input(&self.session, tensor.shape(), tensor.data().to_vec())
            .map_err(|reason| FrameError::Inference { reason })?;

        if outputs.is_empty() {
            return Err(FrameError::Inference {
                reason: "model produced no outputs".to_string(),
            });
        }
        Ok(outputs.swap_remove(0))
    }
}

/// Model that returns a fixed output vector. Used for tests and dry runs.
#[derive(Debug)]
pub struct StaticModel {
    input_shape: [usize; 4],
    output: std::result::Result<Vec<f32>, String>,
    calls: AtomicUsize,
}

impl StaticModel {
    /// Model that always answers `output`.
    pub fn new(input_shape: [usize; 4], output: Vec<f32>) -> Self {
        Self {
            input_shape,
            output: Ok(output),
            calls: AtomicUsize::new(0),
        }
    }

    /// Model whose every forward pass fails with `reason`.
    pub fn failing(input_shape: [usize; 4], reason: &str) -> Self {
        Self {
            input_shape,
            output: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of forward passes run so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl SignModel for StaticModel {
    fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    fn predict(&self, _tensor: &NormalizedTensor) -> std::result::Result<Vec<f32>, FrameError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.output
            .clone()
            .map_err(|reason| FrameError::Inference { reason })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TensorLayout;

    #[test]
    fn test_static_model_counts_calls() {
        let model = StaticModel::new([1, 2, 2, 3], vec![0.3, 0.7]);
        let tensor = NormalizedTensor::from_parts(TensorLayout::Nhwc, 2, vec![0.0; 12]).unwrap();
        assert_eq!(model.predict(&tensor).unwrap(), vec![0.3, 0.7]);
        assert_eq!(model.predict(&tensor).unwrap(), vec![0.3, 0.7]);
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn test_failing_model() {
        let model = StaticModel::failing([1, 2, 2, 3], "corrupt weights");
        let tensor = NormalizedTensor::from_parts(TensorLayout::Nhwc, 2, vec![0.0; 12]).unwrap();
        let err = model.predict(&tensor).unwrap_err();
        assert_eq!(
            err,
            FrameError::Inference {
                reason: "corrupt weights".to_string()
            }
        );
    }

    #[test]
    fn test_onnx_model_missing_file() {
        let result = OnnxSignModel::load(
            Path::new("/nonexistent/sign.onnx"),
            [1, 224, 224, 3],
            &InferenceConfig::default(),
        );
        assert!(result.is_err());
    }
}
